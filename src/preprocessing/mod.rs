//! Audio preprocessing modules
//!
//! This module prepares decoded audio for analysis:
//! - Channel mixing (multi-channel to mono)

pub mod channel_mixer;
