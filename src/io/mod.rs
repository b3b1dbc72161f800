//! Audio input types
//!
//! Decoding itself is left to the caller (the demos include a Symphonia-based
//! loader); the core consumes an already decoded
//! [`PcmBuffer`](pcm_buffer::PcmBuffer).

pub mod pcm_buffer;
