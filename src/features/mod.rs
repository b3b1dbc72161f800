//! Feature extraction modules
//!
//! This module contains the tempo estimation stages:
//! - Radix-2 FFT
//! - Onset detection (multi-band spectral flux, adaptive threshold)
//! - Period estimation (autocorrelation, comb filterbank, fusion)

pub mod fft;
pub mod onset;
pub mod period;
