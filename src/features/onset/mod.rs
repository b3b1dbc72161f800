//! Onset detection modules
//!
//! - Multi-band spectral flux onset detection function (ODF)
//! - Normalization, adaptive threshold and onset peak picking

pub mod spectral_flux;
pub mod threshold;

use serde::{Deserialize, Serialize};

/// Onset detection function: one non-negative strength value per frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnsetFunction {
    /// Onset strength per analysis frame
    pub values: Vec<f32>,

    /// Samples between consecutive frame starts
    pub hop_size: usize,

    /// Sample rate of the analysed signal in Hz
    pub sample_rate: u32,
}

impl OnsetFunction {
    /// Number of frames
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if there are no frames
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Frame rate of the function (frames per second)
    pub fn frames_per_second(&self) -> f32 {
        self.sample_rate as f32 / self.hop_size as f32
    }

    /// Largest value, 0.0 when empty
    pub fn max(&self) -> f32 {
        self.values.iter().copied().fold(0.0f32, f32::max)
    }
}
