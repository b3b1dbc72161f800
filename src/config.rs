//! Configuration parameters for tempo analysis

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// Inclusive BPM range with a score multiplier applied during tempo selection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangePreference {
    /// Lower bound (inclusive)
    pub min_bpm: f32,
    /// Upper bound (inclusive)
    pub max_bpm: f32,
    /// Multiplier applied to candidates inside the range
    pub weight: f32,
}

impl RangePreference {
    /// True if `bpm` lies inside the range
    pub fn contains(&self, bpm: f32) -> bool {
        bpm >= self.min_bpm && bpm <= self.max_bpm
    }
}

/// Analysis configuration parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    // STFT parameters
    /// Analysis window size in samples, must be a power of two (default: 2048)
    pub frame_size: usize,

    /// Hop size between frame starts in samples (default: 512)
    pub hop_size: usize,

    /// Lower band edges in Hz for the multi-band spectral flux
    /// (default: 0, 200, 400, 800, 1600, 3200). Nyquist closes the last band.
    pub band_edges_hz: Vec<f32>,

    // Onset markers
    /// Adaptive threshold window length in seconds (default: 0.3)
    pub threshold_window_seconds: f32,

    /// Multiplier on the local mean (default: 0.8)
    pub threshold_multiplier: f32,

    /// Additive floor of the adaptive threshold (default: 0.05)
    pub threshold_floor: f32,

    // BPM detection
    /// Minimum BPM to consider (default: 60.0)
    pub min_bpm: f32,

    /// Maximum BPM to consider (default: 200.0)
    pub max_bpm: f32,

    /// Weights for the autocorrelation at 2x, 3x, ... the lag (default: 0.5, 0.25)
    pub harmonic_weights: Vec<f32>,

    /// BPM step of the comb filterbank (default: 0.5)
    pub comb_bpm_step: f32,

    /// Weights of the beat subdivisions 1, 2, 3, 4 (default: 1.0, 0.6, 0.3, 0.2)
    pub comb_subdivision_weights: Vec<f32>,

    /// Half-width of the comb peak search window in seconds (default: 0.015)
    pub comb_tolerance_seconds: f32,

    // Fusion
    /// Weight of the autocorrelation scores in the fused map (default: 0.55)
    pub autocorr_weight: f32,

    /// Weight of the comb filter scores in the fused map (default: 0.45)
    pub comb_weight: f32,

    /// Candidates below this fraction of the top fused score are ignored (default: 0.6)
    pub candidate_ratio: f32,

    /// A harmonic partner scoring above this fraction of a candidate dominates it (default: 0.8)
    pub dominance_ratio: f32,

    /// Preferred tempo range, 80-160 BPM weighted by 1.08
    pub preferred_range: RangePreference,

    /// Extended tempo range, 70-170 BPM weighted by 1.02
    pub extended_range: RangePreference,

    /// Run autocorrelation and comb filter on the rayon pool (default: true)
    pub parallel_estimators: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            frame_size: 2048,
            hop_size: 512,
            band_edges_hz: vec![0.0, 200.0, 400.0, 800.0, 1600.0, 3200.0],
            threshold_window_seconds: 0.3,
            threshold_multiplier: 0.8,
            threshold_floor: 0.05,
            min_bpm: 60.0,
            max_bpm: 200.0,
            harmonic_weights: vec![0.5, 0.25],
            comb_bpm_step: 0.5,
            comb_subdivision_weights: vec![1.0, 0.6, 0.3, 0.2],
            comb_tolerance_seconds: 0.015,
            autocorr_weight: 0.55,
            comb_weight: 0.45,
            candidate_ratio: 0.6,
            dominance_ratio: 0.8,
            preferred_range: RangePreference {
                min_bpm: 80.0,
                max_bpm: 160.0,
                weight: 1.08,
            },
            extended_range: RangePreference {
                min_bpm: 70.0,
                max_bpm: 170.0,
                weight: 1.02,
            },
            parallel_estimators: true,
        }
    }
}

impl AnalysisConfig {
    /// Onset function frame rate for a given sample rate
    pub fn frames_per_second(&self, sample_rate: u32) -> f32 {
        sample_rate as f32 / self.hop_size as f32
    }

    /// Check parameter consistency
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidInput` describing the first offending parameter.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.frame_size < 2 || !self.frame_size.is_power_of_two() {
            return Err(AnalysisError::InvalidInput(format!(
                "Frame size must be a power of two >= 2, got {}",
                self.frame_size
            )));
        }

        if self.hop_size == 0 || self.hop_size > self.frame_size {
            return Err(AnalysisError::InvalidInput(format!(
                "Hop size must be in [1, {}], got {}",
                self.frame_size, self.hop_size
            )));
        }

        let scalars = [
            ("threshold_window_seconds", self.threshold_window_seconds),
            ("threshold_multiplier", self.threshold_multiplier),
            ("threshold_floor", self.threshold_floor),
            ("min_bpm", self.min_bpm),
            ("max_bpm", self.max_bpm),
            ("comb_bpm_step", self.comb_bpm_step),
            ("comb_tolerance_seconds", self.comb_tolerance_seconds),
            ("autocorr_weight", self.autocorr_weight),
            ("comb_weight", self.comb_weight),
            ("candidate_ratio", self.candidate_ratio),
            ("dominance_ratio", self.dominance_ratio),
            ("preferred_range.min_bpm", self.preferred_range.min_bpm),
            ("preferred_range.max_bpm", self.preferred_range.max_bpm),
            ("preferred_range.weight", self.preferred_range.weight),
            ("extended_range.min_bpm", self.extended_range.min_bpm),
            ("extended_range.max_bpm", self.extended_range.max_bpm),
            ("extended_range.weight", self.extended_range.weight),
        ];
        if let Some((name, value)) = scalars.iter().find(|(_, value)| !value.is_finite()) {
            return Err(AnalysisError::InvalidInput(format!(
                "{} must be finite, got {}",
                name, value
            )));
        }

        if self.band_edges_hz.is_empty()
            || self.band_edges_hz.iter().any(|edge| !edge.is_finite())
            || self.band_edges_hz[0] < 0.0
            || self.band_edges_hz.windows(2).any(|w| w[0] >= w[1])
        {
            return Err(AnalysisError::InvalidInput(format!(
                "Band edges must be non-negative and strictly increasing: {:?}",
                self.band_edges_hz
            )));
        }

        if self.min_bpm <= 0.0 || self.min_bpm >= self.max_bpm {
            return Err(AnalysisError::InvalidInput(format!(
                "Invalid BPM range: [{:.1}, {:.1}]",
                self.min_bpm, self.max_bpm
            )));
        }

        if self.comb_bpm_step <= 0.0 {
            return Err(AnalysisError::InvalidInput(format!(
                "Invalid comb BPM step: {:.2}",
                self.comb_bpm_step
            )));
        }

        if self.comb_subdivision_weights.is_empty() {
            return Err(AnalysisError::InvalidInput(
                "At least one comb subdivision weight is required".to_string(),
            ));
        }

        let invalid_weight = self
            .harmonic_weights
            .iter()
            .chain(&self.comb_subdivision_weights)
            .chain([&self.autocorr_weight, &self.comb_weight])
            .any(|w| !w.is_finite() || *w < 0.0);
        if invalid_weight {
            return Err(AnalysisError::InvalidInput(
                "Weights must be finite and non-negative".to_string(),
            ));
        }

        if self.threshold_window_seconds <= 0.0 || self.comb_tolerance_seconds < 0.0 {
            return Err(AnalysisError::InvalidInput(
                "Window lengths must be positive".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.candidate_ratio) || self.dominance_ratio < 0.0 {
            return Err(AnalysisError::InvalidInput(format!(
                "Invalid selection ratios: candidate={:.2}, dominance={:.2}",
                self.candidate_ratio, self.dominance_ratio
            )));
        }

        Ok(())
    }
}
