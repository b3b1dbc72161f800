//! Period estimation modules
//!
//! Convert the normalized onset function to BPM scores using:
//! - Autocorrelation (with harmonic enhancement)
//! - Comb filterbank
//! - Candidate fusion and octave disambiguation

pub mod autocorrelation;
pub mod candidate_filter;
pub mod comb_filter;
pub mod score_map;

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

/// Fused tempo candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TempoCandidate {
    /// Candidate tempo in BPM (0.5 BPM grid)
    pub bpm: f32,

    /// Fused score: weighted sum of the two normalized estimator scores
    pub score: f32,

    /// Normalized autocorrelation support in [0, 1]
    pub autocorr: f32,

    /// Normalized comb filter support in [0, 1]
    pub comb: f32,

    /// True if this candidate was selected as the final tempo
    pub selected: bool,
}

/// Lags (in frames) covering the BPM range
///
/// `lag_min = floor(fps * 60 / max_bpm)` (at least 1),
/// `lag_max = min(ceil(fps * 60 / min_bpm), frame_count - 1)`.
///
/// # Returns
///
/// `None` when `lag_min >= lag_max`, i.e. the onset function is too short to
/// hold even the fastest period twice.
pub fn lag_range(
    frames_per_second: f64,
    frame_count: usize,
    min_bpm: f32,
    max_bpm: f32,
) -> Option<RangeInclusive<usize>> {
    let lag_min = ((frames_per_second * 60.0 / max_bpm as f64).floor() as usize).max(1);
    let lag_max = ((frames_per_second * 60.0 / min_bpm as f64).ceil() as usize)
        .min(frame_count.saturating_sub(1));

    if lag_min >= lag_max {
        log::warn!(
            "Empty lag range [{}, {}] for {} frames at {:.2} fps",
            lag_min,
            lag_max,
            frame_count,
            frames_per_second
        );
        return None;
    }

    Some(lag_min..=lag_max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lag_range_default() {
        let fps = 44100.0 / 512.0;
        let lags = lag_range(fps, 1000, 60.0, 200.0).unwrap();
        // 86.13 * 60 / 200 = 25.84, 86.13 * 60 / 60 = 86.13
        assert_eq!(lags, 25..=87);
    }

    #[test]
    fn test_lag_range_clamped_by_frames() {
        let fps = 44100.0 / 512.0;
        assert_eq!(lag_range(fps, 50, 60.0, 200.0), Some(25..=49));
        assert_eq!(lag_range(fps, 26, 60.0, 200.0), None);
        assert_eq!(lag_range(fps, 0, 60.0, 200.0), None);
    }
}
