//! Autocorrelation-based BPM scoring
//!
//! Finds periodicity in the normalized onset function.
//!
//! # Algorithm
//!
//! 1. Mean-center the onset function and compute its energy (sum of squares)
//! 2. For each lag in the BPM lag range, compute the normalized
//!    autocorrelation `Σ c[i]·c[i+lag] / energy`
//! 3. Harmonic enhancement: add `0.5 × ACF[2·lag]` and `0.25 × ACF[3·lag]`
//!    when those lags are still in range, which favours periods whose
//!    multiples are also strong and suppresses spurious fast tempi
//! 4. Convert lags to BPM (`fps · 60 / lag`) on a 0.1 BPM grid, keeping the
//!    best score per grid point
//!
//! # Reference
//!
//! Ellis, D. P. W., & Pikrakis, A. (2006). Real-time Beat Induction.
//! *Proceedings of the International Conference on Music Information Retrieval*.

use super::lag_range;
use super::score_map::ScoreMap;
use crate::config::AnalysisConfig;
use crate::features::onset::OnsetFunction;

/// Score BPM candidates by autocorrelation of the onset function
///
/// # Arguments
///
/// * `odf` - Normalized onset function
/// * `config` - Uses `min_bpm`, `max_bpm` and `harmonic_weights`
///
/// # Returns
///
/// BPM (0.1 resolution) → enhanced autocorrelation. Lags with a non-positive
/// enhanced value and BPMs outside the configured range are omitted, so a
/// silent or too-short input yields an empty map.
pub fn autocorrelation_scores(odf: &OnsetFunction, config: &AnalysisConfig) -> ScoreMap {
    let fps = odf.sample_rate as f64 / odf.hop_size as f64;
    let n = odf.len();

    let Some(lags) = lag_range(fps, n, config.min_bpm, config.max_bpm) else {
        return ScoreMap::new();
    };
    let (lag_min, lag_max) = (*lags.start(), *lags.end());

    log::debug!(
        "Autocorrelation: {} frames, lags [{}, {}], {:.2} fps",
        n,
        lag_min,
        lag_max,
        fps
    );

    let acf = normalized_autocorrelation(&odf.values, lag_min, lag_max);

    let mut scores = ScoreMap::new();
    for lag in lag_min..=lag_max {
        let enhanced = acf[lag]
            + config
                .harmonic_weights
                .iter()
                .enumerate()
                .filter_map(|(h, &weight)| acf.get(lag * (h + 2)).map(|&v| weight * v))
                .sum::<f32>();

        if enhanced <= 0.0 {
            continue;
        }

        let bpm = ((fps * 60.0 / lag as f64) * 10.0).round() / 10.0;
        if bpm >= config.min_bpm as f64 && bpm <= config.max_bpm as f64 {
            scores.insert_max(bpm, enhanced);
        }
    }

    log::debug!("Autocorrelation produced {} BPM scores", scores.len());
    scores
}

/// Mean-centred autocorrelation normalized by the signal energy
///
/// Returns a vector of length `lag_max + 1`; entries below `lag_min` are 0.
/// All values are 0 when the centred signal has no energy.
fn normalized_autocorrelation(values: &[f32], lag_min: usize, lag_max: usize) -> Vec<f32> {
    let n = values.len();
    let mean = values.iter().map(|&v| v as f64).sum::<f64>() / n.max(1) as f64;
    let centered: Vec<f64> = values.iter().map(|&v| v as f64 - mean).collect();
    let energy: f64 = centered.iter().map(|c| c * c).sum();

    let mut acf = vec![0.0f32; lag_max + 1];
    if energy <= 0.0 {
        log::warn!("Onset function has zero energy; autocorrelation is empty");
        return acf;
    }

    for lag in lag_min..=lag_max.min(n.saturating_sub(1)) {
        let sum: f64 = centered[..n - lag]
            .iter()
            .zip(&centered[lag..])
            .map(|(a, b)| a * b)
            .sum();
        acf[lag] = (sum / energy) as f32;
    }

    acf
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Onset function with unit pulses every `period` frames (fractional periods allowed)
    fn pulse_train(period: f64, frames: usize) -> OnsetFunction {
        let mut values = vec![0.0f32; frames];
        let mut k = 0usize;
        loop {
            let idx = (k as f64 * period).round() as usize;
            if idx >= frames {
                break;
            }
            values[idx] = 1.0;
            k += 1;
        }
        OnsetFunction {
            values,
            hop_size: 512,
            sample_rate: 44100,
        }
    }

    fn best(scores: &ScoreMap) -> (f32, f32) {
        scores
            .iter()
            .fold((0.0, f32::MIN), |acc, (bpm, s)| if s > acc.1 { (bpm, s) } else { acc })
    }

    #[test]
    fn test_autocorrelation_120bpm() {
        // 120 BPM at 44.1 kHz / 512 hop: 43.07 frames per beat
        let fps = 44100.0 / 512.0;
        let odf = pulse_train(fps * 60.0 / 120.0, 1000);
        let scores = autocorrelation_scores(&odf, &AnalysisConfig::default());

        assert!(!scores.is_empty());
        let (bpm, score) = best(&scores);
        assert!((bpm - 120.0).abs() < 2.0, "expected ~120 BPM, got {:.1}", bpm);
        assert!(score > 0.0);
    }

    #[test]
    fn test_autocorrelation_keys_on_tenth_grid_and_in_range() {
        let fps = 44100.0 / 512.0;
        let odf = pulse_train(fps * 60.0 / 100.0, 1000);
        let scores = autocorrelation_scores(&odf, &AnalysisConfig::default());

        for (bpm, score) in scores.iter() {
            assert!((60.0..=200.0).contains(&bpm));
            assert!(score > 0.0);
            let tenths = bpm * 10.0;
            assert!((tenths - tenths.round()).abs() < 1e-3);
        }
    }

    #[test]
    fn test_autocorrelation_silence_is_empty() {
        let odf = OnsetFunction {
            values: vec![0.0; 500],
            hop_size: 512,
            sample_rate: 44100,
        };
        assert!(autocorrelation_scores(&odf, &AnalysisConfig::default()).is_empty());
    }

    #[test]
    fn test_autocorrelation_too_short_is_empty() {
        let odf = pulse_train(10.0, 20);
        assert!(autocorrelation_scores(&odf, &AnalysisConfig::default()).is_empty());
    }

    #[test]
    fn test_harmonic_enhancement_favours_true_period() {
        // With enhancement, the 43-frame period beats its 86-frame double
        let fps = 44100.0 / 512.0;
        let odf = pulse_train(43.0, 1000);
        let scores = autocorrelation_scores(&odf, &AnalysisConfig::default());

        let fast = scores.score_near(fps * 60.0 / 43.0, 0.05);
        let slow = scores.score_near(fps * 60.0 / 86.0, 0.05);
        assert!(fast > slow, "fast={:.3} slow={:.3}", fast, slow);
    }

    #[test]
    fn test_normalized_autocorrelation_values() {
        let values = vec![1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0];
        let acf = normalized_autocorrelation(&values, 1, 4);
        assert_eq!(acf.len(), 5);
        assert_eq!(acf[0], 0.0);
        assert!(acf[1] < 0.0);
        assert!(acf[2] > 0.0);
        assert!(acf[2] > acf[4]);
    }
}
