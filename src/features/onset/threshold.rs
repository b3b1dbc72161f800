//! Onset function normalization, adaptive threshold and peak picking
//!
//! The threshold and the picked peaks are descriptive output (onset markers
//! for display); tempo estimation only consumes the normalized function.

use super::OnsetFunction;

/// Scale an onset function so its maximum becomes 1.0
///
/// Returns an unchanged copy when the maximum is zero (silent input).
pub fn normalize(odf: &OnsetFunction) -> OnsetFunction {
    let max = odf.max();
    if max <= 0.0 {
        log::warn!("Onset function is all zero; skipping normalization");
        return odf.clone();
    }

    OnsetFunction {
        values: odf.values.iter().map(|&v| v / max).collect(),
        hop_size: odf.hop_size,
        sample_rate: odf.sample_rate,
    }
}

/// Threshold window length in frames: `round(frames_per_second * seconds)`
pub fn threshold_window_frames(frames_per_second: f32, seconds: f32) -> usize {
    (frames_per_second * seconds).round().max(0.0) as usize
}

/// Local adaptive threshold
///
/// For each frame: the mean of `values` over a centred window of
/// `window_frames` (truncated at the edges), times `multiplier`, plus `floor`.
///
/// # Arguments
///
/// * `values` - Normalized onset function
/// * `window_frames` - Window length in frames (half-width = `window_frames / 2`)
/// * `multiplier` - Scale on the local mean (typically 0.8)
/// * `floor` - Additive constant (typically 0.05)
///
/// # Returns
///
/// One threshold per frame, same length as `values`
pub fn adaptive_threshold(values: &[f32], window_frames: usize, multiplier: f32, floor: f32) -> Vec<f32> {
    let n = values.len();
    let half = window_frames / 2;

    // Prefix sums keep this linear in the signal length
    let mut prefix = Vec::with_capacity(n + 1);
    prefix.push(0.0f64);
    for &v in values {
        let last = prefix[prefix.len() - 1];
        prefix.push(last + v as f64);
    }

    (0..n)
        .map(|i| {
            let lo = i.saturating_sub(half);
            let hi = (i + half + 1).min(n);
            let mean = (prefix[hi] - prefix[lo]) / (hi - lo) as f64;
            mean as f32 * multiplier + floor
        })
        .collect()
}

/// Onset peaks: frames above the threshold that are local maxima
///
/// A peak is strictly greater than its left neighbour and at least its right
/// neighbour, so a plateau reports its first frame. The first and last frames
/// are never peaks.
///
/// # Panics
///
/// Panics if `values` and `threshold` differ in length.
pub fn pick_onset_peaks(values: &[f32], threshold: &[f32]) -> Vec<usize> {
    assert_eq!(
        values.len(),
        threshold.len(),
        "threshold length must match onset function length"
    );

    if values.len() < 3 {
        return Vec::new();
    }

    (1..values.len() - 1)
        .filter(|&i| {
            values[i] > threshold[i] && values[i] > values[i - 1] && values[i] >= values[i + 1]
        })
        .collect()
}
