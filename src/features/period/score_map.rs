//! BPM → score map with fixed-point keys
//!
//! Keys are stored in tenths of a BPM, so both the 0.1 BPM autocorrelation
//! grid and the 0.5 BPM comb grid are represented exactly. Iteration is in
//! ascending BPM order, which keeps every consumer deterministic.

use std::collections::BTreeMap;

/// Quantize a BPM value to tenths (round half up for positive values)
pub fn to_deci_bpm(bpm: f64) -> u32 {
    (bpm * 10.0).round().max(0.0) as u32
}

/// BPM value of a tenths key
pub fn from_deci_bpm(deci: u32) -> f32 {
    deci as f32 / 10.0
}

/// Snap a tenths key to the nearest 0.5 BPM
pub fn snap_to_half_bpm(deci: u32) -> u32 {
    ((deci as f64 / 5.0).round() as u32) * 5
}

/// Map from quantized BPM to a non-negative score
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreMap {
    scores: BTreeMap<u32, f32>,
}

impl ScoreMap {
    /// Empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// True if the map has no entries
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Insert `score` at `bpm` (quantized to 0.1), keeping the larger score on collision
    pub fn insert_max(&mut self, bpm: f64, score: f32) {
        self.insert_max_deci(to_deci_bpm(bpm), score);
    }

    /// Insert at a key already in tenths of a BPM, keeping the larger score on collision
    pub fn insert_max_deci(&mut self, deci: u32, score: f32) {
        self.scores
            .entry(deci)
            .and_modify(|s| *s = s.max(score))
            .or_insert(score);
    }

    /// Score stored at exactly `bpm` (after quantization)
    pub fn get(&self, bpm: f64) -> Option<f32> {
        self.scores.get(&to_deci_bpm(bpm)).copied()
    }

    /// Highest score among keys within `tolerance` BPM of `target`, 0.0 if none
    pub fn score_near(&self, target: f64, tolerance: f64) -> f32 {
        let lo = to_deci_bpm((target - tolerance).max(0.0)).saturating_sub(1);
        let hi = to_deci_bpm(target + tolerance) + 1;

        self.scores
            .range(lo..=hi)
            .filter(|(&deci, _)| (deci as f64 / 10.0 - target).abs() <= tolerance)
            .map(|(_, &score)| score)
            .fold(0.0f32, f32::max)
    }

    /// Largest score, 0.0 when empty
    pub fn max(&self) -> f32 {
        self.scores.values().copied().fold(0.0f32, f32::max)
    }

    /// Copy with every score divided by the maximum
    ///
    /// The result's maximum is exactly 1.0 and relative order is preserved.
    /// Returns an empty map when the maximum is zero.
    pub fn normalized(&self) -> ScoreMap {
        let max = self.max();
        if max <= 0.0 {
            return ScoreMap::new();
        }

        ScoreMap {
            scores: self.scores.iter().map(|(&k, &v)| (k, v / max)).collect(),
        }
    }

    /// Keys in tenths of a BPM, ascending
    pub fn keys(&self) -> impl Iterator<Item = u32> + '_ {
        self.scores.keys().copied()
    }

    /// `(bpm, score)` pairs in ascending BPM order
    pub fn iter(&self) -> impl Iterator<Item = (f32, f32)> + '_ {
        self.scores.iter().map(|(&k, &v)| (from_deci_bpm(k), v))
    }
}
