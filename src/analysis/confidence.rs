//! Tempo confidence scoring
//!
//! Confidence measures how clearly the winning tempo stands out from the
//! strongest candidate that is *not* one of its harmonic relatives. Octave
//! and triplet partners of the winner support it rather than compete with it,
//! so they are skipped when looking for the runner-up.
//!
//! # Formula
//!
//! ```text
//! confidence = clamp(((best - second) / (best + second)) * 1.5 + 0.2, 0, 1)
//! ```
//!
//! where `best` is the winner's range-adjusted score and `second` the fused
//! score of the best non-harmonic alternative. Without such an alternative
//! the confidence is 0.9.
//!
//! # Example
//!
//! ```
//! use stratum_tempo::analysis::confidence::{is_harmonic_relative, tempo_confidence};
//!
//! assert!(is_harmonic_relative(120.0, 60.0));
//! assert!(!is_harmonic_relative(120.0, 100.0));
//! assert_eq!(tempo_confidence(1.0, None), 0.9);
//! ```

use serde::{Deserialize, Serialize};

use crate::features::period::TempoCandidate;

/// Confidence used when no non-harmonic alternative exists
pub const NO_ALTERNATIVE_CONFIDENCE: f32 = 0.9;

/// `(ratio, tolerance)` pairs recognised as harmonic relations, `ratio = a / b`
const HARMONIC_RATIOS: [(f32, f32); 7] = [
    (1.0, 0.06),
    (2.0, 0.12),
    (0.5, 0.06),
    (3.0, 0.12),
    (1.0 / 3.0, 0.06),
    (1.5, 0.1),
    (2.0 / 3.0, 0.1),
];

/// Three-tier confidence label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    /// Confidence >= 0.7
    High,
    /// Confidence in [0.4, 0.7)
    Medium,
    /// Confidence < 0.4
    Low,
}

impl ConfidenceLevel {
    /// Classify a confidence value in [0, 1]
    pub fn from_confidence(confidence: f32) -> Self {
        if confidence >= 0.7 {
            ConfidenceLevel::High
        } else if confidence >= 0.4 {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }

    /// Human-readable label: "High", "Medium" or "Low"
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLevel::High => "High",
            ConfidenceLevel::Medium => "Medium",
            ConfidenceLevel::Low => "Low",
        }
    }
}

/// True if `a` and `b` are the same tempo or an octave/triplet relation of it
///
/// Non-positive tempi are never related.
pub fn is_harmonic_relative(a: f32, b: f32) -> bool {
    if a <= 0.0 || b <= 0.0 {
        return false;
    }

    let ratio = a / b;
    HARMONIC_RATIOS
        .iter()
        .any(|&(target, tolerance)| (ratio - target).abs() < tolerance)
}

/// Fused score of the best candidate that is not a harmonic relative of `winner_bpm`
///
/// `candidates` must be sorted by score, highest first.
pub fn second_best_score(candidates: &[TempoCandidate], winner_bpm: f32) -> Option<f32> {
    candidates
        .iter()
        .find(|c| !is_harmonic_relative(winner_bpm, c.bpm))
        .map(|c| c.score)
}

/// Confidence of the winning tempo
///
/// # Arguments
///
/// * `best` - Winner's range-adjusted fused score
/// * `second` - Score of the best non-harmonic alternative, if any
///
/// # Returns
///
/// Value in [0, 1]; 0.9 when there is no (positive) alternative.
pub fn tempo_confidence(best: f32, second: Option<f32>) -> f32 {
    match second {
        Some(second) if second > 0.0 && best + second > 0.0 => {
            (((best - second) / (best + second)) * 1.5 + 0.2).clamp(0.0, 1.0)
        }
        _ => NO_ALTERNATIVE_CONFIDENCE,
    }
}
