//! BPM candidate fusion and octave disambiguation
//!
//! Merges the autocorrelation and comb filter score maps, then picks the
//! final tempo while resolving octave errors toward the preferred range.

use std::collections::BTreeSet;

use super::score_map::{from_deci_bpm, snap_to_half_bpm, ScoreMap};
use super::TempoCandidate;
use crate::config::AnalysisConfig;

/// Lookup tolerance (BPM) when aligning the two estimators on the 0.5 grid
const FUSION_TOLERANCE_BPM: f64 = 0.5;

/// Lookup tolerance (BPM) when checking a candidate's double or half
const HARMONIC_TOLERANCE_BPM: f64 = 1.0;

/// Fused scores on a 0.5 BPM grid
#[derive(Debug, Clone, Default)]
pub struct FusedScores {
    /// Candidates sorted by fused score, highest first (ties: lower BPM first)
    pub candidates: Vec<TempoCandidate>,

    /// The same fused scores keyed by BPM
    pub map: ScoreMap,
}

impl FusedScores {
    /// True if neither estimator produced a usable score
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Outcome of tempo selection
#[derive(Debug, Clone, PartialEq)]
pub struct TempoSelection {
    /// Winning tempo on the 0.5 BPM grid
    pub bpm: f32,

    /// Index of the winner in [`FusedScores::candidates`]
    pub index: usize,

    /// Fused score times the range preference multiplier
    pub adjusted_score: f32,

    /// True if a higher-ranked candidate was discarded as an octave error
    pub octave_corrected: bool,
}

impl TempoSelection {
    /// Winning tempo rounded to the nearest integer BPM
    pub fn rounded_bpm(&self) -> u32 {
        self.bpm.round().max(0.0) as u32
    }
}

/// Merge the two estimator maps into one fused score per 0.5 BPM
///
/// Both maps are normalized by their own maximum (a map whose maximum is zero
/// contributes nothing). Every key of either map is snapped to the nearest
/// 0.5 BPM; for each snapped BPM the best normalized score within ±0.5 BPM is
/// taken from each map and combined as
/// `autocorr_weight × autocorr + comb_weight × comb`.
pub fn fuse_scores(autocorr: &ScoreMap, comb: &ScoreMap, config: &AnalysisConfig) -> FusedScores {
    let autocorr = autocorr.normalized();
    let comb = comb.normalized();

    let grid: BTreeSet<u32> = autocorr
        .keys()
        .chain(comb.keys())
        .map(snap_to_half_bpm)
        .collect();

    log::debug!(
        "Fusing {} autocorrelation and {} comb scores onto {} grid points",
        autocorr.len(),
        comb.len(),
        grid.len()
    );

    let mut map = ScoreMap::new();
    let mut candidates: Vec<TempoCandidate> = grid
        .into_iter()
        .map(|deci| {
            let bpm = deci as f64 / 10.0;
            let ac = autocorr.score_near(bpm, FUSION_TOLERANCE_BPM);
            let cf = comb.score_near(bpm, FUSION_TOLERANCE_BPM);
            let score = config.autocorr_weight * ac + config.comb_weight * cf;
            map.insert_max_deci(deci, score);
            TempoCandidate {
                bpm: from_deci_bpm(deci),
                score,
                autocorr: ac,
                comb: cf,
                selected: false,
            }
        })
        .collect();

    // Stable sort keeps ascending BPM order among equal scores
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));

    FusedScores { candidates, map }
}

/// Range preference multiplier for a BPM
pub fn range_weight(bpm: f32, config: &AnalysisConfig) -> f32 {
    if config.preferred_range.contains(bpm) {
        config.preferred_range.weight
    } else if config.extended_range.contains(bpm) {
        config.extended_range.weight
    } else {
        1.0
    }
}

/// True if an octave partner of `bpm` in the preferred range outscores it
///
/// A candidate outside the preferred range is dominated when its double
/// (if <= `max_bpm`) or its half (if >= `min_bpm`) lies in the preferred range
/// and has a fused score, looked up within ±1 BPM, above
/// `dominance_ratio × score`.
pub fn is_dominated(bpm: f32, score: f32, fused: &ScoreMap, config: &AnalysisConfig) -> bool {
    let preferred = &config.preferred_range;
    if preferred.contains(bpm) {
        return false;
    }

    let threshold = score * config.dominance_ratio;
    let partner_dominates = |partner: f32| {
        preferred.contains(partner)
            && fused.score_near(partner as f64, HARMONIC_TOLERANCE_BPM) > threshold
    };

    let double = bpm * 2.0;
    let half = bpm / 2.0;
    (double <= config.max_bpm && partner_dominates(double))
        || (half >= config.min_bpm && partner_dominates(half))
}

/// Select the final tempo from the fused candidates
///
/// Only candidates scoring at least `candidate_ratio` of the top score are
/// considered. Each gets its range preference multiplier; dominated
/// candidates (see [`is_dominated`]) are skipped, and the highest adjusted
/// score wins. If every candidate is dominated the top candidate is kept.
///
/// # Returns
///
/// `None` if there are no candidates.
pub fn select_tempo(fused: &FusedScores, config: &AnalysisConfig) -> Option<TempoSelection> {
    let top = fused.candidates.first()?;
    let cutoff = top.score * config.candidate_ratio;

    let mut best: Option<TempoSelection> = None;
    let mut first_dominated: Option<usize> = None;

    for (index, candidate) in fused.candidates.iter().enumerate() {
        if candidate.score < cutoff {
            break;
        }

        if is_dominated(candidate.bpm, candidate.score, &fused.map, config) {
            log::debug!(
                "Candidate {:.1} BPM (score {:.3}) dominated by its octave partner",
                candidate.bpm,
                candidate.score
            );
            first_dominated.get_or_insert(index);
            continue;
        }

        let adjusted = candidate.score * range_weight(candidate.bpm, config);
        if best.as_ref().map_or(true, |b| adjusted > b.adjusted_score) {
            best = Some(TempoSelection {
                bpm: candidate.bpm,
                index,
                adjusted_score: adjusted,
                octave_corrected: false,
            });
        }
    }

    let mut selection = best.unwrap_or_else(|| {
        log::warn!("All tempo candidates dominated; keeping top candidate {:.1} BPM", top.bpm);
        TempoSelection {
            bpm: top.bpm,
            index: 0,
            adjusted_score: top.score * range_weight(top.bpm, config),
            octave_corrected: false,
        }
    });
    selection.octave_corrected = first_dominated.is_some_and(|d| d < selection.index);

    log::debug!(
        "Selected {:.1} BPM (adjusted score {:.3}, octave corrected: {})",
        selection.bpm,
        selection.adjusted_score,
        selection.octave_corrected
    );

    Some(selection)
}
