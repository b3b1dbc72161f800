//! # Stratum Tempo
//!
//! Tempo (BPM) estimation for decoded PCM audio, with a confidence score and
//! the intermediate data needed to display onsets over a waveform.
//!
//! ## Features
//!
//! - **Onset Detection**: Multi-band spectral flux over a hand-rolled radix-2 FFT
//! - **Period Estimation**: Autocorrelation with harmonic enhancement and a comb filterbank
//! - **Octave Correction**: Fusion of both estimators with range-preference disambiguation
//! - **Confidence**: Margin of the winner over the best non-harmonic alternative
//!
//! ## Quick Start
//!
//! ```no_run
//! use stratum_tempo::{analyze_audio, AnalysisConfig, NoProgress, PcmBuffer};
//!
//! // Decoded stereo audio, one Vec<f32> per channel
//! let left: Vec<f32> = vec![]; // Your audio data
//! let right: Vec<f32> = vec![];
//! let buffer = PcmBuffer::new(44100, vec![left, right])?;
//!
//! let result = analyze_audio(&buffer, &AnalysisConfig::default(), &NoProgress)?;
//!
//! println!("BPM: {} (confidence: {:.2})", result.bpm, result.confidence);
//! println!("Onsets: {:?}", result.onset_times_seconds());
//! # Ok::<(), stratum_tempo::AnalysisError>(())
//! ```
//!
//! ## Architecture
//!
//! The analysis pipeline follows this flow:
//!
//! ```text
//! PCM → Mono Mix → Spectral Flux ODF → Normalize → {Autocorrelation, Comb Filter} → Fusion → Result
//! ```
//!
//! Every stage is a plain function and can be called on its own; see
//! [`features`] and [`analysis`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod config;
pub mod error;
pub mod features;
pub mod io;
pub mod preprocessing;

use std::time::Instant;

// Re-export main types
pub use analysis::confidence::ConfidenceLevel;
pub use analysis::progress::{AnalysisStage, NoProgress, ProgressEvent, ProgressObserver};
pub use analysis::result::{AnalysisFlag, AnalysisMetadata, AnalysisResult};
pub use config::{AnalysisConfig, RangePreference};
pub use error::AnalysisError;
pub use features::period::TempoCandidate;
pub use io::pcm_buffer::PcmBuffer;
pub use preprocessing::channel_mixer::AudioSignal;

use analysis::confidence::{second_best_score, tempo_confidence};
use analysis::progress::report;
use features::onset::spectral_flux::{compute_onset_function, frame_count};
use features::onset::threshold::{adaptive_threshold, normalize, pick_onset_peaks, threshold_window_frames};
use features::period::autocorrelation::autocorrelation_scores;
use features::period::candidate_filter::{fuse_scores, select_tempo, FusedScores, TempoSelection};
use features::period::comb_filter::comb_filter_scores;
use features::period::score_map::ScoreMap;
use preprocessing::channel_mixer::mix_to_mono;

/// Number of fused candidates kept in [`AnalysisResult::candidates`]
const MAX_REPORTED_CANDIDATES: usize = 10;

/// Main analysis function
///
/// Estimates the tempo of a PCM buffer and returns the BPM, its confidence
/// and the onset data behind it.
///
/// # Arguments
///
/// * `buffer` - Decoded PCM audio (any number of channels)
/// * `config` - Analysis configuration parameters
/// * `progress` - Observer notified at each pipeline milestone
///
/// # Returns
///
/// `AnalysisResult` with BPM, confidence and onset data. Audio too short for
/// two analysis frames, or without any onset energy, yields BPM 0 and
/// confidence 0 with [`AnalysisFlag::InsufficientSignal`] or
/// [`AnalysisFlag::SilentSignal`] set.
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` if `config` fails validation.
///
/// # Example
///
/// ```no_run
/// use stratum_tempo::{analyze_audio, AnalysisConfig, PcmBuffer};
///
/// let buffer = PcmBuffer::mono(vec![0.0f32; 44100 * 30], 44100)?; // 30 seconds of silence
/// let result = analyze_audio(&buffer, &AnalysisConfig::default(), &|percent: u8, stage: &str| {
///     println!("{:>3}% {}", percent, stage);
/// })?;
/// assert_eq!(result.bpm, 0);
/// # Ok::<(), stratum_tempo::AnalysisError>(())
/// ```
pub fn analyze_audio(
    buffer: &PcmBuffer,
    config: &AnalysisConfig,
    progress: &dyn ProgressObserver,
) -> Result<AnalysisResult, AnalysisError> {
    let start_time = Instant::now();
    config.validate()?;

    log::debug!(
        "Starting tempo analysis: {} samples x {} channel(s) at {} Hz",
        buffer.sample_count(),
        buffer.channel_count(),
        buffer.sample_rate()
    );

    let signal = mix_to_mono(buffer);

    // Spectral flux onset function
    report(progress, AnalysisStage::Spectral);
    let Some(raw_odf) = compute_onset_function(&signal, config) else {
        let frames = frame_count(signal.len(), config.frame_size, config.hop_size);
        log::warn!("Insufficient audio for tempo analysis ({} frames)", frames);
        report(progress, AnalysisStage::Done);
        return Ok(undetermined_result(
            signal,
            config,
            frames,
            AnalysisFlag::InsufficientSignal,
            start_time,
        ));
    };

    // Normalization and descriptive onset markers
    report(progress, AnalysisStage::OnsetDetection);
    let odf = normalize(&raw_odf);
    let window = threshold_window_frames(odf.frames_per_second(), config.threshold_window_seconds);
    let threshold = adaptive_threshold(
        &odf.values,
        window,
        config.threshold_multiplier,
        config.threshold_floor,
    );
    let onsets = pick_onset_peaks(&odf.values, &threshold);
    log::debug!("Detected {} onsets in {} frames", onsets.len(), odf.len());

    // Periodicity estimators (independent, read-only on the onset function)
    let (autocorr, comb) = run_estimators(&odf, config, progress);

    // Fusion and selection
    report(progress, AnalysisStage::Fusion);
    let fused = fuse_scores(&autocorr, &comb, config);
    let mut flags = Vec::new();
    let (bpm, confidence, candidates) = match select_tempo(&fused, config) {
        Some(selection) => {
            let second = second_best_score(&fused.candidates, selection.bpm);
            if second.map_or(true, |s| s <= 0.0) {
                flags.push(AnalysisFlag::NoHarmonicAlternative);
            }
            if selection.octave_corrected {
                flags.push(AnalysisFlag::OctaveCorrected);
            }
            let confidence = tempo_confidence(selection.adjusted_score, second);
            (
                selection.rounded_bpm(),
                confidence,
                reported_candidates(&fused, &selection),
            )
        }
        None => {
            log::warn!("No tempo candidates; onset function carries no periodic energy");
            flags.push(AnalysisFlag::SilentSignal);
            (0, 0.0, Vec::new())
        }
    };

    report(progress, AnalysisStage::Visualization);
    let processing_time_ms = start_time.elapsed().as_secs_f32() * 1000.0;

    log::info!(
        "Tempo analysis complete: {} BPM (confidence {:.2}) in {:.1} ms",
        bpm,
        confidence,
        processing_time_ms
    );

    let metadata = metadata(&signal, processing_time_ms);
    let result = AnalysisResult {
        bpm,
        confidence,
        hop_size: odf.hop_size,
        frame_count: odf.len(),
        onset_function: odf.values,
        threshold,
        onsets,
        signal,
        flags,
        candidates,
        metadata,
    };

    report(progress, AnalysisStage::Done);
    Ok(result)
}

/// Analyze mono samples without progress reporting
///
/// Convenience wrapper around [`analyze_audio`].
///
/// # Errors
///
/// Returns `AnalysisError` if the samples or `config` are invalid (zero
/// sample rate, empty or non-finite samples, inconsistent parameters).
pub fn analyze_mono(
    samples: &[f32],
    sample_rate: u32,
    config: &AnalysisConfig,
) -> Result<AnalysisResult, AnalysisError> {
    let buffer = PcmBuffer::mono(samples.to_vec(), sample_rate)?;
    analyze_audio(&buffer, config, &NoProgress)
}

/// Run autocorrelation and comb filter, on the rayon pool if configured
fn run_estimators(
    odf: &features::onset::OnsetFunction,
    config: &AnalysisConfig,
    progress: &dyn ProgressObserver,
) -> (ScoreMap, ScoreMap) {
    if config.parallel_estimators {
        report(progress, AnalysisStage::Autocorrelation);
        report(progress, AnalysisStage::CombFilter);
        rayon::join(
            || autocorrelation_scores(odf, config),
            || comb_filter_scores(odf, config),
        )
    } else {
        report(progress, AnalysisStage::Autocorrelation);
        let autocorr = autocorrelation_scores(odf, config);
        report(progress, AnalysisStage::CombFilter);
        let comb = comb_filter_scores(odf, config);
        (autocorr, comb)
    }
}

/// Top fused candidates with the winner marked (and appended if ranked lower)
fn reported_candidates(fused: &FusedScores, selection: &TempoSelection) -> Vec<TempoCandidate> {
    let mut candidates: Vec<TempoCandidate> = fused
        .candidates
        .iter()
        .take(MAX_REPORTED_CANDIDATES)
        .cloned()
        .collect();

    match candidates.get_mut(selection.index) {
        Some(winner) => winner.selected = true,
        None => {
            if let Some(winner) = fused.candidates.get(selection.index) {
                candidates.push(TempoCandidate {
                    selected: true,
                    ..winner.clone()
                });
            }
        }
    }

    candidates
}

fn metadata(signal: &AudioSignal, processing_time_ms: f32) -> AnalysisMetadata {
    AnalysisMetadata {
        duration_seconds: signal.duration_seconds(),
        sample_rate: signal.sample_rate,
        processing_time_ms,
        algorithm_version: env!("CARGO_PKG_VERSION").to_string(),
    }
}

/// BPM 0 / confidence 0 result with empty onset data
fn undetermined_result(
    signal: AudioSignal,
    config: &AnalysisConfig,
    frame_count: usize,
    flag: AnalysisFlag,
    start_time: Instant,
) -> AnalysisResult {
    let metadata = metadata(&signal, start_time.elapsed().as_secs_f32() * 1000.0);
    AnalysisResult {
        bpm: 0,
        confidence: 0.0,
        onset_function: Vec::new(),
        threshold: Vec::new(),
        onsets: Vec::new(),
        hop_size: config.hop_size,
        frame_count,
        signal,
        flags: vec![flag],
        candidates: Vec::new(),
        metadata,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reported_candidates_marks_winner() {
        let candidates: Vec<TempoCandidate> = (0..15)
            .map(|i| TempoCandidate {
                bpm: 100.0 + i as f32,
                score: 1.0 - i as f32 * 0.01,
                autocorr: 0.0,
                comb: 0.0,
                selected: false,
            })
            .collect();
        let fused = FusedScores {
            candidates,
            map: ScoreMap::new(),
        };

        let selection = TempoSelection {
            bpm: 102.0,
            index: 2,
            adjusted_score: 1.0,
            octave_corrected: false,
        };
        let reported = reported_candidates(&fused, &selection);
        assert_eq!(reported.len(), 10);
        assert_eq!(reported.iter().filter(|c| c.selected).count(), 1);
        assert!(reported[2].selected);

        let selection = TempoSelection {
            bpm: 112.0,
            index: 12,
            adjusted_score: 1.0,
            octave_corrected: true,
        };
        let reported = reported_candidates(&fused, &selection);
        assert_eq!(reported.len(), 11);
        assert!(reported[10].selected);
        assert_eq!(reported[10].bpm, 112.0);
    }

    #[test]
    fn test_analyze_mono_rejects_bad_input() {
        let config = AnalysisConfig::default();
        assert!(analyze_mono(&[], 44100, &config).is_err());
        assert!(analyze_mono(&[0.0; 100], 0, &config).is_err());
        assert!(matches!(
            analyze_mono(&[f32::NAN; 100], 44100, &config),
            Err(AnalysisError::NumericalError(_))
        ));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = AnalysisConfig {
            frame_size: 1000,
            ..AnalysisConfig::default()
        };
        let buffer = PcmBuffer::mono(vec![0.0; 44100], 44100).unwrap();
        assert!(matches!(
            analyze_audio(&buffer, &config, &NoProgress),
            Err(AnalysisError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_insufficient_audio() {
        let result = analyze_mono(&[0.1; 2048 + 256], 44100, &AnalysisConfig::default()).unwrap();
        assert_eq!(result.bpm, 0);
        assert_eq!(result.confidence, 0.0);
        assert!(result.onsets.is_empty());
        assert!(result.onset_function.is_empty());
        assert!(result.has_flag(AnalysisFlag::InsufficientSignal));
    }
}
