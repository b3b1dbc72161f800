//! Analysis result types

use serde::{Deserialize, Serialize};

use super::confidence::ConfidenceLevel;
use crate::features::period::TempoCandidate;
use crate::preprocessing::channel_mixer::AudioSignal;

/// Analysis flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalysisFlag {
    /// Fewer than two analysis frames; nothing was estimated
    InsufficientSignal,
    /// Onset function or score maps carried no energy; nothing was estimated
    SilentSignal,
    /// A stronger candidate was rejected in favour of its octave partner
    OctaveCorrected,
    /// Every strong candidate is a harmonic relative of the winner
    NoHarmonicAlternative,
}

/// Analysis metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    /// Audio duration in seconds
    pub duration_seconds: f32,

    /// Sample rate in Hz
    pub sample_rate: u32,

    /// Processing time in milliseconds
    pub processing_time_ms: f32,

    /// Algorithm version
    pub algorithm_version: String,
}

/// Complete analysis result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Tempo in BPM, 0 when undetermined
    pub bpm: u32,

    /// Tempo confidence (0.0-1.0)
    pub confidence: f32,

    /// Normalized onset function (one value per frame, max 1.0)
    pub onset_function: Vec<f32>,

    /// Adaptive threshold, same length as `onset_function`
    pub threshold: Vec<f32>,

    /// Frame indices of the detected onsets
    pub onsets: Vec<usize>,

    /// Samples between frame starts
    pub hop_size: usize,

    /// Number of analysis frames
    pub frame_count: usize,

    /// Mono signal the analysis ran on, kept for waveform display
    #[serde(skip)]
    pub signal: AudioSignal,

    /// Analysis flags
    pub flags: Vec<AnalysisFlag>,

    /// Strongest fused tempo candidates, highest score first
    pub candidates: Vec<TempoCandidate>,

    /// Analysis metadata
    pub metadata: AnalysisMetadata,
}

impl AnalysisResult {
    /// Confidence tier of this result
    pub fn confidence_level(&self) -> ConfidenceLevel {
        ConfidenceLevel::from_confidence(self.confidence)
    }

    /// True if `flag` was raised during analysis
    pub fn has_flag(&self, flag: AnalysisFlag) -> bool {
        self.flags.contains(&flag)
    }

    /// Start time of `frame` in seconds
    pub fn frame_time_seconds(&self, frame: usize) -> f32 {
        if self.metadata.sample_rate == 0 {
            return 0.0;
        }
        (frame * self.hop_size) as f32 / self.metadata.sample_rate as f32
    }

    /// Onset positions in seconds
    pub fn onset_times_seconds(&self) -> Vec<f32> {
        self.onsets
            .iter()
            .map(|&frame| self.frame_time_seconds(frame))
            .collect()
    }

    /// Per-column `(min, max)` of the mono signal for waveform display
    ///
    /// Each column covers `ceil(len / columns)` samples; columns past the end
    /// of the signal are `(0.0, 0.0)`. Returns an empty vector when `columns`
    /// is 0.
    pub fn waveform_envelope(&self, columns: usize) -> Vec<(f32, f32)> {
        let samples = &self.signal.samples;
        if columns == 0 {
            return Vec::new();
        }
        if samples.is_empty() {
            return vec![(0.0, 0.0); columns];
        }

        let step = samples.len().div_ceil(columns);
        (0..columns)
            .map(|col| {
                let start = (col * step).min(samples.len());
                let end = (start + step).min(samples.len());
                let chunk = &samples[start..end];
                if chunk.is_empty() {
                    return (0.0, 0.0);
                }
                chunk
                    .iter()
                    .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &s| {
                        (lo.min(s), hi.max(s))
                    })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result_with(signal: Vec<f32>, onsets: Vec<usize>) -> AnalysisResult {
        AnalysisResult {
            bpm: 120,
            confidence: 0.75,
            onset_function: vec![],
            threshold: vec![],
            onsets,
            hop_size: 512,
            frame_count: 0,
            signal: AudioSignal {
                sample_rate: 44100,
                samples: signal,
            },
            flags: vec![AnalysisFlag::OctaveCorrected],
            candidates: vec![],
            metadata: AnalysisMetadata {
                duration_seconds: 0.0,
                sample_rate: 44100,
                processing_time_ms: 0.0,
                algorithm_version: "test".to_string(),
            },
        }
    }

    #[test]
    fn test_onset_times() {
        let result = result_with(vec![], vec![0, 86, 172]);
        let times = result.onset_times_seconds();
        assert_eq!(times.len(), 3);
        assert_eq!(times[0], 0.0);
        assert!((times[1] - 86.0 * 512.0 / 44100.0).abs() < 1e-6);
        assert!((result.frame_time_seconds(172) - 1.9969).abs() < 1e-3);
    }

    #[test]
    fn test_waveform_envelope() {
        let result = result_with(vec![0.5, -0.25, 1.0, 0.0, -1.0], vec![]);
        let envelope = result.waveform_envelope(3);
        // step = ceil(5 / 3) = 2
        assert_eq!(envelope, vec![(-0.25, 0.5), (0.0, 1.0), (-1.0, -1.0)]);

        let envelope = result.waveform_envelope(8);
        assert_eq!(envelope.len(), 8);
        assert_eq!(envelope[7], (0.0, 0.0));
        assert!(result.waveform_envelope(0).is_empty());
    }

    #[test]
    fn test_confidence_level_and_flags() {
        let result = result_with(vec![], vec![]);
        assert_eq!(result.confidence_level(), ConfidenceLevel::High);
        assert!(result.has_flag(AnalysisFlag::OctaveCorrected));
        assert!(!result.has_flag(AnalysisFlag::SilentSignal));
    }

    #[test]
    fn test_serialization_skips_signal() {
        let result = result_with(vec![0.1; 1000], vec![3]);
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"bpm\":120"));
        assert!(!json.contains("signal"));

        let back: AnalysisResult = serde_json::from_str(&json).unwrap();
        assert!(back.signal.is_empty());
        assert_eq!(back.onsets, vec![3]);
    }
}
