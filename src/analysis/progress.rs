//! Progress notification
//!
//! The pipeline reports coarse milestones to a passive observer. Observers
//! only receive notifications; they cannot influence or cancel the analysis,
//! and a failing observer (e.g. a disconnected channel) is ignored.

use std::sync::mpsc::Sender;

use serde::{Deserialize, Serialize};

/// Pipeline milestone with a fixed completion percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalysisStage {
    /// Audio decoded into PCM (reported by the decoder, not the core)
    Decoded,
    /// Spectral analysis started
    Spectral,
    /// Onset function extracted
    OnsetDetection,
    /// Autocorrelation estimator
    Autocorrelation,
    /// Comb filter estimator
    CombFilter,
    /// Score fusion and tempo selection
    Fusion,
    /// Visualization data ready
    Visualization,
    /// Analysis complete
    Done,
}

impl AnalysisStage {
    /// Completion percentage reported with this stage
    pub fn percent(&self) -> u8 {
        match self {
            AnalysisStage::Decoded => 40,
            AnalysisStage::Spectral => 45,
            AnalysisStage::OnsetDetection => 55,
            AnalysisStage::Autocorrelation => 65,
            AnalysisStage::CombFilter => 75,
            AnalysisStage::Fusion => 85,
            AnalysisStage::Visualization => 90,
            AnalysisStage::Done => 100,
        }
    }

    /// Human-readable stage label
    pub fn label(&self) -> &'static str {
        match self {
            AnalysisStage::Decoded => "Audio decoded",
            AnalysisStage::Spectral => "Spectral analysis",
            AnalysisStage::OnsetDetection => "Onset detection",
            AnalysisStage::Autocorrelation => "Autocorrelation",
            AnalysisStage::CombFilter => "Comb filter",
            AnalysisStage::Fusion => "Tempo fusion",
            AnalysisStage::Visualization => "Preparing visualization",
            AnalysisStage::Done => "Done",
        }
    }
}

/// Passive receiver of progress notifications
pub trait ProgressObserver {
    /// Called at each milestone with the completion percentage (0-100) and a label
    fn on_progress(&self, percent: u8, stage: &str);
}

/// Notify `observer` of `stage`
pub fn report(observer: &dyn ProgressObserver, stage: AnalysisStage) {
    observer.on_progress(stage.percent(), stage.label());
}

/// Observer that discards every notification
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_progress(&self, _percent: u8, _stage: &str) {}
}

impl<F> ProgressObserver for F
where
    F: Fn(u8, &str),
{
    fn on_progress(&self, percent: u8, stage: &str) {
        self(percent, stage);
    }
}

/// Owned progress notification, for sending across threads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// Completion percentage (0-100)
    pub percent: u8,
    /// Stage label
    pub stage: String,
}

impl ProgressObserver for Sender<ProgressEvent> {
    fn on_progress(&self, percent: u8, stage: &str) {
        // A dropped receiver must not affect the analysis
        let _ = self.send(ProgressEvent {
            percent,
            stage: stage.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::sync::mpsc;

    const ALL_STAGES: [AnalysisStage; 8] = [
        AnalysisStage::Decoded,
        AnalysisStage::Spectral,
        AnalysisStage::OnsetDetection,
        AnalysisStage::Autocorrelation,
        AnalysisStage::CombFilter,
        AnalysisStage::Fusion,
        AnalysisStage::Visualization,
        AnalysisStage::Done,
    ];

    #[test]
    fn test_stage_percents_increase() {
        for pair in ALL_STAGES.windows(2) {
            assert!(pair[0].percent() < pair[1].percent());
        }
        assert_eq!(AnalysisStage::Done.percent(), 100);
    }

    #[test]
    fn test_closure_observer() {
        let seen = RefCell::new(Vec::new());
        let observer = |percent: u8, stage: &str| seen.borrow_mut().push((percent, stage.to_string()));
        report(&observer, AnalysisStage::CombFilter);
        assert_eq!(seen.into_inner(), vec![(75, "Comb filter".to_string())]);
    }

    #[test]
    fn test_channel_observer() {
        let (tx, rx) = mpsc::channel();
        report(&tx, AnalysisStage::Spectral);
        assert_eq!(
            rx.recv().unwrap(),
            ProgressEvent {
                percent: 45,
                stage: "Spectral analysis".to_string()
            }
        );
    }

    #[test]
    fn test_disconnected_channel_is_ignored() {
        let (tx, rx) = mpsc::channel::<ProgressEvent>();
        drop(rx);
        report(&tx, AnalysisStage::Done);
    }

    #[test]
    fn test_no_progress() {
        report(&NoProgress, AnalysisStage::Fusion);
    }
}
