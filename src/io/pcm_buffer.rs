//! Decoded PCM input buffer
//!
//! This is the hand-off point from the decoding collaborator: a
//! multi-channel, planar, `f32` sample buffer with a known sample rate.

use crate::error::AnalysisError;

/// Decoded multi-channel audio, one `Vec<f32>` per channel
///
/// Invariants (checked by every constructor): positive sample rate, at least
/// one channel, all channels the same length, all samples finite.
#[derive(Debug, Clone, PartialEq)]
pub struct PcmBuffer {
    sample_rate: u32,
    channels: Vec<Vec<f32>>,
}

impl PcmBuffer {
    /// Create a buffer from planar channel data
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidInput` for a zero sample rate, zero
    /// channels, empty channels or ragged channel lengths, and `AnalysisError::NumericalError`
    /// for NaN or infinite samples.
    pub fn new(sample_rate: u32, channels: Vec<Vec<f32>>) -> Result<Self, AnalysisError> {
        if sample_rate == 0 {
            return Err(AnalysisError::InvalidInput(
                "Invalid sample rate: 0".to_string(),
            ));
        }

        let Some(first) = channels.first() else {
            return Err(AnalysisError::InvalidInput(
                "PCM buffer has no channels".to_string(),
            ));
        };

        let length = first.len();
        if length == 0 {
            return Err(AnalysisError::InvalidInput(
                "PCM buffer has no samples".to_string(),
            ));
        }

        if let Some((idx, ch)) = channels.iter().enumerate().find(|(_, ch)| ch.len() != length) {
            return Err(AnalysisError::InvalidInput(format!(
                "Channel {} has {} samples, expected {}",
                idx,
                ch.len(),
                length
            )));
        }

        if channels.iter().flatten().any(|s| !s.is_finite()) {
            return Err(AnalysisError::NumericalError(
                "PCM buffer contains non-finite samples".to_string(),
            ));
        }

        Ok(Self {
            sample_rate,
            channels,
        })
    }

    /// Create a single-channel buffer
    ///
    /// # Errors
    ///
    /// Same as [`PcmBuffer::new`].
    pub fn mono(samples: Vec<f32>, sample_rate: u32) -> Result<Self, AnalysisError> {
        Self::new(sample_rate, vec![samples])
    }

    /// De-interleave `[L0, R0, L1, R1, ...]` style data
    ///
    /// A trailing partial frame is dropped.
    ///
    /// # Errors
    ///
    /// Same as [`PcmBuffer::new`]; `channel_count == 0` is `InvalidInput`.
    pub fn from_interleaved(
        samples: &[f32],
        channel_count: usize,
        sample_rate: u32,
    ) -> Result<Self, AnalysisError> {
        if channel_count == 0 {
            return Err(AnalysisError::InvalidInput(
                "Channel count must be > 0".to_string(),
            ));
        }

        let frames = samples.len() / channel_count;
        let mut channels = vec![Vec::with_capacity(frames); channel_count];
        for frame in samples.chunks_exact(channel_count) {
            for (channel, &sample) in channels.iter_mut().zip(frame) {
                channel.push(sample);
            }
        }

        Self::new(sample_rate, channels)
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of channels (always >= 1)
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Samples per channel
    pub fn sample_count(&self) -> usize {
        self.channels[0].len()
    }

    /// Samples of one channel
    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    /// All channels
    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    /// Duration in seconds
    pub fn duration_seconds(&self) -> f32 {
        self.sample_count() as f32 / self.sample_rate as f32
    }
}
