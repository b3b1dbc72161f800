//! Channel mixing (multi-channel to mono)

use serde::{Deserialize, Serialize};

use crate::io::pcm_buffer::PcmBuffer;

/// Mono audio signal at a known sample rate
///
/// Produced once per analysis run by [`mix_to_mono`] and never modified
/// afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AudioSignal {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Mono samples, nominally in [-1.0, 1.0]
    pub samples: Vec<f32>,
}

impl AudioSignal {
    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True if the signal holds no samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds
    pub fn duration_seconds(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate as f32
    }
}

/// Average all channels into one
///
/// Each output sample is the arithmetic mean of the channels at that index.
///
/// # Panics
///
/// Panics if the buffer has no channels. [`PcmBuffer`] constructors reject
/// that case, so it can only be reached through a broken invariant.
pub fn mix_to_mono(buffer: &PcmBuffer) -> AudioSignal {
    let channels = buffer.channels();
    assert!(!channels.is_empty(), "mix_to_mono requires at least one channel");

    log::debug!(
        "Mixing {} channel(s) to mono: {} samples at {} Hz",
        channels.len(),
        buffer.sample_count(),
        buffer.sample_rate()
    );

    let samples = if channels.len() == 1 {
        channels[0].clone()
    } else {
        let scale = 1.0 / channels.len() as f32;
        let mut mono = vec![0.0f32; buffer.sample_count()];
        for channel in channels {
            for (out, &sample) in mono.iter_mut().zip(channel) {
                *out += sample * scale;
            }
        }
        mono
    };

    AudioSignal {
        sample_rate: buffer.sample_rate(),
        samples,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mono_passthrough() {
        let buffer = PcmBuffer::mono(vec![0.1, -0.2, 0.3], 8000).unwrap();
        let signal = mix_to_mono(&buffer);
        assert_eq!(signal.samples, vec![0.1, -0.2, 0.3]);
        assert_eq!(signal.sample_rate, 8000);
    }

    #[test]
    fn test_stereo_average() {
        let buffer =
            PcmBuffer::new(44100, vec![vec![1.0, 0.5, -1.0], vec![0.0, 0.5, 1.0]]).unwrap();
        let signal = mix_to_mono(&buffer);
        assert_eq!(signal.len(), 3);
        assert!((signal.samples[0] - 0.5).abs() < 1e-7);
        assert!((signal.samples[1] - 0.5).abs() < 1e-7);
        assert!(signal.samples[2].abs() < 1e-7);
    }

    #[test]
    fn test_three_channels() {
        let buffer = PcmBuffer::new(
            48000,
            vec![vec![0.3; 10], vec![0.6; 10], vec![0.9; 10]],
        )
        .unwrap();
        let signal = mix_to_mono(&buffer);
        assert!(signal.samples.iter().all(|&s| (s - 0.6).abs() < 1e-6));
        assert!((signal.duration_seconds() - 10.0 / 48000.0).abs() < 1e-9);
    }
}
