//! Multi-band spectral flux onset detection function
//!
//! Algorithm:
//! 1. Slice the mono signal into `frame_size` windows every `hop_size` samples
//! 2. Apply a Hann window and take the magnitude of the first `frame_size / 2` FFT bins
//! 3. Per frequency band, sum the half-wave rectified magnitude increase
//!    against the previous frame: `max(0, |X_n[k]| - |X_{n-1}[k]|)`
//! 4. Sum the band fluxes into one onset strength per frame
//!
//! # Reference
//!
//! Bello, J. P., Daudet, L., Abdallah, S., Duxbury, C., Davies, M., & Sandler, M. B. (2005).
//! A Tutorial on Onset Detection in Music Signals.
//! *IEEE Transactions on Speech and Audio Processing*, 13(5), 1035-1047.
//!
//! # Example
//!
//! ```
//! use stratum_tempo::features::onset::spectral_flux::compute_onset_function;
//! use stratum_tempo::preprocessing::channel_mixer::AudioSignal;
//! use stratum_tempo::AnalysisConfig;
//!
//! let signal = AudioSignal { sample_rate: 44100, samples: vec![0.0; 44100] };
//! let odf = compute_onset_function(&signal, &AnalysisConfig::default()).unwrap();
//! assert_eq!(odf.len(), (44100 - 2048) / 512);
//! ```

use std::ops::Range;

use super::OnsetFunction;
use crate::config::AnalysisConfig;
use crate::features::fft::RadixTwoFft;
use crate::preprocessing::channel_mixer::AudioSignal;

/// Number of analysis frames for a signal: `floor((len - frame) / hop)`
///
/// Zero when the signal is shorter than one frame.
pub fn frame_count(sample_count: usize, frame_size: usize, hop_size: usize) -> usize {
    sample_count
        .checked_sub(frame_size)
        .map_or(0, |span| span / hop_size)
}

/// FFT bin ranges of each band
///
/// `edges_hz` are the lower band edges; Nyquist closes the last band. Edges
/// map to bins with `floor` (lower) and `ceil` (upper), clamped to
/// `[0, frame_size / 2]`. A bin shared by two adjacent bands belongs to the
/// lower one.
pub fn band_bin_ranges(edges_hz: &[f32], sample_rate: u32, frame_size: usize) -> Vec<Range<usize>> {
    let half = frame_size / 2;
    let bin_width = sample_rate as f64 / frame_size as f64;
    let nyquist = sample_rate as f64 / 2.0;

    let uppers = edges_hz.iter().skip(1).map(|&e| e as f64).chain([nyquist]);
    let mut prev_hi = 0usize;

    edges_hz
        .iter()
        .zip(uppers)
        .map(|(&lo_hz, hi_hz)| {
            let lo = ((lo_hz as f64 / bin_width).floor().max(0.0) as usize).min(half);
            let hi = ((hi_hz / bin_width).ceil().max(0.0) as usize).min(half);
            let lo = lo.max(prev_hi);
            let hi = hi.max(lo);
            prev_hi = hi;
            lo..hi
        })
        .collect()
}

/// Hann window `0.5 * (1 - cos(2πi / (N - 1)))`
pub fn hann_window(size: usize) -> Vec<f32> {
    let denom = size.saturating_sub(1).max(1) as f64;
    (0..size)
        .map(|i| (0.5 * (1.0 - (2.0 * std::f64::consts::PI * i as f64 / denom).cos())) as f32)
        .collect()
}

/// Compute the multi-band spectral flux onset function of a mono signal
///
/// # Arguments
///
/// * `signal` - Mono signal
/// * `config` - Uses `frame_size`, `hop_size` and `band_edges_hz`
///
/// # Returns
///
/// `None` when fewer than two frames fit in the signal, otherwise the raw
/// (unnormalized) onset function with one value per frame. The first frame
/// is compared against an all-zero spectrum.
///
/// # Panics
///
/// Panics if `config.frame_size` is not a power of two; validate the config first.
pub fn compute_onset_function(signal: &AudioSignal, config: &AnalysisConfig) -> Option<OnsetFunction> {
    let frame_size = config.frame_size;
    let hop_size = config.hop_size;
    let num_frames = frame_count(signal.len(), frame_size, hop_size);

    if num_frames < 2 {
        log::warn!(
            "Insufficient audio for onset detection: {} samples yield {} frame(s) (frame={}, hop={})",
            signal.len(),
            num_frames,
            frame_size,
            hop_size
        );
        return None;
    }

    let bands = band_bin_ranges(&config.band_edges_hz, signal.sample_rate, frame_size);
    log::debug!(
        "Computing spectral flux: {} frames, frame={}, hop={}, bands={:?}",
        num_frames,
        frame_size,
        hop_size,
        bands
    );

    let fft = RadixTwoFft::new(frame_size);
    let window = hann_window(frame_size);
    let half = frame_size / 2;

    let mut re = vec![0.0f32; frame_size];
    let mut im = vec![0.0f32; frame_size];
    let mut magnitudes = vec![0.0f32; half];
    let mut prev_magnitudes = vec![0.0f32; half];
    let mut values = Vec::with_capacity(num_frames);

    for frame in 0..num_frames {
        let offset = frame * hop_size;
        let chunk = &signal.samples[offset..offset + frame_size];

        for ((r, &s), &w) in re.iter_mut().zip(chunk).zip(&window) {
            *r = s * w;
        }
        im.fill(0.0);

        fft.process(&mut re, &mut im);

        for (k, mag) in magnitudes.iter_mut().enumerate() {
            *mag = (re[k] * re[k] + im[k] * im[k]).sqrt();
        }

        let strength: f32 = bands
            .iter()
            .map(|band| band_flux(&magnitudes[band.clone()], &prev_magnitudes[band.clone()]))
            .sum();
        values.push(strength);

        std::mem::swap(&mut magnitudes, &mut prev_magnitudes);
    }

    Some(OnsetFunction {
        values,
        hop_size,
        sample_rate: signal.sample_rate,
    })
}

/// Half-wave rectified magnitude increase summed over one band
fn band_flux(current: &[f32], previous: &[f32]) -> f32 {
    current
        .iter()
        .zip(previous)
        .map(|(cur, prev)| (cur - prev).max(0.0))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signal(samples: Vec<f32>) -> AudioSignal {
        AudioSignal {
            sample_rate: 44100,
            samples,
        }
    }

    #[test]
    fn test_frame_count() {
        assert_eq!(frame_count(44100, 2048, 512), 82);
        assert_eq!(frame_count(2048, 2048, 512), 0);
        assert_eq!(frame_count(1000, 2048, 512), 0);
        assert_eq!(frame_count(2048 + 1024, 2048, 512), 2);
    }

    #[test]
    fn test_band_bin_ranges_default() {
        let config = AnalysisConfig::default();
        let bands = band_bin_ranges(&config.band_edges_hz, 44100, 2048);

        // bin width = 21.533 Hz
        assert_eq!(bands.len(), 6);
        assert_eq!(bands[0], 0..10);
        assert_eq!(bands[1], 10..19);
        assert_eq!(bands[5].end, 1024);

        // Contiguous, non-overlapping, covering every bin
        for pair in bands.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
    }

    #[test]
    fn test_band_bin_ranges_clamped_below_nyquist() {
        // 6 kHz: Nyquist (3 kHz) sits below the 3.2 kHz edge
        let config = AnalysisConfig::default();
        let bands = band_bin_ranges(&config.band_edges_hz, 6000, 2048);
        assert!(bands.iter().all(|b| b.end <= 1024 && b.start <= b.end));
        assert!(bands[5].is_empty());
    }

    #[test]
    fn test_hann_window_shape() {
        let window = hann_window(2048);
        assert_eq!(window.len(), 2048);
        assert!(window[0].abs() < 1e-7);
        assert!(window[2047].abs() < 1e-6);
        assert!(window.iter().all(|&w| (0.0..=1.0).contains(&w)));
    }

    #[test]
    fn test_insufficient_audio() {
        let config = AnalysisConfig::default();
        assert!(compute_onset_function(&signal(vec![0.1; 2048 + 512]), &config).is_none());
        assert!(compute_onset_function(&signal(vec![]), &config).is_none());
    }

    #[test]
    fn test_silence_gives_zero_flux() {
        let config = AnalysisConfig::default();
        let odf = compute_onset_function(&signal(vec![0.0; 44100]), &config).unwrap();
        assert_eq!(odf.len(), frame_count(44100, 2048, 512));
        assert!(odf.values.iter().all(|&v| v == 0.0));
        assert_eq!(odf.hop_size, 512);
    }

    #[test]
    fn test_click_produces_flux_peak() {
        let config = AnalysisConfig::default();
        let mut samples = vec![0.0f32; 44100];
        // Short 1 kHz burst centred in frame 40's window
        let start = 40 * 512 + 1024;
        for i in 0..256 {
            let t = i as f32 / 44100.0;
            samples[start + i] = (2.0 * std::f32::consts::PI * 1000.0 * t).sin() * (-(i as f32) / 64.0).exp();
        }

        let odf = compute_onset_function(&signal(samples), &config).unwrap();
        let (peak_frame, _) = odf
            .values
            .iter()
            .enumerate()
            .fold((0, 0.0f32), |best, (i, &v)| if v > best.1 { (i, v) } else { best });

        assert!(
            (38..=41).contains(&peak_frame),
            "peak expected near frame 40, got {}",
            peak_frame
        );
        assert!(odf.values.iter().all(|&v| v >= 0.0));
        assert!(odf.values[..30].iter().all(|&v| v == 0.0));
    }
}
