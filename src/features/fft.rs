//! Radix-2 decimation-in-time FFT
//!
//! In-place forward transform over split real/imaginary buffers. The length
//! is fixed at construction so the twiddle table is computed once and shared
//! by every frame of an analysis run.

use std::f64::consts::PI;

/// Forward FFT of a fixed power-of-two length
#[derive(Debug, Clone)]
pub struct RadixTwoFft {
    len: usize,
    // exp(-2πi·k/len) for k in 0..len/2
    twiddle_re: Vec<f32>,
    twiddle_im: Vec<f32>,
}

impl RadixTwoFft {
    /// Plan a transform of length `len`
    ///
    /// # Panics
    ///
    /// Panics if `len` is not a power of two.
    pub fn new(len: usize) -> Self {
        assert!(
            len.is_power_of_two(),
            "FFT length must be a power of two, got {}",
            len
        );

        let half = len / 2;
        let (twiddle_re, twiddle_im) = (0..half)
            .map(|k| {
                let angle = -2.0 * PI * k as f64 / len as f64;
                (angle.cos() as f32, angle.sin() as f32)
            })
            .unzip();

        Self {
            len,
            twiddle_re,
            twiddle_im,
        }
    }

    /// Transform length
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false; a plan has length >= 1
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Unscaled forward DFT of `(re, im)`, in place
    ///
    /// # Panics
    ///
    /// Panics if either buffer length differs from the planned length.
    pub fn process(&self, re: &mut [f32], im: &mut [f32]) {
        let n = self.len;
        assert_eq!(re.len(), n, "real buffer length must match FFT length");
        assert_eq!(im.len(), n, "imaginary buffer length must match FFT length");

        // Bit-reversal permutation
        let mut j = 0usize;
        for i in 1..n {
            let mut bit = n >> 1;
            while j & bit != 0 {
                j ^= bit;
                bit >>= 1;
            }
            j ^= bit;
            if i < j {
                re.swap(i, j);
                im.swap(i, j);
            }
        }

        // Butterflies
        let mut size = 2;
        while size <= n {
            let half = size / 2;
            let stride = n / size;
            for start in (0..n).step_by(size) {
                for k in 0..half {
                    let w_re = self.twiddle_re[k * stride];
                    let w_im = self.twiddle_im[k * stride];
                    let a = start + k;
                    let b = a + half;
                    let t_re = w_re * re[b] - w_im * im[b];
                    let t_im = w_re * im[b] + w_im * re[b];
                    re[b] = re[a] - t_re;
                    im[b] = im[a] - t_im;
                    re[a] += t_re;
                    im[a] += t_im;
                }
            }
            size *= 2;
        }
    }
}

/// One-shot forward FFT of `(re, im)` in place
///
/// Plans a new [`RadixTwoFft`] on every call; reuse a plan when transforming
/// many frames.
///
/// # Panics
///
/// Panics if the lengths differ or are not a power of two.
pub fn fft_in_place(re: &mut [f32], im: &mut [f32]) {
    assert_eq!(re.len(), im.len(), "real and imaginary lengths differ");
    RadixTwoFft::new(re.len()).process(re, im);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustfft::num_complex::Complex;
    use rustfft::FftPlanner;

    fn magnitude(re: f32, im: f32) -> f32 {
        (re * re + im * im).sqrt()
    }

    /// Deterministic pseudo-noise in [-1, 1]
    fn test_signal(n: usize) -> Vec<f32> {
        let mut state = 0x2545_f491_u32;
        (0..n)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                (state as f32 / u32::MAX as f32) * 2.0 - 1.0
            })
            .collect()
    }

    #[test]
    fn test_impulse_has_flat_spectrum() {
        let n = 2048;
        let mut re = vec![0.0f32; n];
        let mut im = vec![0.0f32; n];
        re[0] = 1.0;

        fft_in_place(&mut re, &mut im);

        for k in 0..n {
            let mag = magnitude(re[k], im[k]);
            assert!((mag - 1.0).abs() < 1e-6, "bin {} magnitude {}", k, mag);
        }
    }

    #[test]
    fn test_sinusoid_concentrates_in_its_bin() {
        let n = 2048;
        let bin = 37;
        let mut re: Vec<f32> = (0..n)
            .map(|i| (2.0 * std::f32::consts::PI * bin as f32 * i as f32 / n as f32).cos())
            .collect();
        let mut im = vec![0.0f32; n];

        fft_in_place(&mut re, &mut im);

        let expected = n as f32 / 2.0;
        assert!((magnitude(re[bin], im[bin]) - expected).abs() < 0.05);
        assert!((magnitude(re[n - bin], im[n - bin]) - expected).abs() < 0.05);

        for k in (0..n).filter(|&k| k != bin && k != n - bin) {
            let leak = magnitude(re[k], im[k]);
            assert!(leak < 1e-2, "leakage {} at bin {}", leak, k);
        }
    }

    #[test]
    fn test_matches_textbook_dft() {
        let n = 64;
        let input = test_signal(n);

        let mut re = input.clone();
        let mut im = vec![0.0f32; n];
        fft_in_place(&mut re, &mut im);

        for k in 0..n {
            let (mut sum_re, mut sum_im) = (0.0f64, 0.0f64);
            for (t, &x) in input.iter().enumerate() {
                let angle = -2.0 * std::f64::consts::PI * (k * t) as f64 / n as f64;
                sum_re += x as f64 * angle.cos();
                sum_im += x as f64 * angle.sin();
            }
            assert!((re[k] as f64 - sum_re).abs() < 1e-4, "re mismatch at bin {}", k);
            assert!((im[k] as f64 - sum_im).abs() < 1e-4, "im mismatch at bin {}", k);
        }
    }

    #[test]
    fn test_matches_rustfft() {
        let n = 2048;
        let input = test_signal(n);

        let mut reference: Vec<Complex<f32>> =
            input.iter().map(|&x| Complex::new(x, 0.0)).collect();
        FftPlanner::new().plan_fft_forward(n).process(&mut reference);

        let plan = RadixTwoFft::new(n);
        let mut re = input;
        let mut im = vec![0.0f32; n];
        plan.process(&mut re, &mut im);

        for k in 0..n {
            let err = magnitude(re[k] - reference[k].re, im[k] - reference[k].im);
            assert!(err < 1e-3, "bin {} differs by {}", k, err);
        }
    }

    #[test]
    fn test_plan_is_reusable() {
        let plan = RadixTwoFft::new(8);
        assert_eq!(plan.len(), 8);

        for _ in 0..2 {
            let mut re = vec![1.0f32; 8];
            let mut im = vec![0.0f32; 8];
            plan.process(&mut re, &mut im);
            assert!((re[0] - 8.0).abs() < 1e-6);
            assert!(re[1..].iter().all(|v| v.abs() < 1e-5));
        }
    }

    #[test]
    #[should_panic(expected = "power of two")]
    fn test_non_power_of_two_panics() {
        let mut re = vec![0.0f32; 1000];
        let mut im = vec![0.0f32; 1000];
        fft_in_place(&mut re, &mut im);
    }
}
