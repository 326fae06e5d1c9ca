//! AM envelope demodulation
//!
//! APT pixels are transmitted as the amplitude of a 2400 Hz
//! subcarrier. The [`Demodulator`] recovers that amplitude in
//! three steps:
//!
//! 1. **Envelope**: the magnitude of the analytic signal. The
//!    analytic signal is obtained with an FFT-based Hilbert
//!    transform over the entire input.
//!
//! 2. **Median filter**: a length-5 median filter suppresses
//!    impulsive noise. Unlike a linear low-pass filter, it keeps
//!    the rectangular edges of the sync pulses sharp.
//!
//! 3. **Decimation**: the canonical rate is exactly five samples
//!    per pixel, so the middle sample of every group of five is
//!    kept.
//!
//! ```txt
//! samples ──▶ |hilbert| ──▶ median(5) ──▶ ↓5 ──▶ one value per pixel
//! ```

use std::sync::Arc;

use arraydeque::ArrayDeque;
use arrayvec::ArrayVec;
use nalgebra::DVector;
use num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use crate::waveform::{DECIMATION, DECIMATION_OFFSET};

/// Median filter length
pub const MEDIAN_LEN: usize = 5;

/// AM envelope demodulator
///
/// Converts real audio samples at the canonical rate into one
/// envelope value per APT pixel. Each demodulator owns an FFT
/// planner, so calling [`demodulate()`](#method.demodulate) again
/// on the same demodulator with an equal-length input reuses
/// its plans. [`AptDecoder`](crate::AptDecoder) does not keep a
/// demodulator between calls.
pub struct Demodulator {
    planner: FftPlanner<f32>,
}

impl Demodulator {
    /// New demodulator
    pub fn new() -> Self {
        Self {
            planner: FftPlanner::new(),
        }
    }

    /// Demodulate to one envelope value per pixel
    ///
    /// Runs envelope detection, median filtering, and
    /// decimation on `samples`. The output has
    /// `samples.len() / DECIMATION` values.
    pub fn demodulate(&mut self, samples: &[f32]) -> Vec<f32> {
        let envelope = analytic_envelope(&mut self.planner, samples);
        let filtered = median_filter(envelope.as_slice());
        decimate(filtered.as_slice())
    }
}

impl std::default::Default for Demodulator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Demodulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Demodulator").finish_non_exhaustive()
    }
}

/// Magnitude of the analytic signal
///
/// Computes the Hilbert-transform envelope of the real signal
/// `samples`. The spectrum of the input is computed in one
/// FFT; negative frequencies are zeroed and positive
/// frequencies doubled. DC and (for even lengths) the Nyquist
/// bin are kept as-is. The inverse FFT is the analytic signal,
/// and its magnitude is the envelope.
///
/// The output has the same length as the input and is never
/// negative.
pub fn analytic_envelope(planner: &mut FftPlanner<f32>, samples: &[f32]) -> DVector<f32> {
    let len = samples.len();
    if len == 0 {
        return DVector::zeros(0);
    }

    let forward: Arc<dyn Fft<f32>> = planner.plan_fft_forward(len);
    let inverse: Arc<dyn Fft<f32>> = planner.plan_fft_inverse(len);

    let mut buffer: Vec<Complex<f32>> = samples.iter().map(|&sa| Complex::new(sa, 0.0)).collect();
    let mut scratch = vec![
        Complex::default();
        usize::max(
            forward.get_inplace_scratch_len(),
            inverse.get_inplace_scratch_len()
        )
    ];

    forward.process_with_scratch(&mut buffer, &mut scratch);
    apply_hilbert_weights(&mut buffer);
    inverse.process_with_scratch(&mut buffer, &mut scratch);

    // rustfft does not normalize
    let norm = 1.0f32 / len as f32;
    DVector::from_iterator(len, buffer.iter().map(|c| c.norm() * norm))
}

// Weight a spectrum so that its inverse is the analytic signal
//
// ```txt
//   h[0]           = 1
//   h[1 .. N/2]    = 2
//   h[N/2]         = 1     (even N only)
//   h[N/2+1 .. N]  = 0
// ```
fn apply_hilbert_weights(spectrum: &mut [Complex<f32>]) {
    let len = spectrum.len();
    let positive_end = (len + 1) / 2;
    for bin in &mut spectrum[1..positive_end] {
        *bin *= 2.0f32;
    }

    let negative_start = len / 2 + 1;
    for bin in &mut spectrum[negative_start..] {
        *bin = Complex::default();
    }
}

/// Median filter of length [`MEDIAN_LEN`]
///
/// Each output sample is the median of the input samples
/// centered on it. Like the classic `medfilt`, the input is
/// treated as zero outside of its range, so the first and last
/// two outputs see zeros.
pub fn median_filter(input: &[f32]) -> DVector<f32> {
    const HALF: usize = MEDIAN_LEN / 2;

    let mut window: ArrayDeque<f32, MEDIAN_LEN, arraydeque::Wrapping> = ArrayDeque::new();
    for _i in 0..HALF {
        window.push_back(0.0f32);
    }

    let mut out = DVector::zeros(input.len());
    let lookahead = input
        .iter()
        .copied()
        .chain(std::iter::repeat(0.0f32).take(HALF));
    for (i, sa) in lookahead.enumerate() {
        window.push_back(sa);
        if i >= HALF {
            out[i - HALF] = window_median(&window);
        }
    }
    out
}

// Median of a full window
fn window_median(window: &ArrayDeque<f32, MEDIAN_LEN, arraydeque::Wrapping>) -> f32 {
    let mut sorted: ArrayVec<f32, MEDIAN_LEN> = window.iter().copied().collect();
    sorted.sort_unstable_by(f32::total_cmp);
    sorted[sorted.len() / 2]
}

/// Keep one sample per pixel
///
/// Splits `input` into groups of [`DECIMATION`] samples and
/// keeps sample [`DECIMATION_OFFSET`] of each. A trailing
/// partial group is discarded.
pub fn decimate(input: &[f32]) -> Vec<f32> {
    input
        .chunks_exact(DECIMATION)
        .map(|group| group[DECIMATION_OFFSET])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use assert_approx_eq::assert_approx_eq;

    use crate::waveform::{modulate_am, CANONICAL_RATE};

    #[test]
    fn test_envelope_empty() {
        let out = analytic_envelope(&mut FftPlanner::new(), &[]);
        assert_eq!(0, out.len());
    }

    #[test]
    fn test_envelope_cosine() {
        // a pure tone has a flat envelope equal to its amplitude
        const AMPLITUDE: f32 = 3.0;
        let input: Vec<f32> = (0..CANONICAL_RATE as usize)
            .map(|n| {
                AMPLITUDE
                    * (2.0 * std::f32::consts::PI * 2400.0 * n as f32 / CANONICAL_RATE as f32)
                        .cos()
            })
            .collect();

        let out = analytic_envelope(&mut FftPlanner::new(), &input);
        assert_eq!(input.len(), out.len());
        for &sa in out.iter().skip(100).take(input.len() - 200) {
            assert_approx_eq!(sa, AMPLITUDE, 1.0e-2);
        }
    }

    #[test]
    fn test_envelope_constant() {
        // DC passes through unchanged
        let input = vec![5.0f32; 1000];
        let out = analytic_envelope(&mut FftPlanner::new(), &input);
        for &sa in out.iter() {
            assert_approx_eq!(sa, 5.0f32, 1.0e-3);
        }
    }

    #[test]
    fn test_envelope_odd_length() {
        let input: Vec<f32> = (0..999)
            .map(|n| (2.0 * std::f32::consts::PI * 111.0 * n as f32 / 999.0).sin())
            .collect();
        let out = analytic_envelope(&mut FftPlanner::new(), &input);
        for &sa in out.iter() {
            assert_approx_eq!(sa, 1.0f32, 1.0e-3);
        }
    }

    #[test]
    fn test_hilbert_weights() {
        let mut even = vec![Complex::new(1.0f32, 0.0); 6];
        apply_hilbert_weights(&mut even);
        let even: Vec<f32> = even.iter().map(|c| c.re).collect();
        assert_eq!(vec![1.0, 2.0, 2.0, 1.0, 0.0, 0.0], even);

        let mut odd = vec![Complex::new(1.0f32, 0.0); 5];
        apply_hilbert_weights(&mut odd);
        let odd: Vec<f32> = odd.iter().map(|c| c.re).collect();
        assert_eq!(vec![1.0, 2.0, 2.0, 0.0, 0.0], odd);
    }

    #[test]
    fn test_median_filter() {
        const INPUT: &[f32] = &[1.0, 9.0, 2.0, 3.0, 100.0, 4.0, 5.0];
        const EXPECT: &[f32] = &[1.0, 2.0, 3.0, 4.0, 4.0, 4.0, 4.0];

        let out = median_filter(INPUT);
        assert_eq!(EXPECT, out.as_slice());
    }

    #[test]
    fn test_median_filter_edges() {
        // zero padding pulls the ends down
        let out = median_filter(&[7.0f32; 3]);
        assert_eq!(&[7.0, 7.0, 7.0], out.as_slice());

        let out = median_filter(&[7.0f32, 7.0]);
        assert_eq!(&[0.0, 0.0], out.as_slice());

        assert_eq!(0, median_filter(&[]).len());
    }

    #[test]
    fn test_median_keeps_edges() {
        // a step survives intact, a one-sample spike does not
        let mut input = vec![0.0f32; 10];
        input.extend(std::iter::repeat(10.0f32).take(10));
        input[4] = 50.0;

        let out = median_filter(&input);
        assert_eq!(0.0, out[4]);
        assert_eq!(0.0, out[9]);
        assert_eq!(10.0, out[10]);
        assert_eq!(10.0, out[17]);
    }

    #[test]
    fn test_decimate() {
        let input: Vec<f32> = (0..12).map(|i| i as f32).collect();
        assert_eq!(vec![2.0, 7.0], decimate(&input));
        assert!(decimate(&input[0..4]).is_empty());
    }

    #[test]
    fn test_demodulate_repeat() {
        let pixels: Vec<u8> = (0..2080).map(|i| (i % 200) as u8).collect();
        let audio = modulate_am(&pixels, 500.0);

        let mut demod = Demodulator::default();
        let first = demod.demodulate(&audio);
        let second = demod.demodulate(&audio);
        assert_eq!(first, second);
        assert_eq!(first, Demodulator::new().demodulate(&audio));
    }

    #[test]
    fn test_demodulate_pixels() {
        // a slow brightness ramp comes back as a ramp
        let pixels: Vec<u8> = (0..4160).map(|i| (i / 40) as u8 + 20).collect();
        let audio = modulate_am(&pixels, 1000.0);

        let mut demod = Demodulator::new();
        let out = demod.demodulate(&audio);
        assert_eq!(pixels.len(), out.len());

        for (i, (&px, &env)) in pixels.iter().zip(out.iter()).enumerate().skip(50) {
            if i > pixels.len() - 50 {
                break;
            }
            assert_approx_eq!(env, 1000.0 * px as f32 / 255.0, 5.0);
        }
    }
}
