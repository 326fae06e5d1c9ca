//! Resampling and truncation
//!
//! The decoder only accepts audio at
//! [`CANONICAL_RATE`](noaapt::CANONICAL_RATE). Recordings at other
//! rates are resampled in the frequency domain: the whole signal
//! is transformed, its spectrum is truncated or zero-padded to the
//! new length, and it is transformed back. This treats the signal
//! as periodic, which is fine for a recording of many seconds.

use log::{debug, info};
use num_complex::Complex;
use rustfft::FftPlanner;

/// Resample `samples` from rate `from` to rate `to`
///
/// The output has `floor(len · to / from)` samples. If the rates
/// are equal, the input is returned unchanged.
///
/// When the shorter of the two spectra has an even length, its
/// Nyquist bin is split in half when upsampling and folded
/// together when downsampling.
pub fn resample(samples: Vec<f32>, from: u32, to: u32) -> Vec<f32> {
    if from == to || samples.is_empty() || from == 0 {
        return samples;
    }

    let n_in = samples.len();
    let n_out = ((n_in as u64 * to as u64) / from as u64) as usize;
    if n_out == 0 {
        return Vec::new();
    }

    info!(
        "resample: {} Hz → {} Hz ({} → {} samples)",
        from, to, n_in, n_out
    );

    let mut planner = FftPlanner::<f32>::new();
    let mut spectrum: Vec<Complex<f32>> = samples.into_iter().map(Complex::from).collect();
    planner.plan_fft_forward(n_in).process(&mut spectrum);

    let mut out = resize_spectrum(&spectrum, n_out);
    planner.plan_fft_inverse(n_out).process(&mut out);

    let norm = 1.0f32 / n_in as f32;
    let out: Vec<f32> = out.into_iter().map(|c| c.re * norm).collect();
    debug!("resample: done");
    out
}

/// Truncate `samples` to whole seconds at `rate`
///
/// Returns the number of samples removed.
pub fn truncate_seconds(samples: &mut Vec<f32>, rate: u32) -> usize {
    let rate = rate as usize;
    if rate == 0 {
        return 0;
    }

    let keep = (samples.len() / rate) * rate;
    let removed = samples.len() - keep;
    samples.truncate(keep);
    debug!(
        "resample: truncated to {} s ({} samples removed)",
        keep / rate,
        removed
    );
    removed
}

// Copy the spectrum `input` into a spectrum of length `n_out`
//
// Positive frequencies stay at the front, negative frequencies
// stay at the back.
fn resize_spectrum(input: &[Complex<f32>], n_out: usize) -> Vec<Complex<f32>> {
    let n_in = input.len();
    let n = usize::min(n_in, n_out);
    let nyq = n / 2 + 1;

    let mut out = vec![Complex::new(0.0f32, 0.0f32); n_out];
    out[0..nyq].copy_from_slice(&input[0..nyq]);
    for j in 1..=(n - nyq) {
        out[n_out - j] = input[n_in - j];
    }

    if n % 2 == 0 {
        let half = n / 2;
        if n_out < n_in {
            out[half] = input[half] + input[n_in - half];
        } else if n_out > n_in {
            out[half] = input[half] * 0.5;
            out[n_out - half] = input[half] * 0.5;
        }
    }
    out
}
