//! Percentile contrast stretch
//!
//! The [`Digitizer`] maps envelope amplitudes to 8-bit pixel
//! intensities. Rather than scaling between the minimum and
//! maximum of the signal, which a single noise spike can ruin,
//! it scales between two percentiles of the signal's
//! distribution. Anything outside of them clips to black or
//! white.

#[cfg(not(test))]
use log::{debug, warn};

#[cfg(test)]
use std::println as debug;
#[cfg(test)]
use std::println as warn;

use crate::error::DecodeError;

/// Envelope-to-pixel converter
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Digitizer {
    low_percentile: f32,
    high_percentile: f32,
}

impl Digitizer {
    /// Default low percentile
    pub const LOW_PERCENTILE: f32 = 0.5;

    /// Default high percentile
    pub const HIGH_PERCENTILE: f32 = 99.5;

    // Spans smaller than this fraction of the signal magnitude
    // are FFT rounding noise, not picture content.
    const MIN_RELATIVE_SPAN: f32 = 1.0e-3;

    /// New digitizer
    ///
    /// The envelope value at the `low` percentile becomes black
    /// (0), and the value at the `high` percentile becomes white
    /// (255). Percentiles are clamped to `[0.0, 100.0]`, and
    /// `high` is raised to at least `low`. A NaN percentile is
    /// replaced with its default.
    pub fn new(low: f32, high: f32) -> Self {
        let (low_percentile, high_percentile) = Self::sanitize_percentiles(low, high);
        Self {
            low_percentile,
            high_percentile,
        }
    }

    // Clamp percentiles to [0, 100] with low ≤ high
    pub(crate) fn sanitize_percentiles(low: f32, high: f32) -> (f32, f32) {
        let low = if low.is_nan() { Self::LOW_PERCENTILE } else { low };
        let high = if high.is_nan() { Self::HIGH_PERCENTILE } else { high };

        let low = f32::clamp(low, 0.0, 100.0);
        (low, f32::clamp(high, low, 100.0))
    }

    /// Percentiles mapped to black and white
    pub fn percentiles(&self) -> (f32, f32) {
        (self.low_percentile, self.high_percentile)
    }

    /// Digitize envelope
    ///
    /// Returns one pixel intensity per `input` value. Values are
    /// mapped linearly, rounded to the nearest integer (ties to
    /// even), and clipped to `[0, 255]`.
    ///
    /// Fails with [`DecodeError::DegenerateSignal`] if the
    /// percentile range collapses: the input is empty, constant,
    /// not finite, or varies only by rounding noise.
    pub fn digitize(&self, input: &[f32]) -> Result<Vec<u8>, DecodeError> {
        let (low, high) = self.range(input);

        let delta = high - low;
        let magnitude = f32::max(low.abs(), high.abs());
        if !(delta > Self::MIN_RELATIVE_SPAN * magnitude) {
            warn!(
                "digitizer: envelope percentiles {} and {} have no usable span",
                low, high
            );
            return Err(DecodeError::DegenerateSignal { low, high });
        }

        debug!(
            "digitizer: {} values, black at {:.3}, white at {:.3}",
            input.len(),
            low,
            high
        );

        let scale = 255.0f32 / delta;
        Ok(input
            .iter()
            .map(|&sa| f32::clamp((scale * (sa - low)).round_ties_even(), 0.0, 255.0) as u8)
            .collect())
    }

    /// Envelope values for black and white
    ///
    /// Computes the configured low and high percentiles of
    /// `input`. Returns `(NaN, NaN)` if `input` is empty.
    pub fn range(&self, input: &[f32]) -> (f32, f32) {
        let mut sorted = input.to_vec();
        sorted.sort_unstable_by(f32::total_cmp);
        (
            percentile(&sorted, self.low_percentile),
            percentile(&sorted, self.high_percentile),
        )
    }
}

impl std::default::Default for Digitizer {
    fn default() -> Self {
        Self::new(Self::LOW_PERCENTILE, Self::HIGH_PERCENTILE)
    }
}

/// Percentile of sorted data
///
/// Computes the `p`th percentile, `0 ≤ p ≤ 100`, of `sorted`,
/// which must be sorted in ascending order. Percentiles which
/// fall between two samples are linearly interpolated: the
/// rank of `p` is `p / 100 * (n - 1)`.
///
/// Returns NaN if `sorted` is empty.
pub fn percentile(sorted: &[f32], p: f32) -> f32 {
    if sorted.is_empty() {
        return f32::NAN;
    }

    // rank in f64: long recordings have millions of samples
    let rank = f64::clamp(p as f64, 0.0, 100.0) / 100.0 * (sorted.len() - 1) as f64;
    let below = usize::min(rank.floor() as usize, sorted.len() - 1);
    let above = usize::min(below + 1, sorted.len() - 1);
    let frac = (rank - below as f64) as f32;
    sorted[below] + frac * (sorted[above] - sorted[below])
}
