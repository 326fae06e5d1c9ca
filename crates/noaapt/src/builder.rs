use crate::assemble::TrailingLine;
use crate::decoder::AptDecoder;
use crate::digitize::Digitizer;
use crate::waveform::MIN_DISTANCE;

/// Builds an APT image decoder
///
/// The builder comes with a sensible set of default options,
/// and most recordings decode well without changing any of
/// them. Unlike the input to many audio decoders, the sampling
/// rate is *not* a decoder option: all audio must arrive at
/// [`CANONICAL_RATE`](crate::CANONICAL_RATE).
///
/// ```
/// use noaapt::{AptDecoderBuilder, TrailingLine};
///
/// let decoder = AptDecoderBuilder::new()
///     .with_percentiles(1.0, 99.0)        // contrast stretch
///     .with_min_distance(2000)            // pixels between line starts
///     .with_trailing_line(TrailingLine::Drop)
///     .build();
/// assert_eq!(decoder.min_distance(), 2000);
/// ```
///
/// The API specified by the builder is part of this crate's
/// API. The actual default values are *not*, however, and
/// are subject to revision in any minor release. If you
/// care very strongly about a setting, be sure to configure
/// it here.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct AptDecoderBuilder {
    low_percentile: f32,
    high_percentile: f32,
    min_distance: usize,
    trailing_line: TrailingLine,
}

impl AptDecoderBuilder {
    /// New decoder with "sensible" defaults
    pub fn new() -> Self {
        Self {
            low_percentile: Digitizer::LOW_PERCENTILE,
            high_percentile: Digitizer::HIGH_PERCENTILE,
            min_distance: MIN_DISTANCE,
            trailing_line: TrailingLine::default(),
        }
    }

    /// Build a decoder
    pub fn build(&self) -> AptDecoder {
        AptDecoder::from(self)
    }

    /// Contrast stretch percentiles
    ///
    /// The envelope amplitude at the `low` percentile becomes
    /// black, and the amplitude at the `high` percentile becomes
    /// white. Values beyond them are clipped. Percentiles range
    /// from `0.0` to `100.0`; using `0.0` and `100.0` stretches
    /// between the minimum and maximum, which is very sensitive
    /// to noise spikes.
    ///
    /// `high` is raised to `low` if it is smaller. A NaN
    /// percentile is replaced with its default.
    pub fn with_percentiles(&mut self, low: f32, high: f32) -> &mut Self {
        let (low, high) = Digitizer::sanitize_percentiles(low, high);
        self.low_percentile = low;
        self.high_percentile = high;
        self
    }

    /// Minimum distance between line starts (pixels)
    ///
    /// Once a sync word has been found, the detector keeps
    /// looking for a *better* one until it is more than
    /// `min_distance` pixels past it. Only then can the next
    /// line begin.
    ///
    /// This value must be shorter than a line
    /// ([`LINE_LENGTH`](crate::LINE_LENGTH) pixels) by at least
    /// the expected drift, or lines will be skipped. If it is
    /// too short, picture content may be mistaken for sync. It
    /// is clamped to `LINE_LENGTH - 1`.
    pub fn with_min_distance(&mut self, min_distance: usize) -> &mut Self {
        self.min_distance = usize::min(min_distance, crate::LINE_LENGTH - 1);
        self
    }

    /// Incomplete trailing line policy
    ///
    /// Controls what happens when the last scan line runs past
    /// the end of the recording.
    pub fn with_trailing_line(&mut self, policy: TrailingLine) -> &mut Self {
        self.trailing_line = policy;
        self
    }

    /// Contrast stretch percentiles
    ///
    /// Returns tuple of (`low`, `high`) percentiles.
    pub fn percentiles(&self) -> (f32, f32) {
        (self.low_percentile, self.high_percentile)
    }

    /// Minimum distance between line starts (pixels)
    pub fn min_distance(&self) -> usize {
        self.min_distance
    }

    /// Incomplete trailing line policy
    pub fn trailing_line(&self) -> TrailingLine {
        self.trailing_line
    }
}

impl std::default::Default for AptDecoderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let builder = AptDecoderBuilder::default();
        assert_eq!((0.5, 99.5), builder.percentiles());
        assert_eq!(2000, builder.min_distance());
        assert_eq!(TrailingLine::Pad, builder.trailing_line());
    }

    #[test]
    fn test_clamping() {
        let mut builder = AptDecoderBuilder::new();
        builder
            .with_percentiles(-1.0, 101.0)
            .with_min_distance(1_000_000);
        assert_eq!((0.0, 100.0), builder.percentiles());
        assert_eq!(2079, builder.min_distance());

        builder.with_percentiles(10.0, 5.0);
        assert_eq!((10.0, 10.0), builder.percentiles());
    }

    #[test]
    fn test_nan_percentiles() {
        let mut builder = AptDecoderBuilder::new();
        builder.with_percentiles(f32::NAN, 99.5);
        assert_eq!((0.5, 99.5), builder.percentiles());

        builder.with_percentiles(2.0, f32::NAN);
        assert_eq!((2.0, 99.5), builder.percentiles());
        assert_eq!((2.0, 99.5), builder.build().percentiles());
    }
}
