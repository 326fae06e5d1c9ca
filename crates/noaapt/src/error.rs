//! Decoding errors

use thiserror::Error;

/// Error decoding an APT image
///
/// All of these are conditions of the input. None of them are
/// worth retrying: decoding is deterministic.
///
/// Two other conditions are *not* errors:
///
/// * If no scan lines can be found, the decoder returns an
///   empty [`AptImage`](crate::AptImage).
///
/// * If the last scan line runs past the end of the signal,
///   it is padded or dropped according to the
///   [`TrailingLine`](crate::TrailingLine) policy.
#[derive(Error, Clone, Debug, PartialEq)]
pub enum DecodeError {
    /// Audio is not at the canonical sampling rate
    ///
    /// The caller must resample to
    /// [`CANONICAL_RATE`](crate::CANONICAL_RATE) first.
    #[error("unsupported sampling rate {rate} Hz: must be resampled to {expected} Hz")]
    UnsupportedSampleRate {
        /// Rate of the given audio
        rate: u32,
        /// Rate the decoder requires
        expected: u32,
    },

    /// Too few samples to demodulate
    #[error("signal too short: {len} samples given, at least {min} required")]
    TooShort {
        /// Number of samples given
        len: usize,
        /// Minimum number of samples
        min: usize,
    },

    /// The signal has no usable dynamic range
    ///
    /// The low and high percentiles of the envelope are equal,
    /// or so nearly equal that any contrast stretch would only
    /// amplify rounding noise. This happens for silent or
    /// constant input.
    #[error("degenerate signal: envelope percentiles {low} and {high} have no usable span")]
    DegenerateSignal {
        /// Low percentile of the envelope
        low: f32,
        /// High percentile of the envelope
        high: f32,
    },
}
