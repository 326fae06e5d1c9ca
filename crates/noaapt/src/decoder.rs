//! Full decoder chain

#[cfg(not(test))]
use log::{debug, info, warn};

#[cfg(test)]
use std::println as debug;
#[cfg(test)]
use std::println as info;
#[cfg(test)]
use std::println as warn;

use std::convert::From;

use crate::assemble::{assemble, AptImage, TrailingLine};
use crate::builder::AptDecoderBuilder;
use crate::demod::{Demodulator, MEDIAN_LEN};
use crate::digitize::Digitizer;
use crate::error::DecodeError;
use crate::sync::SyncDetector;
use crate::waveform::{CANONICAL_RATE, DECIMATION, SYNC_A};

/// A complete NOAA APT decoder chain
///
/// The decoder takes `f32` audio samples at the
/// [canonical rate](crate::CANONICAL_RATE) and performs the
/// following operations:
///
/// 1. AM envelope demodulation with a median filter, and
///    decimation to one value per pixel
/// 2. Percentile contrast stretch to 8-bit pixels
/// 3. Sync word correlation to find the start of each line
/// 4. Line assembly into a rectangular image
///
/// To create the decoder, first create its Builder:
///
/// ```
/// use noaapt::AptDecoderBuilder;
///
/// let decoder = AptDecoderBuilder::default().build();
/// assert_eq!(decoder.min_distance(), 2000);
/// ```
///
/// The decoder holds no state between calls. Each call to
/// [`decode()`](#method.decode) processes one complete
/// recording.
#[derive(Clone, Debug, PartialEq)]
pub struct AptDecoder {
    digitizer: Digitizer,
    sync: SyncDetector,
    trailing_line: TrailingLine,
}

impl AptDecoder {
    /// Minimum number of input samples
    pub const MIN_SAMPLES: usize = if DECIMATION > MEDIAN_LEN {
        DECIMATION
    } else {
        MEDIAN_LEN
    };

    /// Decode an APT recording
    ///
    /// `samples` must be mono audio at `rate`, which must equal
    /// [`CANONICAL_RATE`](crate::CANONICAL_RATE). Resample your
    /// audio first if needed. There is no need to scale the
    /// samples; the contrast stretch takes care of that.
    ///
    /// If no scan lines are found, the returned image is
    /// [empty](AptImage::is_empty). This is not an error.
    pub fn decode(&self, samples: &[f32], rate: u32) -> Result<AptImage, DecodeError> {
        if rate != CANONICAL_RATE {
            return Err(DecodeError::UnsupportedSampleRate {
                rate,
                expected: CANONICAL_RATE,
            });
        }

        if samples.len() < Self::MIN_SAMPLES {
            return Err(DecodeError::TooShort {
                len: samples.len(),
                min: Self::MIN_SAMPLES,
            });
        }

        info!(
            "decoder: {} samples ({:.1} s) at {} Hz",
            samples.len(),
            samples.len() as f32 / rate as f32,
            rate
        );

        let envelope = Demodulator::new().demodulate(samples);
        debug!("decoder: demodulated {} pixels", envelope.len());

        let digitized = self.digitizer.digitize(&envelope)?;
        Ok(self.decode_digitized(&digitized))
    }

    /// Decode a digitized APT signal
    ///
    /// `signal` must contain one 8-bit intensity per pixel,
    /// such as the output of a previous run of the digitizer.
    /// Only synchronization and line assembly are performed.
    pub fn decode_digitized(&self, signal: &[u8]) -> AptImage {
        let peaks = self.sync.find_peaks(signal);
        let image = assemble(signal, &peaks, self.trailing_line);

        if image.is_empty() && image.dropped_rows() == 0 {
            warn!(
                "decoder: no sync detected in {} pixels; no lines decoded",
                signal.len()
            );
        } else {
            info!(
                "decoder: {} lines decoded ({} padded pixels, {} dropped lines)",
                image.rows(),
                image.padded_samples(),
                image.dropped_rows()
            );
        }
        image
    }

    /// Contrast stretch percentiles
    pub fn percentiles(&self) -> (f32, f32) {
        self.digitizer.percentiles()
    }

    /// Minimum distance between line starts (pixels)
    pub fn min_distance(&self) -> usize {
        self.sync.min_distance()
    }

    /// Incomplete trailing line policy
    pub fn trailing_line(&self) -> TrailingLine {
        self.trailing_line
    }
}

impl From<&AptDecoderBuilder> for AptDecoder {
    /// Create the decoder from its Builder
    fn from(cfg: &AptDecoderBuilder) -> Self {
        let (low, high) = cfg.percentiles();
        Self {
            digitizer: Digitizer::new(low, high),
            sync: SyncDetector::new(&SYNC_A, cfg.min_distance()),
            trailing_line: cfg.trailing_line(),
        }
    }
}

impl std::default::Default for AptDecoder {
    fn default() -> Self {
        AptDecoderBuilder::default().build()
    }
}

/// Decode an APT recording with default settings
///
/// Shorthand for
/// `AptDecoderBuilder::default().build().decode(samples, rate)`.
/// See [`AptDecoder::decode()`].
pub fn decode(samples: &[f32], rate: u32) -> Result<AptImage, DecodeError> {
    AptDecoder::default().decode(samples, rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::waveform::{make_lines, modulate_am, LINE_LENGTH, SYNC_A_LEN};

    // Check that a row looks like the start of a line
    //
    // AM demodulation smears the sync pulses a little, so only
    // require the white pulse tops to clearly exceed the black
    // pulse bottoms.
    fn assert_starts_with_sync(row: &[u8]) {
        let black: u32 = (0..28).step_by(4).map(|i| row[i] as u32).sum();
        let white: u32 = (2..28).step_by(4).map(|i| row[i] as u32).sum();
        assert!(white > black + 7 * 100, "{:?}", &row[0..SYNC_A_LEN]);
    }

    #[test]
    fn test_decode_synthetic() {
        // three seconds of audio
        let pixels = make_lines(6, 0);
        let audio = modulate_am(&pixels, 8000.0);
        assert_eq!(3 * CANONICAL_RATE as usize, audio.len());

        let img = decode(&audio, CANONICAL_RATE).expect("decode");

        // the scan opens one more peak in the last line period,
        // which bounds the sixth row
        assert_eq!(6, img.rows());
        assert_eq!(LINE_LENGTH, img.width());
        assert_eq!(6 * LINE_LENGTH, img.as_raw().len());
        assert!(img.padded_samples() <= 2);

        for (i, &start) in img.line_starts().iter().enumerate() {
            assert!(
                (start as isize - (i * LINE_LENGTH) as isize).abs() <= 2,
                "line {} starts at {}",
                i,
                start
            );
        }
        for row in img.iter_rows() {
            assert_starts_with_sync(row);
        }
    }

    #[test]
    fn test_decode_digitized() {
        let mut pixels = make_lines(4, 30);
        pixels.truncate(pixels.len() - 500);

        let img = AptDecoder::default().decode_digitized(&pixels);
        assert_eq!(3, img.rows());
        assert_eq!(&[0, 2050, 4100], img.line_starts());
        assert_eq!(Some(&pixels[2050..2050 + LINE_LENGTH]), img.row(1));
        for row in img.iter_rows() {
            assert_eq!(&SYNC_A, &row[0..SYNC_A_LEN]);
        }
    }

    #[test]
    fn test_decode_trailing_line() {
        // the third peak opens in the picture, just before the end
        let pixels = make_lines(3, 0);
        let pixels = &pixels[0..2 * LINE_LENGTH - 10];

        let img = AptDecoder::default().decode_digitized(pixels);
        assert_eq!(2, img.rows());
        assert_eq!(10, img.padded_samples());
        let last = img.row(1).expect("row");
        assert_eq!(&pixels[LINE_LENGTH..], &last[..LINE_LENGTH - 10]);
        assert!(last[LINE_LENGTH - 10..].iter().all(|&px| px == 0));

        let img = AptDecoderBuilder::new()
            .with_trailing_line(TrailingLine::Drop)
            .build()
            .decode_digitized(pixels);
        assert_eq!(1, img.rows());
        assert_eq!(1, img.dropped_rows());
    }

    #[test]
    fn test_decode_silent() {
        let audio = vec![0.0f32; 2 * LINE_LENGTH * DECIMATION];
        match decode(&audio, CANONICAL_RATE) {
            Err(DecodeError::DegenerateSignal { .. }) => {}
            other => panic!("unexpected {:?}", other),
        }

        let audio = vec![1000.0f32; 2 * LINE_LENGTH * DECIMATION];
        assert!(matches!(
            decode(&audio, CANONICAL_RATE),
            Err(DecodeError::DegenerateSignal { .. })
        ));
    }

    #[test]
    fn test_decode_one_pulse() {
        // a single sync word bounds no rows
        let mut pixels = vec![100u8; LINE_LENGTH];
        pixels[300..300 + SYNC_A_LEN].copy_from_slice(&SYNC_A);
        let audio = modulate_am(&pixels, 100.0);

        let img = decode(&audio, CANONICAL_RATE).expect("decode");
        assert!(img.is_empty());
        assert_eq!(0, img.rows());
        assert_eq!(None, img.row(0));
    }

    #[test]
    fn test_decode_rejects_input() {
        assert_eq!(
            Err(DecodeError::UnsupportedSampleRate {
                rate: 48000,
                expected: CANONICAL_RATE
            }),
            decode(&[0.0f32; 48000], 48000)
        );
        assert_eq!(
            Err(DecodeError::TooShort { len: 4, min: 5 }),
            decode(&[0.0f32; 4], CANONICAL_RATE)
        );
    }

    #[test]
    fn test_decoder_from_builder() {
        let decoder = AptDecoderBuilder::new()
            .with_percentiles(2.0, 98.0)
            .with_min_distance(1900)
            .with_trailing_line(TrailingLine::Drop)
            .build();
        assert_eq!((2.0, 98.0), decoder.percentiles());
        assert_eq!(1900, decoder.min_distance());
        assert_eq!(TrailingLine::Drop, decoder.trailing_line());
    }
}
