//! # noaapt: NOAA APT Image Decoding
//!
//! This crate decodes the
//! [Automatic Picture Transmission](https://en.wikipedia.org/wiki/Automatic_picture_transmission)
//! (APT) signal broadcast by the NOAA polar-orbiting weather
//! satellites. It turns a recording of the satellite's audio
//! into a grayscale image, one row per scan line.
//!
//! ## Disclaimer
//!
//! This crate is dual-licensed MIT and Apache 2.0. Read these licenses
//! carefully as they may affect your rights.
//!
//! The images produced by this crate are not calibrated. Do not use
//! them for anything that requires radiometric accuracy.
//!
//! ## Example
//!
//! You will first need to recover *baseband audio* from the
//! satellite's 137 MHz FM downlink, using a receiver or a
//! software-defined radio. Obtaining the audio is beyond the
//! scope of this crate. If you have a stereo recording, use
//! one channel.
//!
//! The decoder accepts audio at exactly
//! [`CANONICAL_RATE`] (20800 Hz), which is five samples per
//! pixel. Resample your recording first if needed.
//!
//! ```
//! use noaapt::{AptDecoderBuilder, DecodeError, TrailingLine, CANONICAL_RATE};
//!
//! # let some_recording = || vec![0.0f32; CANONICAL_RATE as usize];
//! #
//! let decoder = AptDecoderBuilder::new()
//!     .with_percentiles(0.5, 99.5)            // contrast stretch
//!     .with_trailing_line(TrailingLine::Pad)  // keep the last partial line
//!     .build();
//!
//! // let audio be f32 mono samples at 20800 Hz
//! let audio = some_recording();
//! match decoder.decode(&audio, CANONICAL_RATE) {
//!     Ok(img) if img.is_empty() => println!("no scan lines found"),
//!     Ok(img) => println!("decoded {} × {} image", img.width(), img.rows()),
//!     Err(DecodeError::DegenerateSignal { .. }) => println!("recording is silent"),
//!     Err(e) => println!("error: {}", e),
//! }
//! ```
//!
//! The decoder is created via a
//! [builder](struct.AptDecoderBuilder.html). If you are happy with
//! the defaults, the [`decode()`] function is a shortcut.
//!
//! Decoding proceeds in four stages, each of which is also
//! available on its own:
//!
//! 1. The [`Demodulator`] recovers the amplitude envelope of the
//!    subcarrier and reduces it to one value per pixel.
//! 2. The [`Digitizer`] maps the envelope to 8-bit pixels with a
//!    percentile contrast stretch.
//! 3. The [`SyncDetector`] finds the start of every scan line by
//!    correlating against the [channel A sync word](SYNC_A).
//! 4. The [`assemble()`] function cuts the pixels into rows of an
//!    [`AptImage`].
//!
//! ## Background
//!
//! APT is an analog image format. Each satellite scans the Earth
//! with a radiometer, one line at a time, and transmits two lines
//! per second. Every line holds [`LINE_LENGTH`] pixels: a sync
//! word, a space marker, and the image for channel A; then the
//! same again for channel B.
//!
//! Pixel intensities amplitude-modulate a 2400 Hz subcarrier at
//! 4160 pixels per second. The subcarrier in turn frequency-modulates
//! the VHF carrier. Since there is no digital framing, receivers
//! find the start of each line by looking for the sync word, a
//! train of seven square pulses.

mod assemble;
mod builder;
mod decoder;
mod demod;
mod digitize;
mod error;
mod sync;
mod waveform;

pub use assemble::{assemble, AptImage, TrailingLine, PAD_VALUE};
pub use builder::AptDecoderBuilder;
pub use decoder::{decode, AptDecoder};
pub use demod::{analytic_envelope, decimate, median_filter, Demodulator, MEDIAN_LEN};
pub use digitize::{percentile, Digitizer};
pub use error::DecodeError;
pub use sync::{Peak, PeakTracker, SyncDetector};
pub use waveform::{
    CANONICAL_RATE, DECIMATION, DECIMATION_OFFSET, LINES_PER_SECOND, LINE_LENGTH, MIN_DISTANCE,
    PIXEL_RATE, SYNC_A, SYNC_A_LEN, SYNC_OFFSET,
};
