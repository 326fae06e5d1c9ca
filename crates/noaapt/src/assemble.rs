//! Line assembly
//!
//! Cuts the digitized signal into scan lines at the peaks found
//! by the [`SyncDetector`](crate::SyncDetector) and stacks them
//! into an [`AptImage`].
//!
//! Every row is exactly [`LINE_LENGTH`] pixels, starting at its
//! peak, no matter how far away the next peak is. Lines are not
//! stretched or squeezed to compensate for drift.

use nalgebra::DMatrix;

#[cfg(not(test))]
use log::{debug, warn};

#[cfg(test)]
use std::println as debug;
#[cfg(test)]
use std::println as warn;

use crate::sync::Peak;
use crate::waveform::LINE_LENGTH;

/// Pixel value used to pad an incomplete trailing line
pub const PAD_VALUE: u8 = 0;

/// Handling for a line which runs past the end of the signal
///
/// A line starts at its peak and is always [`LINE_LENGTH`]
/// pixels long. Near the end of a recording, the signal may
/// end before the line does.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::EnumMessage,
)]
#[strum(serialize_all = "lowercase")]
pub enum TrailingLine {
    /// Fill the missing pixels with [`PAD_VALUE`] (black)
    #[default]
    #[strum(detailed_message = "pad the incomplete line with black")]
    Pad,

    /// Discard the incomplete line
    #[strum(detailed_message = "discard the incomplete line")]
    Drop,
}

/// Decoded APT image
///
/// A rectangular grid of 8-bit grayscale pixels. Every row is
/// one scan line of [`LINE_LENGTH`] pixels. Pixels are stored
/// in row-major order, which is what most image encoders expect.
///
/// An image with zero rows is valid: it means that no scan
/// lines could be found.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct AptImage {
    pixels: Vec<u8>,
    line_starts: Vec<usize>,
    padded_samples: usize,
    dropped_rows: usize,
}

impl AptImage {
    /// Number of rows (scan lines)
    pub fn rows(&self) -> usize {
        self.line_starts.len()
    }

    /// Number of columns, always [`LINE_LENGTH`]
    pub fn width(&self) -> usize {
        LINE_LENGTH
    }

    /// True if no scan lines were decoded
    pub fn is_empty(&self) -> bool {
        self.line_starts.is_empty()
    }

    /// Pixels of one row
    ///
    /// Returns `None` if `row` is out of range.
    pub fn row(&self, row: usize) -> Option<&[u8]> {
        if row < self.rows() {
            Some(&self.pixels[row * LINE_LENGTH..(row + 1) * LINE_LENGTH])
        } else {
            None
        }
    }

    /// Iterate over rows, top to bottom
    pub fn iter_rows(&self) -> std::slice::ChunksExact<'_, u8> {
        self.pixels.chunks_exact(LINE_LENGTH)
    }

    /// All pixels, row-major
    pub fn as_raw(&self) -> &[u8] {
        &self.pixels
    }

    /// Take all pixels, row-major
    pub fn into_raw(self) -> Vec<u8> {
        self.pixels
    }

    /// Copy into a `rows × LINE_LENGTH` matrix
    pub fn to_matrix(&self) -> DMatrix<u8> {
        DMatrix::from_row_slice(self.rows(), LINE_LENGTH, &self.pixels)
    }

    /// Signal index at which each row begins
    pub fn line_starts(&self) -> &[usize] {
        &self.line_starts
    }

    /// Number of pixels filled with [`PAD_VALUE`]
    ///
    /// Nonzero only if the last row ran past the end of the
    /// signal and [`TrailingLine::Pad`] was in effect.
    pub fn padded_samples(&self) -> usize {
        self.padded_samples
    }

    /// Number of incomplete rows discarded
    ///
    /// Nonzero only if [`TrailingLine::Drop`] was in effect.
    pub fn dropped_rows(&self) -> usize {
        self.dropped_rows
    }
}

/// Assemble scan lines
///
/// Emits one row for each consecutive pair of `peaks`: the
/// [`LINE_LENGTH`] pixels of `signal` that begin at the first
/// peak of the pair. The last peak only bounds the row before it.
///
/// If a row would run past the end of `signal`, it is padded
/// or dropped according to `trailing`.
///
/// Fewer than two peaks produce an empty image.
pub fn assemble(signal: &[u8], peaks: &[Peak], trailing: TrailingLine) -> AptImage {
    let mut out = AptImage::default();
    let starts = peaks.iter().map(|pk| pk.index);
    let bounded = starts.take(peaks.len().saturating_sub(1));

    for start in bounded {
        let end = start + LINE_LENGTH;
        if end <= signal.len() {
            out.pixels.extend_from_slice(&signal[start..end]);
        } else {
            let available = &signal[usize::min(start, signal.len())..];
            let missing = LINE_LENGTH - available.len();
            match trailing {
                TrailingLine::Pad => {
                    warn!(
                        "assembler: line at {} is {} pixels short; padding",
                        start, missing
                    );
                    out.pixels.extend_from_slice(available);
                    out.pixels
                        .extend(std::iter::repeat(PAD_VALUE).take(missing));
                    out.padded_samples += missing;
                }
                TrailingLine::Drop => {
                    warn!(
                        "assembler: line at {} is {} pixels short; dropping",
                        start, missing
                    );
                    out.dropped_rows += 1;
                    continue;
                }
            }
        }
        out.line_starts.push(start);
    }

    debug!(
        "assembler: {} rows from {} peaks",
        out.rows(),
        peaks.len()
    );
    out
}
