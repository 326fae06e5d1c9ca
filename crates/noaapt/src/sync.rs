//! Scan line synchronization
//!
//! Every APT scan line begins with a sync word: seven square
//! pulses followed by a run of black pixels. The
//! [`SyncDetector`] slides the [`SYNC_A`](crate::SYNC_A) template across
//! the digitized signal and picks the best-correlated position
//! in each line period.
//!
//! The line period is nominally [`LINE_LENGTH`](crate::LINE_LENGTH) pixels, but it
//! drifts with Doppler shift and with the sound card clock.
//! The detector therefore does not assume the period. Instead,
//! it keeps a single *open* peak:
//!
//! ```txt
//!                 score > open.score
//!                 ┌──────────────┐
//!                 │              ▼
//! +--------+    +------------------+  i - open.index > min_distance  +-----------+
//! | (0, 0) | ─▶ |  open, tracking  | ──────────────────────────────▶ | committed |
//! +--------+    +------------------+                                 +-----------+
//!  sentinel            ▲                                                   │
//!                      └──────────────── new open peak at (i, score) ──────┘
//! ```
//!
//! While the scan position is within `min_distance` of the open
//! peak, a strictly better score moves the peak. Once the scan
//! is farther than `min_distance` away, the open peak is
//! committed and a new one opens at the current position. The
//! scan is a single forward pass. It never looks back.

#[cfg(not(test))]
use log::{debug, trace};

#[cfg(test)]
use std::println as debug;
#[cfg(test)]
use std::println as trace;

use crate::waveform::{MIN_DISTANCE, SYNC_A, SYNC_OFFSET};

/// Candidate line start
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Peak {
    /// Pixel index of the line start
    pub index: usize,

    /// Correlation score with the sync template
    pub score: i32,
}

impl Peak {
    /// The initial open peak, at index zero with zero score
    pub const SENTINEL: Peak = Peak { index: 0, score: 0 };

    /// New peak
    pub fn new(index: usize, score: i32) -> Self {
        Self { index, score }
    }
}

/// Forward-only peak picker
///
/// Feed correlation scores in increasing index order with
/// [`input()`](#method.input). When done, [`finish()`](#method.finish)
/// returns every peak, including the one still open.
#[derive(Clone, Debug)]
pub struct PeakTracker {
    // minimum distance between committed peaks
    min_distance: usize,

    // strongest match in the current line period
    open: Peak,

    // closed peaks, in increasing index order
    committed: Vec<Peak>,
}

impl PeakTracker {
    /// New tracker
    ///
    /// A new peak is opened only when the scan position is
    /// strictly more than `min_distance` past the open peak.
    pub fn new(min_distance: usize) -> Self {
        Self {
            min_distance,
            open: Peak::SENTINEL,
            committed: Vec::new(),
        }
    }

    /// Reset to the sentinel
    pub fn reset(&mut self) {
        self.open = Peak::SENTINEL;
        self.committed.clear();
    }

    /// Minimum distance between peaks
    pub fn min_distance(&self) -> usize {
        self.min_distance
    }

    /// The peak currently accumulating
    pub fn open(&self) -> Peak {
        self.open
    }

    /// Peaks which have been closed
    pub fn committed(&self) -> &[Peak] {
        &self.committed
    }

    /// Accept the correlation `score` at `index`
    ///
    /// Indices must be given in increasing order.
    ///
    /// Ties keep the earlier peak.
    #[inline]
    pub fn input(&mut self, index: usize, score: i32) {
        debug_assert!(index >= self.open.index);

        if index - self.open.index > self.min_distance {
            trace!(
                "sync: committed peak at {} (score {})",
                self.open.index,
                self.open.score
            );
            self.committed.push(self.open);
            self.open = Peak::new(index, score);
        } else if score > self.open.score {
            self.open = Peak::new(index, score);
        }
    }

    /// Close the open peak and return all peaks
    ///
    /// The peaks are in increasing index order. The first peak
    /// is the sentinel, or whatever displaced it.
    pub fn finish(mut self) -> Vec<Peak> {
        self.committed.push(self.open);
        self.committed
    }
}

/// Sync word detector
///
/// Locates scan line starts in a digitized APT signal. See the
/// [module documentation](self) for the algorithm.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyncDetector {
    // template, with SYNC_OFFSET removed
    template: Vec<i32>,

    // minimum distance between line starts
    min_distance: usize,
}

impl SyncDetector {
    /// Detector with a custom template
    ///
    /// The `template` is given in pixel intensities. Line starts
    /// closer than `min_distance` are merged into the strongest
    /// one.
    pub fn new(template: &[u8], min_distance: usize) -> Self {
        Self {
            template: template
                .iter()
                .map(|&px| px as i32 - SYNC_OFFSET)
                .collect(),
            min_distance,
        }
    }

    /// Template length, in pixels
    pub fn template_len(&self) -> usize {
        self.template.len()
    }

    /// Minimum distance between line starts
    pub fn min_distance(&self) -> usize {
        self.min_distance
    }

    /// Correlation scores at every window position
    ///
    /// Yields the dot product of the offset-removed template and
    /// the offset-removed `signal` window at each position
    /// `0 .. signal.len() - template_len()`. Yields nothing if
    /// the signal is no longer than the template.
    pub fn correlate<'sig>(&'sig self, signal: &'sig [u8]) -> impl Iterator<Item = i32> + 'sig {
        let positions = signal.len().saturating_sub(self.template.len());
        (0..positions).map(move |i| correlate_window(&self.template, &signal[i..]))
    }

    /// Find line starts
    ///
    /// Returns the peaks of the correlation, at least
    /// `min_distance` apart, in increasing index order. The
    /// output always contains at least one peak: the sentinel
    /// [`Peak::SENTINEL`], or a peak which replaced it.
    pub fn find_peaks(&self, signal: &[u8]) -> Vec<Peak> {
        let mut tracker = PeakTracker::new(self.min_distance);
        for (index, score) in self.correlate(signal).enumerate() {
            tracker.input(index, score);
        }
        let peaks = tracker.finish();

        debug!("sync: {} peaks in {} pixels", peaks.len(), signal.len());
        peaks
    }
}

impl std::default::Default for SyncDetector {
    fn default() -> Self {
        Self::new(&SYNC_A, MIN_DISTANCE)
    }
}

// Dot product of template and offset-removed window
//
// `window` may be longer than `template`; the excess is ignored.
#[inline]
fn correlate_window(template: &[i32], window: &[u8]) -> i32 {
    template
        .iter()
        .zip(window.iter())
        .map(|(&t, &px)| t * (px as i32 - SYNC_OFFSET))
        .sum()
}
