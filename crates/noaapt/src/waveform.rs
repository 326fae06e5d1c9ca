//! Waveform parameters for NOAA APT

/// Canonical input sampling rate (Hz)
///
/// The decoder only accepts audio at this rate. It is exactly
/// [`DECIMATION`] times the APT pixel rate.
pub const CANONICAL_RATE: u32 = 20800;

/// Pixel samples per scan line
///
/// Every line of an APT image, including both video channels,
/// sync words, and telemetry wedges, is this many pixels long.
pub const LINE_LENGTH: usize = 2080;

/// Scan lines transmitted per second
pub const LINES_PER_SECOND: usize = 2;

/// APT pixel rate (pixels per second)
pub const PIXEL_RATE: u32 = (LINE_LENGTH * LINES_PER_SECOND) as u32;

/// Input samples per pixel at the canonical rate
pub const DECIMATION: usize = (CANONICAL_RATE / PIXEL_RATE) as usize;

/// Which sample of each group of [`DECIMATION`] is kept
///
/// The middle sample is the one farthest from pixel transitions.
pub const DECIMATION_OFFSET: usize = 2;

/// Minimum distance between two line starts (pixels)
///
/// Slightly shorter than [`LINE_LENGTH`], which permits the line
/// period to shrink by about 4% from Doppler or clock drift.
pub const MIN_DISTANCE: usize = 2000;

/// DC offset removed from pixels and template before correlation
pub const SYNC_OFFSET: i32 = 128;

/// Length of the [`SYNC_A`] template
pub const SYNC_A_LEN: usize = 35;

/// Channel A synchronization template
///
/// Seven square-wave impulses followed by a run of black pixels.
/// Some lines follow the black run with white pixels instead, so
/// only the first few black pixels are included.
pub static SYNC_A: [u8; SYNC_A_LEN] = [
    0, 128, 255, 128, 0, 128, 255, 128, 0, 128, 255, 128, 0, 128, 255, 128, 0, 128, 255, 128, 0,
    128, 255, 128, 0, 128, 255, 128, 0, 0, 0, 0, 0, 0, 0,
];

/// APT subcarrier frequency (Hz)
#[cfg(test)]
pub const CARRIER_HZ: f32 = 2400.0;

/// Very simple AM modulator
///
/// This method is designed for use in tests. Each pixel of
/// `pixels` is held for [`DECIMATION`] samples and modulates the
/// amplitude of a [`CARRIER_HZ`] cosine at the canonical rate.
/// `scale` sets the amplitude of a white (255) pixel.
#[cfg(test)]
pub fn modulate_am(pixels: &[u8], scale: f32) -> Vec<f32> {
    const TWOPI: f32 = 2.0f32 * std::f32::consts::PI;

    let rad_per_sa = TWOPI * CARRIER_HZ / CANONICAL_RATE as f32;
    let mut phase = 0.0f32;
    let mut out = Vec::with_capacity(pixels.len() * DECIMATION);
    for &px in pixels {
        let amplitude = scale * px as f32 / 255.0;
        for _i in 0..DECIMATION {
            out.push(amplitude * phase.cos());
            phase += rad_per_sa;
            if phase > TWOPI {
                phase -= TWOPI;
            }
        }
    }
    out
}

/// Generate APT image lines
///
/// This method is designed for use in tests. Returns `lines`
/// scan lines of pixels. Each line begins with [`SYNC_A`] and
/// is filled with a horizontal gray ramp. `LINE_LENGTH - shrink`
/// pixels are emitted per line, which emulates a shortened line
/// period.
#[cfg(test)]
pub fn make_lines(lines: usize, shrink: usize) -> Vec<u8> {
    let line_len = LINE_LENGTH - shrink;
    let mut out = Vec::with_capacity(lines * line_len);
    for _line in 0..lines {
        out.extend_from_slice(&SYNC_A);
        for px in SYNC_A_LEN..line_len {
            // stay away from black so the picture never looks like sync
            out.push(64 + ((px * 96) / line_len) as u8);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rates() {
        assert_eq!(PIXEL_RATE, 4160);
        assert_eq!(DECIMATION, 5);
        assert!(DECIMATION_OFFSET < DECIMATION);
        assert!(MIN_DISTANCE < LINE_LENGTH);
    }

    #[test]
    fn test_sync_a() {
        for pulse in SYNC_A[0..28].chunks(4) {
            assert_eq!(&[0, 128, 255, 128], pulse);
        }
        assert!(SYNC_A[28..].iter().all(|&px| px == 0));
    }

    #[test]
    fn test_make_lines() {
        let lines = make_lines(3, 10);
        assert_eq!(lines.len(), 3 * (LINE_LENGTH - 10));
        assert_eq!(&lines[0..SYNC_A_LEN], &SYNC_A);
        assert_eq!(&lines[LINE_LENGTH - 10..LINE_LENGTH - 10 + SYNC_A_LEN], &SYNC_A);
    }

    #[test]
    fn test_modulate_am() {
        let sig = modulate_am(&[255, 0], 2.0);
        assert_eq!(sig.len(), 2 * DECIMATION);
        assert_eq!(sig[0], 2.0);
        assert!(sig[DECIMATION..].iter().all(|&sa| sa == 0.0));
    }
}
