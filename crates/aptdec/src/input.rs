//! Audio input
//!
//! Reads either a WAV file or raw native-endian `i16` samples.
//! WAV input is recognized by its RIFF header.

use std::io::{self, BufRead};

use anyhow::{anyhow, Context};
use byteorder::{NativeEndian, ReadBytesExt};
use log::{debug, info};

/// Mono audio at a known sampling rate
#[derive(Clone, Debug, PartialEq)]
pub struct Recording {
    /// Sampling rate (Hz)
    pub rate: u32,

    /// Samples, unscaled
    pub samples: Vec<f32>,
}

/// Read a complete recording
///
/// If `input` begins with a RIFF header, it is parsed as a WAV
/// file, and the WAV's sampling rate is used. Otherwise it is
/// read as raw `i16` samples at `raw_rate`.
pub fn read_recording<R>(mut input: R, raw_rate: u32) -> Result<Recording, anyhow::Error>
where
    R: BufRead,
{
    if is_wav(&mut input)? {
        read_wav(input)
    } else {
        info!("input: raw i16 samples at {} Hz", raw_rate);
        Ok(Recording {
            rate: raw_rate,
            samples: read_raw(input),
        })
    }
}

/// True if `input` starts with a RIFF header
///
/// Peeks at the buffer without consuming anything.
pub fn is_wav<R>(input: &mut R) -> Result<bool, io::Error>
where
    R: BufRead,
{
    let buf = input.fill_buf()?;
    Ok(buf.starts_with(b"RIFF"))
}

/// Read a WAV file
///
/// Integer samples are converted to `f32` without scaling.
/// Only the first channel is kept.
pub fn read_wav<R>(input: R) -> Result<Recording, anyhow::Error>
where
    R: io::Read,
{
    let mut reader = hound::WavReader::new(input).context("unable to read WAV header")?;
    let spec = reader.spec();
    info!(
        "input: WAV with {} channel(s), {} Hz, {}-bit {:?}",
        spec.channels, spec.sample_rate, spec.bits_per_sample, spec.sample_format
    );

    if spec.channels == 0 || spec.sample_rate == 0 {
        return Err(anyhow!(
            "WAV file has {} channels at {} Hz",
            spec.channels,
            spec.sample_rate
        ));
    }

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Int => reader
            .samples::<i32>()
            .map(|sa| sa.map(|sa| sa as f32))
            .collect::<Result<Vec<f32>, hound::Error>>(),
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<Vec<f32>, hound::Error>>(),
    }
    .context("unable to read WAV samples")?;

    Ok(Recording {
        rate: spec.sample_rate,
        samples: first_channel(&interleaved, spec.channels as usize),
    })
}

/// Read raw samples until end of file
///
/// Reads native-endian `i16` samples. A trailing odd byte is
/// ignored.
pub fn read_raw<R>(mut input: R) -> Vec<f32>
where
    R: io::Read,
{
    let out: Vec<f32> = std::iter::from_fn(|| input.read_i16::<NativeEndian>().ok())
        .map(f32::from)
        .collect();
    debug!("input: read {} raw samples", out.len());
    out
}

/// Keep only the first channel of interleaved audio
pub fn first_channel(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels > 1 {
        debug!("input: keeping channel 1 of {}", channels);
    }
    interleaved
        .iter()
        .step_by(usize::max(channels, 1))
        .copied()
        .collect()
}
