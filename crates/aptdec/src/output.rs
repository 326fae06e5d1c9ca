//! Image and audio output

use std::path::Path;

use anyhow::{anyhow, Context};
use log::info;

use noaapt::AptImage;

/// Write `img` as an 8-bit grayscale PNG
///
/// The image must not be empty.
pub fn write_png<P>(path: P, img: &AptImage) -> Result<(), anyhow::Error>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if img.is_empty() {
        return Err(anyhow!("refusing to write an empty image"));
    }

    let (width, height) = (img.width() as u32, img.rows() as u32);
    let buf = image::GrayImage::from_raw(width, height, img.as_raw().to_vec())
        .ok_or_else(|| anyhow!("image buffer does not match {}×{}", width, height))?;
    buf.save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("Unable to write --output \"{}\"", path.display()))?;

    info!(
        "output: wrote {}×{} image to \"{}\"",
        width,
        height,
        path.display()
    );
    Ok(())
}

/// Write mono audio as a 32-bit float WAV
pub fn write_wav<P>(path: P, samples: &[f32], rate: u32) -> Result<(), anyhow::Error>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };

    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("Unable to create --resampled \"{}\"", path.display()))?;
    for &sa in samples {
        writer.write_sample(sa)?;
    }
    writer.finalize()?;

    info!(
        "output: wrote {} samples at {} Hz to \"{}\"",
        samples.len(),
        rate,
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::PathBuf;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("aptdec-test-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_write_png() {
        let mut signal: Vec<u8> = (0..noaapt::LINE_LENGTH * 3)
            .map(|i| (i % 256) as u8)
            .collect();
        for line in signal.chunks_exact_mut(noaapt::LINE_LENGTH) {
            line[0..noaapt::SYNC_A_LEN].copy_from_slice(&noaapt::SYNC_A);
        }

        let img = noaapt::AptDecoder::default().decode_digitized(&signal);
        assert!(!img.is_empty());

        let path = scratch_path("image.png");
        write_png(&path, &img).expect("write");

        let readback = image::open(&path).expect("open").into_luma8();
        assert_eq!(noaapt::LINE_LENGTH as u32, readback.width());
        assert_eq!(img.rows() as u32, readback.height());
        assert_eq!(img.as_raw(), readback.as_raw().as_slice());
        drop(std::fs::remove_file(&path));
    }

    #[test]
    fn test_write_png_empty() {
        let path = scratch_path("empty.png");
        assert!(write_png(&path, &AptImage::default()).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_write_wav() {
        const SAMPLES: &[f32] = &[0.0, 0.5, -0.25, 1000.0];

        let path = scratch_path("resampled.wav");
        write_wav(&path, SAMPLES, noaapt::CANONICAL_RATE).expect("write");

        let mut reader = hound::WavReader::open(&path).expect("open");
        assert_eq!(noaapt::CANONICAL_RATE, reader.spec().sample_rate);
        assert_eq!(1, reader.spec().channels);
        let readback: Vec<f32> = reader
            .samples::<f32>()
            .collect::<Result<Vec<f32>, _>>()
            .expect("read");
        assert_eq!(SAMPLES, readback.as_slice());
        drop(std::fs::remove_file(&path));
    }
}
