//! WAV file I/O via `hound`.
//!
//! Captured attempts are written as 16-bit mono PCM; reading accepts any
//! channel count and both integer and float PCM so the batch mode can take
//! externally produced files.

use std::path::Path;

use super::resample::stereo_to_mono;

/// Write `samples` as a 16-bit mono PCM WAV at `sample_rate` Hz.
pub fn write_wav_i16(
    path: &Path,
    samples: &[i16],
    sample_rate: u32,
) -> Result<(), hound::Error> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)?;
    for &s in samples {
        writer.write_sample(s)?;
    }
    writer.finalize()
}

/// Read a WAV file as mono `f32` samples in `[-1.0, 1.0]`.
///
/// Multi-channel files are downmixed; integer PCM of any bit depth is scaled
/// to the float range. Returns the samples and the file's sample rate.
pub fn read_wav_mono_f32(path: &Path) -> Result<(Vec<f32>, u32), hound::Error> {
    let mut reader = hound::WavReader::open(path)?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
        hound::SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<_, _>>()?
        }
    };

    Ok((stereo_to_mono(&samples, spec.channels), spec.sample_rate))
}

/// Convert float samples to 16-bit PCM, clamping out-of-range values.
pub fn f32_to_i16(samples: &[f32]) -> Vec<i16> {
    samples
        .iter()
        .map(|&s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.wav");

        let samples: Vec<i16> = (0..1_000).map(|i| (i % 128) as i16 * 100).collect();
        write_wav_i16(&path, &samples, 44_100).unwrap();

        let (read, rate) = read_wav_mono_f32(&path).unwrap();
        assert_eq!(rate, 44_100);
        assert_eq!(read.len(), samples.len());

        // Spot-check scaling: i16 → f32 → close to original / 32768.
        for (f, i) in read.iter().zip(samples.iter()) {
            assert!((f - *i as f32 / 32_768.0).abs() < 1e-4);
        }
    }

    #[test]
    fn f32_to_i16_clamps() {
        let out = f32_to_i16(&[0.0, 1.0, -1.0, 2.0, -2.0]);
        assert_eq!(out[0], 0);
        assert_eq!(out[1], i16::MAX);
        assert_eq!(out[3], i16::MAX);
        assert!(out[2] <= -i16::MAX + 1);
        assert_eq!(out[2], out[4]);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(read_wav_mono_f32(Path::new("/nonexistent/clip.wav")).is_err());
    }
}
