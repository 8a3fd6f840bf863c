//! Channel mixing and sample-rate conversion.
//!
//! Two conversions sit between the capture device and the rest of the
//! pipeline:
//!
//! 1. [`stereo_to_mono`] — downmix interleaved channels (recordings are
//!    stored mono).
//! 2. [`resample`] — linear-interpolation rate conversion, used to bring
//!    the device's native rate to the configured recording rate and to
//!    produce the 16 kHz input Whisper requires.

/// Mix interleaved multi-channel audio down to mono by averaging channels.
///
/// The output length is `samples.len() / channels`. Mono input is returned
/// unchanged; zero channels yields an empty vector.
pub fn stereo_to_mono(samples: &[f32], channels: u16) -> Vec<f32> {
    match channels {
        0 => Vec::new(),
        1 => samples.to_vec(),
        n => {
            let n = n as usize;
            samples
                .chunks_exact(n)
                .map(|frame| frame.iter().sum::<f32>() / n as f32)
                .collect()
        }
    }
}

/// Resample `samples` from `source_rate` to `target_rate` Hz using linear
/// interpolation.
///
/// Equal rates and empty input are no-ops. The output length is
/// approximately `samples.len() * target_rate / source_rate`.
pub fn resample(samples: &[f32], source_rate: u32, target_rate: u32) -> Vec<f32> {
    if source_rate == target_rate {
        return samples.to_vec();
    }
    if samples.is_empty() {
        return Vec::new();
    }

    let ratio = target_rate as f64 / source_rate as f64;
    let output_len = (samples.len() as f64 * ratio).ceil() as usize;
    let mut output = Vec::with_capacity(output_len);

    for i in 0..output_len {
        let src_pos = i as f64 / ratio;
        let idx = src_pos as usize;
        let frac = src_pos - idx as f64;

        let sample = if idx + 1 < samples.len() {
            samples[idx] * (1.0 - frac as f32) + samples[idx + 1] * frac as f32
        } else if idx < samples.len() {
            samples[idx]
        } else {
            0.0
        };

        output.push(sample);
    }

    output
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // ---- stereo_to_mono ----------------------------------------------------

    #[test]
    fn mono_passes_through() {
        let input = vec![0.1_f32, 0.2, 0.3];
        assert_eq!(stereo_to_mono(&input, 1), input);
    }

    #[test]
    fn two_channels_average() {
        let input = vec![1.0_f32, -1.0, 0.5, 0.5];
        let out = stereo_to_mono(&input, 2);
        assert_eq!(out.len(), 2);
        assert!((out[0] - 0.0).abs() < 1e-6);
        assert!((out[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn zero_channels_is_empty() {
        assert!(stereo_to_mono(&[1.0_f32, 2.0], 0).is_empty());
    }

    // ---- resample ----------------------------------------------------------

    #[test]
    fn equal_rates_is_noop() {
        let input: Vec<f32> = (0..441).map(|i| i as f32 / 441.0).collect();
        assert_eq!(resample(&input, 44_100, 44_100), input);
    }

    #[test]
    fn empty_input_is_empty() {
        assert!(resample(&[], 44_100, 16_000).is_empty());
    }

    #[test]
    fn downsample_44100_to_16k_length() {
        // 1 s at 44.1 kHz → ~16 000 samples at 16 kHz.
        let input = vec![0.0_f32; 44_100];
        let out = resample(&input, 44_100, 16_000);
        assert!(out.len().abs_diff(16_000) <= 1, "got {}", out.len());
    }

    #[test]
    fn upsample_16k_to_44100_length() {
        let input = vec![0.0_f32; 16_000];
        let out = resample(&input, 16_000, 44_100);
        assert!(out.len().abs_diff(44_100) <= 3, "got {}", out.len());
    }

    #[test]
    fn dc_signal_amplitude_is_preserved() {
        let input = vec![0.5_f32; 4_410];
        for &s in &resample(&input, 44_100, 16_000) {
            assert!((s - 0.5).abs() < 1e-5, "amplitude drift: {s}");
        }
    }
}
