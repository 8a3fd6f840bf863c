//! Microphone capture via `cpal`.
//!
//! [`Recorder`] is the seam the evaluation pipeline records through;
//! [`CpalRecorder`] is the production implementation. One call captures a
//! fixed-duration mono clip from the default input device, resamples it to
//! the requested rate, and writes it to a persistent temporary WAV file.
//! The caller owns the artifact from then on — the pipeline only records its
//! location.

use std::path::PathBuf;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use thiserror::Error;

use super::resample::{resample, stereo_to_mono};
use super::wav::{f32_to_i16, write_wav_i16};

// ---------------------------------------------------------------------------
// CaptureError
// ---------------------------------------------------------------------------

/// Errors that can occur while capturing one audio sample.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("no input device found on the default audio host")]
    NoDevice,

    #[error("failed to query default input config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("failed to build input stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start audio stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    #[error("failed to write captured audio: {0}")]
    Wav(#[from] hound::Error),

    #[error("failed to create temporary audio file: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Recorder trait
// ---------------------------------------------------------------------------

/// One captured attempt: the location of the temporary WAV artifact.
#[derive(Debug, Clone)]
pub struct RecordedSample {
    pub path: PathBuf,
}

/// Object-safe, thread-safe interface for audio capture.
///
/// # Contract
///
/// The returned file is mono 16-bit PCM at `sample_rate` Hz, roughly
/// `duration_secs` long, and persists until the caller removes it.
pub trait Recorder: Send + Sync {
    fn record(&self, duration_secs: u32, sample_rate: u32)
        -> Result<RecordedSample, CaptureError>;
}

// ---------------------------------------------------------------------------
// CpalRecorder
// ---------------------------------------------------------------------------

/// Production recorder using the system default input device.
///
/// The device is opened fresh per call — recording is an occasional,
/// user-initiated action, not a continuous stream.
#[derive(Debug, Default)]
pub struct CpalRecorder;

impl CpalRecorder {
    pub fn new() -> Self {
        Self
    }
}

impl Recorder for CpalRecorder {
    fn record(
        &self,
        duration_secs: u32,
        sample_rate: u32,
    ) -> Result<RecordedSample, CaptureError> {
        let host = cpal::default_host();
        let device = host.default_input_device().ok_or(CaptureError::NoDevice)?;

        let supported = device.default_input_config()?;
        let native_rate = supported.sample_rate().0;
        let channels = supported.channels();
        let config: cpal::StreamConfig = supported.into();

        log::debug!(
            "recording {duration_secs} s from default input ({native_rate} Hz, {channels} ch)"
        );

        let (tx, rx) = mpsc::channel::<Vec<f32>>();

        let stream = device.build_input_stream(
            &config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                // Receiver may be gone once enough audio has arrived.
                let _ = tx.send(data.to_vec());
            },
            |err: cpal::StreamError| {
                log::error!("cpal stream error: {err}");
            },
            None,
        )?;
        stream.play()?;

        // Drain the callback channel until we hold `duration_secs` worth of
        // interleaved samples. The deadline guards against a stalled device.
        let needed = native_rate as usize * channels as usize * duration_secs as usize;
        let deadline = Instant::now() + Duration::from_secs(u64::from(duration_secs) + 2);
        let mut interleaved: Vec<f32> = Vec::with_capacity(needed);

        while interleaved.len() < needed && Instant::now() < deadline {
            match rx.recv_timeout(Duration::from_millis(250)) {
                Ok(chunk) => interleaved.extend_from_slice(&chunk),
                Err(mpsc::RecvTimeoutError::Timeout) => continue,
                Err(mpsc::RecvTimeoutError::Disconnected) => break,
            }
        }
        drop(stream);
        interleaved.truncate(needed);

        let mono = stereo_to_mono(&interleaved, channels);
        let converted = resample(&mono, native_rate, sample_rate);
        let pcm = f32_to_i16(&converted);

        let tmp = tempfile::Builder::new()
            .prefix("readback-")
            .suffix(".wav")
            .tempfile()?;
        let (_, path) = tmp.keep().map_err(|e| CaptureError::Io(e.error))?;

        write_wav_i16(&path, &pcm, sample_rate)?;
        log::info!("captured {} samples to {}", pcm.len(), path.display());

        Ok(RecordedSample { path })
    }
}

// ---------------------------------------------------------------------------
// MockRecorder  (test-only)
// ---------------------------------------------------------------------------

/// Test double returning a pre-configured path or error without touching any
/// audio hardware.
#[cfg(test)]
pub struct MockRecorder {
    response: Result<PathBuf, String>,
}

#[cfg(test)]
impl MockRecorder {
    /// A mock whose `record` always succeeds with `path`.
    pub fn ok(path: impl Into<PathBuf>) -> Self {
        Self {
            response: Ok(path.into()),
        }
    }

    /// A mock whose `record` always fails as if no device were present.
    pub fn no_device() -> Self {
        Self {
            response: Err("no device".into()),
        }
    }
}

#[cfg(test)]
impl Recorder for MockRecorder {
    fn record(
        &self,
        _duration_secs: u32,
        _sample_rate: u32,
    ) -> Result<RecordedSample, CaptureError> {
        match &self.response {
            Ok(path) => Ok(RecordedSample { path: path.clone() }),
            Err(_) => Err(CaptureError::NoDevice),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_ok_returns_configured_path() {
        let rec = MockRecorder::ok("/tmp/clip.wav");
        let sample = rec.record(5, 44_100).unwrap();
        assert_eq!(sample.path, PathBuf::from("/tmp/clip.wav"));
    }

    #[test]
    fn mock_no_device_errors() {
        let rec = MockRecorder::no_device();
        assert!(matches!(
            rec.record(5, 44_100).unwrap_err(),
            CaptureError::NoDevice
        ));
    }

    #[test]
    fn recorder_is_object_safe() {
        let rec: Box<dyn Recorder> = Box::new(MockRecorder::ok("/tmp/a.wav"));
        let _ = rec.record(1, 16_000);
    }
}
