//! Audio module — microphone capture, channel mixing, WAV I/O.
//!
//! # Pipeline
//!
//! ```text
//! Microphone → cpal callback → interleaved f32 → stereo_to_mono
//!           → resample (native → configured rate) → 16-bit PCM WAV
//! ```
//!
//! The evaluation pipeline only sees the [`Recorder`] trait and the path of
//! the temporary WAV it produces.

pub mod recorder;
pub mod resample;
pub mod wav;

// ── Public re-exports ──────────────────────────────────────────────────────

pub use recorder::{CaptureError, CpalRecorder, RecordedSample, Recorder};
pub use resample::{resample, stereo_to_mono};
pub use wav::{f32_to_i16, read_wav_mono_f32, write_wav_i16};

// test-only re-export so pipeline tests can use the capture mock without
// reaching into the recorder module.
#[cfg(test)]
pub use recorder::MockRecorder;
