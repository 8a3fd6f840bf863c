//! STT (speech-to-text) module.
//!
//! ```text
//! ┌────────────────────────────────────────────────┐
//! │              Transcriber (trait)               │
//! │                                                │
//! │   WAV path ──▶ WhisperTranscriber              │
//! │                 ├─ lazy model load (once)      │
//! │                 ├─ read WAV → 16 kHz mono f32  │
//! │                 └─ inference → Transcript      │
//! └────────────────────────────────────────────────┘
//! ```

pub mod engine;
pub mod whisper;

// ── Public re-exports ──────────────────────────────────────────────────────

pub use engine::{SttError, Transcriber, Transcript};
pub use whisper::{TranscribeParams, WhisperTranscriber};

// test-only re-export so pipeline tests can import the mock directly.
#[cfg(test)]
pub use engine::MockTranscriber;
