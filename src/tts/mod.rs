//! TTS module — speaks a prompt's target sentence through the host system's
//! speech synthesis, with a per-platform fallback chain.

pub mod speaker;

// ── Public re-exports ──────────────────────────────────────────────────────

pub use speaker::{Speaker, SystemSpeaker, TtsError};
