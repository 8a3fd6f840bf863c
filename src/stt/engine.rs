//! Transcription seam — the [`Transcriber`] trait and its result types.
//!
//! The pipeline treats speech-to-text as an opaque capability: an audio file
//! goes in, a [`Transcript`] comes out, with no guarantee of correctness.
//! Engines that return structured results instead of plain text are handled
//! by [`Transcript::into_text`], which extracts the text field defensively
//! and falls back to rendering the whole value — a shape mismatch is never
//! an error.

use std::path::Path;

use serde_json::Value;
use thiserror::Error;

// ---------------------------------------------------------------------------
// SttError
// ---------------------------------------------------------------------------

/// All errors that can arise from the transcription subsystem.
#[derive(Debug, Clone, Error)]
pub enum SttError {
    /// The GGML model file was not found at the given path.
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// The engine failed to initialise its inference context.
    #[error("Whisper context initialisation failed: {0}")]
    ContextInit(String),

    /// The inference pass itself failed.
    #[error("Transcription error: {0}")]
    Transcription(String),

    /// The audio file could not be read or decoded.
    #[error("Could not read audio sample: {0}")]
    AudioRead(String),

    /// The sample is shorter than the minimum 0.5 s the engine accepts.
    #[error("Audio too short — minimum 0.5 s")]
    AudioTooShort,
}

// ---------------------------------------------------------------------------
// Transcript
// ---------------------------------------------------------------------------

/// What a transcription engine returned: plain text, or a structured value
/// from which text still has to be extracted.
#[derive(Debug, Clone, PartialEq)]
pub enum Transcript {
    /// Plain recognized text.
    Text(String),
    /// A structured engine result (e.g. segments plus metadata).
    Structured(Value),
}

impl Transcript {
    /// Reduce to plain text.
    ///
    /// For structured values the `"text"` field is preferred; when absent or
    /// non-string, the whole value is rendered as its JSON representation so
    /// the evaluation can still proceed.
    pub fn into_text(self) -> String {
        match self {
            Transcript::Text(text) => text,
            Transcript::Structured(value) => match value.get("text").and_then(Value::as_str) {
                Some(text) => text.to_string(),
                None => value.to_string(),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Transcriber trait
// ---------------------------------------------------------------------------

/// Object-safe, thread-safe interface for speech-to-text engines.
///
/// `audio` is a path to a WAV sample (any rate/channel count — engines
/// convert internally). Implementations must be `Send + Sync` so they can be
/// held behind an `Arc<dyn Transcriber>` and shared across worker threads.
pub trait Transcriber: Send + Sync {
    fn transcribe(&self, audio: &Path) -> Result<Transcript, SttError>;
}

// Compile-time assertion: Box<dyn Transcriber> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn Transcriber>) {}
};

// ---------------------------------------------------------------------------
// MockTranscriber  (test-only)
// ---------------------------------------------------------------------------

/// Test double returning a pre-configured transcript or error without
/// loading a model.
#[cfg(test)]
pub struct MockTranscriber {
    response: Result<Transcript, SttError>,
}

#[cfg(test)]
impl MockTranscriber {
    /// Always returns `Ok(Transcript::Text(text))`.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            response: Ok(Transcript::Text(text.into())),
        }
    }

    /// Always returns `Ok(Transcript::Structured(value))`.
    pub fn structured(value: Value) -> Self {
        Self {
            response: Ok(Transcript::Structured(value)),
        }
    }

    /// Always returns `Err(error)`.
    pub fn err(error: SttError) -> Self {
        Self {
            response: Err(error),
        }
    }
}

#[cfg(test)]
impl Transcriber for MockTranscriber {
    fn transcribe(&self, _audio: &Path) -> Result<Transcript, SttError> {
        self.response.clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plain_text_passes_through() {
        let t = Transcript::Text("cleared to land".into());
        assert_eq!(t.into_text(), "cleared to land");
    }

    #[test]
    fn structured_text_field_is_extracted() {
        let t = Transcript::Structured(json!({
            "text": "contact ground on 121.9",
            "segments": [{"start": 0.0, "end": 2.4}],
        }));
        assert_eq!(t.into_text(), "contact ground on 121.9");
    }

    #[test]
    fn structured_without_text_field_renders_whole_value() {
        let t = Transcript::Structured(json!({"confidence": 0.4}));
        assert_eq!(t.into_text(), r#"{"confidence":0.4}"#);
    }

    #[test]
    fn structured_with_non_string_text_renders_whole_value() {
        let t = Transcript::Structured(json!({"text": 42}));
        assert_eq!(t.into_text(), r#"{"text":42}"#);
    }

    #[test]
    fn mock_err_returns_configured_error() {
        let engine = MockTranscriber::err(SttError::Transcription("boom".into()));
        let err = engine.transcribe(Path::new("/tmp/a.wav")).unwrap_err();
        assert!(matches!(err, SttError::Transcription(_)));
    }

    #[test]
    fn box_dyn_transcriber_compiles() {
        let engine: Box<dyn Transcriber> = Box::new(MockTranscriber::text("ok"));
        let _ = engine.transcribe(Path::new("/tmp/a.wav"));
    }
}
