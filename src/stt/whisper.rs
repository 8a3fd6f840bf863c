//! Whisper-backed [`Transcriber`] built on `whisper_rs`.
//!
//! [`WhisperTranscriber`] defers loading the GGML model until the first
//! transcription call and then reuses the same `WhisperContext` for the rest
//! of the process lifetime — model loading takes seconds, inference calls
//! are frequent. A fresh `WhisperState` is created per call, so no locking
//! is needed around inference.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use crate::audio::{read_wav_mono_f32, resample};

use super::engine::{SttError, Transcriber, Transcript};

/// Sample rate Whisper inference expects.
const WHISPER_SAMPLE_RATE: u32 = 16_000;

/// Minimum audio length: 0.5 s at 16 kHz.
const MIN_AUDIO_SAMPLES: usize = 8_000;

// ---------------------------------------------------------------------------
// TranscribeParams
// ---------------------------------------------------------------------------

/// Parameters for a Whisper inference run.
#[derive(Debug, Clone)]
pub struct TranscribeParams {
    /// ISO-639-1 language hint (e.g. `"en"`), or `"auto"` for Whisper's
    /// built-in language detection.
    pub language: String,

    /// Number of CPU threads handed to Whisper.
    pub n_threads: i32,

    /// Suppress Whisper's progress output to stderr.
    pub suppress_progress: bool,
}

impl Default for TranscribeParams {
    fn default() -> Self {
        Self {
            language: "en".into(),
            n_threads: optimal_threads(),
            suppress_progress: true,
        }
    }
}

/// Physical CPU threads to use for inference, capped at 8 — Whisper sees
/// diminishing returns beyond that.
pub(crate) fn optimal_threads() -> i32 {
    std::thread::available_parallelism()
        .map(|n| n.get().min(8) as i32)
        .unwrap_or(4)
}

// ---------------------------------------------------------------------------
// WhisperTranscriber
// ---------------------------------------------------------------------------

/// Production transcriber wrapping a lazily-loaded `whisper_rs` context.
///
/// # Example
///
/// ```rust,no_run
/// use std::path::Path;
/// use readback::stt::{Transcriber, TranscribeParams, WhisperTranscriber};
///
/// let engine = WhisperTranscriber::new("models/ggml-base.bin", TranscribeParams::default());
/// // The model file is only opened here, on first use.
/// let transcript = engine.transcribe(Path::new("attempt.wav")).unwrap();
/// println!("{}", transcript.into_text());
/// ```
pub struct WhisperTranscriber {
    model_path: PathBuf,
    params: TranscribeParams,
    ctx: OnceLock<WhisperContext>,
}

impl std::fmt::Debug for WhisperTranscriber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhisperTranscriber")
            .field("model_path", &self.model_path)
            .field("params", &self.params)
            .field("loaded", &self.ctx.get().is_some())
            .finish()
    }
}

// `WhisperContext` holds a raw pointer internally but declares
// `unsafe impl Send` and `unsafe impl Sync` in whisper-rs — the model
// weights are read-only after loading. All other fields are plainly owned.
// SAFETY: WhisperContext is Send+Sync as declared by whisper-rs.
unsafe impl Send for WhisperTranscriber {}
unsafe impl Sync for WhisperTranscriber {}

impl WhisperTranscriber {
    /// Create a transcriber for the GGML model at `model_path`.
    ///
    /// No I/O happens here; the model is loaded on the first
    /// [`transcribe`](Transcriber::transcribe) call and kept for the rest of
    /// the process.
    pub fn new(model_path: impl Into<PathBuf>, params: TranscribeParams) -> Self {
        Self {
            model_path: model_path.into(),
            params,
            ctx: OnceLock::new(),
        }
    }

    /// The loaded context, initialising it on first use.
    fn context(&self) -> Result<&WhisperContext, SttError> {
        if let Some(ctx) = self.ctx.get() {
            return Ok(ctx);
        }

        let loaded = Self::load_context(&self.model_path)?;
        log::info!("Whisper model loaded: {}", self.model_path.display());

        // If another thread won the initialisation race, ours is dropped and
        // the winner is returned.
        Ok(self.ctx.get_or_init(|| loaded))
    }

    fn load_context(path: &Path) -> Result<WhisperContext, SttError> {
        if !path.exists() {
            return Err(SttError::ModelNotFound(path.display().to_string()));
        }

        let path_str = path.to_str().ok_or_else(|| {
            SttError::ModelNotFound(format!(
                "model path contains non-UTF-8 characters: {}",
                path.display()
            ))
        })?;

        WhisperContext::new_with_params(path_str, WhisperContextParameters::default())
            .map_err(|e| SttError::ContextInit(e.to_string()))
    }

    /// Run inference on 16 kHz mono f32 samples.
    fn transcribe_samples(&self, audio: &[f32]) -> Result<String, SttError> {
        if audio.len() < MIN_AUDIO_SAMPLES {
            return Err(SttError::AudioTooShort);
        }

        let mut fp = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });

        let lang: Option<&str> = if self.params.language == "auto" {
            None
        } else {
            Some(self.params.language.as_str())
        };
        fp.set_language(lang);
        fp.set_n_threads(self.params.n_threads);

        if self.params.suppress_progress {
            fp.set_print_progress(false);
            fp.set_print_realtime(false);
        }

        let ctx = self.context()?;
        let mut state = ctx
            .create_state()
            .map_err(|e| SttError::ContextInit(e.to_string()))?;

        state
            .full(fp, audio)
            .map_err(|e| SttError::Transcription(e.to_string()))?;

        let n_segments = state
            .full_n_segments()
            .map_err(|e| SttError::Transcription(e.to_string()))?;

        let mut text = String::new();
        for i in 0..n_segments {
            let seg = state
                .full_get_segment_text(i)
                .map_err(|e| SttError::Transcription(format!("segment {i}: {e}")))?;
            text.push_str(&seg);
        }

        Ok(text.trim().to_string())
    }
}

impl Transcriber for WhisperTranscriber {
    fn transcribe(&self, audio: &Path) -> Result<Transcript, SttError> {
        let (samples, rate) = read_wav_mono_f32(audio)
            .map_err(|e| SttError::AudioRead(format!("{}: {e}", audio.display())))?;

        let samples = resample(&samples, rate, WHISPER_SAMPLE_RATE);
        let text = self.transcribe_samples(&samples)?;

        log::debug!("transcribed {}: {:?}", audio.display(), text);
        Ok(Transcript::Text(text))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
