//! readback — pronunciation evaluation for radio-phraseology prompts.
//!
//! A speaker is shown (or played) a target sentence, records an attempt, and
//! the pipeline transcribes the recording, scores it against the target with
//! fuzzy string-similarity metrics, and appends the outcome to an evaluation
//! log.
//!
//! # Architecture
//!
//! ```text
//! prompt id
//!    │
//!    ▼
//! Evaluator::evaluate()
//!    ├─ RecordStore::expected_text()          prompt lookup
//!    ├─ Recorder::record()                    mic → temp WAV
//!    ├─ Transcriber::transcribe()             WAV → Transcript
//!    ├─ ResultNormalizer::normalize()         external comparator (optional)
//!    │      └─ Scorer::score()                baseline fuzzy metrics
//!    └─ RecordStore::append()                 append-only history
//! ```
//!
//! The capture, transcription, playback and comparison collaborators all sit
//! behind traits ([`audio::Recorder`], [`stt::Transcriber`], [`tts::Speaker`],
//! [`score::Comparator`]) so the pipeline can be exercised without a
//! microphone, a Whisper model, or a speaker.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use readback::audio::CpalRecorder;
//! use readback::config::AppConfig;
//! use readback::eval::Evaluator;
//! use readback::store::RecordStore;
//! use readback::stt::{TranscribeParams, WhisperTranscriber};
//!
//! let config = AppConfig::default();
//! let store = RecordStore::open("speech_eval.db").unwrap();
//!
//! let transcriber = WhisperTranscriber::new(
//!     "models/ggml-base.bin",
//!     TranscribeParams::default(),
//! );
//!
//! let evaluator = Evaluator::new(
//!     &store,
//!     Arc::new(CpalRecorder::new()),
//!     Arc::new(transcriber),
//!     &config,
//! );
//!
//! let record = evaluator.evaluate(1).unwrap();
//! println!("score {} passed {}", record.metrics.score, record.metrics.passed);
//! ```

pub mod audio;
pub mod cli;
pub mod config;
pub mod eval;
pub mod score;
pub mod store;
pub mod stt;
pub mod tts;
