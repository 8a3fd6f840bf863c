//! Evaluation orchestrator — drives one prompt through the full pipeline.
//!
//! [`Evaluator`] owns nothing but seams: prompt lookup and persistence go
//! through [`RecordStore`], capture through [`Recorder`], speech-to-text
//! through [`Transcriber`], and comparison through the
//! [`ResultNormalizer`] with an optional pluggable [`Comparator`].
//!
//! # Pipeline flow
//!
//! ```text
//! evaluate(prompt_id)
//!   ├─ expected_text(prompt_id)        absent → PromptNotFound, nothing persisted
//!   ├─ record()                        mic → temp WAV (caller owns the file)
//!   ├─ transcribe(path)                failure → Transcription error
//!   │    └─ Transcript::into_text()    structured results reduced defensively
//!   ├─ normalize(target, text, cmp)    comparator failures absorbed, never fatal
//!   ├─ append(record)                  failure → Store error (record lost)
//!   └─ EvaluationRecord
//! ```
//!
//! `evaluate` is synchronous and blocking; callers that need a responsive
//! surface run it on their own worker thread. There is no mid-pipeline
//! cancellation — an attempt either completes (including persistence) or
//! returns an error.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::audio::{CaptureError, Recorder};
use crate::config::AppConfig;
use crate::score::{Comparator, Metrics, ResultNormalizer};
use crate::store::{NewRecording, RecordStore, StoreError};
use crate::stt::{SttError, Transcriber};

// ---------------------------------------------------------------------------
// EvalError
// ---------------------------------------------------------------------------

/// Failure of one evaluation attempt.
///
/// Every variant maps onto a stable machine-readable tag via
/// [`EvalError::tag`], so callers can emit structured outcomes instead of
/// free-form crashes.
#[derive(Debug, Error)]
pub enum EvalError {
    /// The prompt id does not exist. Nothing was captured or persisted.
    #[error("prompt {0} not found")]
    PromptNotFound(i64),

    /// Audio capture failed; the attempt is aborted.
    #[error("audio capture failed: {0}")]
    Capture(#[from] CaptureError),

    /// The sample could not be transcribed; the attempt is aborted.
    #[error("could not transcribe: {0}")]
    Transcription(#[from] SttError),

    /// Persisting the completed record failed; the record is lost.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl EvalError {
    /// Stable tag for the machine-parseable result object.
    pub fn tag(&self) -> &'static str {
        match self {
            EvalError::PromptNotFound(_) => "prompt_not_found",
            EvalError::Capture(_) => "capture_failed",
            EvalError::Transcription(_) => "transcription_failed",
            EvalError::Store(_) => "store_failed",
        }
    }
}

// ---------------------------------------------------------------------------
// EvaluationRecord
// ---------------------------------------------------------------------------

/// The completed outcome of one evaluation attempt, as returned to the
/// caller and (minus the prompt text) persisted to the log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationRecord {
    pub prompt_id: i64,
    /// Location of the captured audio artifact. The pipeline's caller owns
    /// the file and removes it when no longer needed.
    pub audio_path: String,
    pub prompt_text: String,
    pub recognized_text: String,
    #[serde(flatten)]
    pub metrics: Metrics,
}

// ---------------------------------------------------------------------------
// Evaluator
// ---------------------------------------------------------------------------

/// Drives the capture → transcribe → compare → persist sequence.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use readback::audio::CpalRecorder;
/// use readback::config::AppConfig;
/// use readback::eval::Evaluator;
/// use readback::store::RecordStore;
/// use readback::stt::{TranscribeParams, WhisperTranscriber};
///
/// let config = AppConfig::default();
/// let store = RecordStore::open(config.database_path()).unwrap();
/// let evaluator = Evaluator::new(
///     &store,
///     Arc::new(CpalRecorder::new()),
///     Arc::new(WhisperTranscriber::new(config.model_path(), TranscribeParams::default())),
///     &config,
/// );
/// match evaluator.evaluate(1) {
///     Ok(record) => println!("score {}", record.metrics.score),
///     Err(e) => eprintln!("{}: {e}", e.tag()),
/// }
/// ```
pub struct Evaluator<'s> {
    store: &'s RecordStore,
    recorder: Arc<dyn Recorder>,
    transcriber: Arc<dyn Transcriber>,
    comparator: Option<Arc<dyn Comparator>>,
    normalizer: ResultNormalizer,
    record_secs: u32,
    sample_rate: u32,
}

impl<'s> Evaluator<'s> {
    pub fn new(
        store: &'s RecordStore,
        recorder: Arc<dyn Recorder>,
        transcriber: Arc<dyn Transcriber>,
        config: &AppConfig,
    ) -> Self {
        Self {
            store,
            recorder,
            transcriber,
            comparator: None,
            normalizer: ResultNormalizer::new(config.scoring.fallback()),
            record_secs: config.audio.record_secs,
            sample_rate: config.audio.sample_rate,
        }
    }

    /// Install a pluggable comparator. Its output is merged over the
    /// baseline metrics; its failures are absorbed.
    pub fn with_comparator(mut self, comparator: Arc<dyn Comparator>) -> Self {
        self.comparator = Some(comparator);
        self
    }

    /// Record one live attempt for `prompt_id` and evaluate it.
    pub fn evaluate(&self, prompt_id: i64) -> Result<EvaluationRecord, EvalError> {
        let expected = self.lookup(prompt_id)?;
        let sample = self.recorder.record(self.record_secs, self.sample_rate)?;
        self.evaluate_sample(prompt_id, &expected, &sample.path)
    }

    /// Evaluate a pre-recorded attempt for `prompt_id` (batch mode).
    pub fn evaluate_file(
        &self,
        prompt_id: i64,
        audio: &Path,
    ) -> Result<EvaluationRecord, EvalError> {
        let expected = self.lookup(prompt_id)?;
        self.evaluate_sample(prompt_id, &expected, audio)
    }

    fn lookup(&self, prompt_id: i64) -> Result<String, EvalError> {
        self.store
            .expected_text(prompt_id)?
            .ok_or(EvalError::PromptNotFound(prompt_id))
    }

    fn evaluate_sample(
        &self,
        prompt_id: i64,
        expected: &str,
        audio: &Path,
    ) -> Result<EvaluationRecord, EvalError> {
        let transcript = self.transcriber.transcribe(audio)?;
        let recognized = transcript.into_text();
        log::debug!("prompt {prompt_id}: recognized {recognized:?}");

        let metrics =
            self.normalizer
                .normalize(expected, &recognized, self.comparator.as_deref());

        let row = NewRecording {
            prompt_id,
            file_path: audio.display().to_string(),
            recognized_text: recognized.clone(),
            metrics: metrics.clone(),
        };
        self.store.append(&row)?;

        log::info!(
            "prompt {prompt_id}: score {} passed {}",
            metrics.score,
            metrics.passed
        );

        Ok(EvaluationRecord {
            prompt_id,
            audio_path: row.file_path,
            prompt_text: expected.to_string(),
            recognized_text: recognized,
            metrics,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::MockRecorder;
    use crate::score::{ComparatorError, PASS_FEEDBACK};
    use crate::store::DEFAULT_PROMPTS;
    use crate::stt::{MockTranscriber, SttError, Transcriber};
    use serde_json::{json, Value};

    const CLIMB: &str = "Climb and maintain flight level 350.";

    fn seeded_store() -> RecordStore {
        let store = RecordStore::open_in_memory().unwrap();
        store.seed_prompts(&DEFAULT_PROMPTS).unwrap();
        store
    }

    fn evaluator<'s>(store: &'s RecordStore, transcriber: Arc<dyn Transcriber>) -> Evaluator<'s> {
        Evaluator::new(
            store,
            Arc::new(MockRecorder::ok("/tmp/attempt.wav")),
            transcriber,
            &AppConfig::default(),
        )
    }

    // -----------------------------------------------------------------------
    // Test doubles
    // -----------------------------------------------------------------------

    /// Comparator returning a fixed JSON value.
    struct FixedComparator(Value);

    impl Comparator for FixedComparator {
        fn compare(&self, _t: &str, _c: &str) -> Result<Value, ComparatorError> {
            Ok(self.0.clone())
        }
    }

    /// Comparator that always fails.
    struct BrokenComparator;

    impl Comparator for BrokenComparator {
        fn compare(&self, _t: &str, _c: &str) -> Result<Value, ComparatorError> {
            Err(ComparatorError("backend unreachable".into()))
        }
    }

    // -----------------------------------------------------------------------
    // Happy path
    // -----------------------------------------------------------------------

    /// A verbatim readback scores 100, passes, and is persisted.
    #[test]
    fn verbatim_readback_is_a_perfect_pass() {
        let store = seeded_store();
        let ev = evaluator(&store, Arc::new(MockTranscriber::text(CLIMB)));

        let record = ev.evaluate(2).unwrap();

        assert_eq!(record.prompt_id, 2);
        assert_eq!(record.prompt_text, CLIMB);
        assert_eq!(record.audio_path, "/tmp/attempt.wav");
        assert_eq!(record.metrics.score, 100);
        assert!(record.metrics.passed);
        assert_eq!(record.metrics.feedback, PASS_FEEDBACK);

        // Persisted exactly once, fields matching the returned record.
        let stored = store.recordings_for_prompt(2).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].recognized_text, CLIMB);
        assert_eq!(stored[0].metrics, record.metrics);
        assert_eq!(stored[0].file_path, record.audio_path);
    }

    /// A near-miss readback keeps all three metrics high.
    #[test]
    fn near_miss_readback_metrics() {
        let store = seeded_store();
        let ev = evaluator(
            &store,
            Arc::new(MockTranscriber::text("climb in maintain light level 350")),
        );

        let record = ev.evaluate(2).unwrap();
        assert!(record.metrics.ratio >= 70);
        assert!(record.metrics.partial >= 70);
        assert!(record.metrics.token_sort >= 70);
        assert_eq!(record.metrics.ratio, 93);
        assert_eq!(record.metrics.partial, 91);
        assert_eq!(record.metrics.token_sort, 76);
    }

    // -----------------------------------------------------------------------
    // Prompt lookup
    // -----------------------------------------------------------------------

    /// Unknown prompt id: structured outcome, nothing captured or persisted.
    #[test]
    fn unknown_prompt_persists_nothing() {
        let store = seeded_store();
        let before = store.recording_count().unwrap();

        let ev = evaluator(&store, Arc::new(MockTranscriber::text("anything")));
        let err = ev.evaluate(999).unwrap_err();

        assert!(matches!(err, EvalError::PromptNotFound(999)));
        assert_eq!(err.tag(), "prompt_not_found");
        assert_eq!(store.recording_count().unwrap(), before);
    }

    // -----------------------------------------------------------------------
    // Transcript handling
    // -----------------------------------------------------------------------

    /// Structured transcription results are reduced to their text field.
    #[test]
    fn structured_transcript_text_is_extracted() {
        let store = seeded_store();
        let ev = evaluator(
            &store,
            Arc::new(MockTranscriber::structured(json!({
                "text": CLIMB,
                "language": "en",
            }))),
        );

        let record = ev.evaluate(2).unwrap();
        assert_eq!(record.recognized_text, CLIMB);
        assert_eq!(record.metrics.score, 100);
    }

    /// Transcription failure aborts the attempt without persisting.
    #[test]
    fn transcription_failure_aborts_without_persisting() {
        let store = seeded_store();
        let ev = evaluator(
            &store,
            Arc::new(MockTranscriber::err(SttError::Transcription("oom".into()))),
        );

        let err = ev.evaluate(2).unwrap_err();
        assert_eq!(err.tag(), "transcription_failed");
        assert_eq!(store.recording_count().unwrap(), 0);
    }

    /// Capture failure aborts the attempt without persisting.
    #[test]
    fn capture_failure_aborts_without_persisting() {
        let store = seeded_store();
        let ev = Evaluator::new(
            &store,
            Arc::new(MockRecorder::no_device()),
            Arc::new(MockTranscriber::text("unused")),
            &AppConfig::default(),
        );

        let err = ev.evaluate(2).unwrap_err();
        assert_eq!(err.tag(), "capture_failed");
        assert_eq!(store.recording_count().unwrap(), 0);
    }

    // -----------------------------------------------------------------------
    // Pluggable comparator
    // -----------------------------------------------------------------------

    /// A mapping-shaped comparator verdict overrides `passed` while the
    /// baseline similarity fields survive into the persisted record.
    #[test]
    fn comparator_verdict_overlays_baseline() {
        let store = seeded_store();
        let ev = evaluator(&store, Arc::new(MockTranscriber::text("totally wrong words")))
            .with_comparator(Arc::new(FixedComparator(json!({ "passed": 1 }))));

        let record = ev.evaluate(2).unwrap();
        assert!(record.metrics.passed);
        // Baseline similarity of disjoint texts stays low.
        assert!(record.metrics.ratio < 50);

        let stored = store.recordings_for_prompt(2).unwrap();
        assert!(stored[0].metrics.passed);
    }

    /// A failing comparator never aborts the evaluation.
    #[test]
    fn broken_comparator_still_completes_evaluation() {
        let store = seeded_store();
        let ev = evaluator(&store, Arc::new(MockTranscriber::text(CLIMB)))
            .with_comparator(Arc::new(BrokenComparator));

        let record = ev.evaluate(2).unwrap();
        assert_eq!(record.metrics.score, 100);
        assert_eq!(store.recording_count().unwrap(), 1);
    }

    // -----------------------------------------------------------------------
    // Serialization
    // -----------------------------------------------------------------------

    /// The result object carries all outcome fields at the top level.
    #[test]
    fn record_serializes_flat() {
        let store = seeded_store();
        let ev = evaluator(&store, Arc::new(MockTranscriber::text(CLIMB)));

        let record = ev.evaluate(2).unwrap();
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["prompt_id"], 2);
        assert_eq!(value["prompt_text"], CLIMB);
        assert_eq!(value["score"], 100);
        assert_eq!(value["ratio"], 100);
        assert_eq!(value["partial"], 100);
        assert_eq!(value["token_sort"], 100);
        assert_eq!(value["passed"], true);
        assert_eq!(value["feedback"], PASS_FEEDBACK);
    }
}
