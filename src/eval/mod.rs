//! Evaluation module — the orchestrator that turns one prompt id into a
//! persisted, fully-populated scoring record, plus the sequential batch
//! runner over pre-recorded files.
//!
//! # Architecture
//!
//! ```text
//! prompt id ──▶ Evaluator::evaluate()
//!                 ├─ RecordStore      (lookup + append)
//!                 ├─ Recorder         (mic → temp WAV)
//!                 ├─ Transcriber      (WAV → Transcript)
//!                 └─ ResultNormalizer (baseline ⊕ pluggable comparator)
//!
//! batch dir ──▶ discover_recordings() ──▶ run_batch()  (per-item isolation)
//! ```

pub mod batch;
pub mod orchestrator;

// ── Public re-exports ──────────────────────────────────────────────────────

pub use batch::{discover_recordings, run_batch, BatchItem, BatchReport};
pub use orchestrator::{EvalError, EvaluationRecord, Evaluator};
