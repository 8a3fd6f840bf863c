//! Batch mode — evaluate pre-recorded attempts for every prompt.
//!
//! A directory of files named `rec<id>.wav` is mapped onto prompt ids and
//! each file runs through the same orchestrator path as a live attempt.
//! A failure on one prompt is logged, reported in that item's slot, and the
//! batch continues — it never aborts early.

use std::path::{Path, PathBuf};

use crate::store::Prompt;

use super::orchestrator::{EvalError, EvaluationRecord, Evaluator};

/// One discovered (prompt, file) pairing.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchItem {
    pub prompt_id: i64,
    pub audio: PathBuf,
}

/// The per-item outcome of a batch run.
#[derive(Debug)]
pub struct BatchReport {
    pub prompt_id: i64,
    pub audio: PathBuf,
    pub outcome: Result<EvaluationRecord, EvalError>,
}

/// Pair each prompt with `rec<id>.wav` in `dir`, skipping prompts whose
/// file is absent.
pub fn discover_recordings(dir: &Path, prompts: &[Prompt]) -> Vec<BatchItem> {
    prompts
        .iter()
        .filter_map(|prompt| {
            let audio = dir.join(format!("rec{}.wav", prompt.id));
            if audio.exists() {
                Some(BatchItem {
                    prompt_id: prompt.id,
                    audio,
                })
            } else {
                log::debug!("no recording for prompt {} ({})", prompt.id, audio.display());
                None
            }
        })
        .collect()
}

/// Evaluate every item sequentially, isolating per-item failures.
pub fn run_batch(evaluator: &Evaluator<'_>, items: Vec<BatchItem>) -> Vec<BatchReport> {
    items
        .into_iter()
        .map(|item| {
            let outcome = evaluator.evaluate_file(item.prompt_id, &item.audio);
            match &outcome {
                Ok(record) => log::info!(
                    "batch: prompt {} score {} passed {}",
                    item.prompt_id,
                    record.metrics.score,
                    record.metrics.passed
                ),
                Err(e) => log::error!("batch: prompt {} failed: {e}", item.prompt_id),
            }
            BatchReport {
                prompt_id: item.prompt_id,
                audio: item.audio,
                outcome,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
