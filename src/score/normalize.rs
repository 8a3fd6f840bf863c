//! Result normalization — merges an external comparator's output, whatever
//! its shape, with baseline fuzzy metrics into one canonical [`Metrics`].
//!
//! Deployments may plug in their own comparison function (a grading service,
//! a stricter phraseology checker, …). Nothing about its return shape is
//! guaranteed, so the normalizer classifies the returned JSON value into one
//! of four shapes and merges accordingly:
//!
//! | Shape            | Interpretation                                      |
//! |------------------|-----------------------------------------------------|
//! | object           | overlay known fields onto the baseline              |
//! | bool / integer   | pass flag only                                      |
//! | non-empty array  | `[0]` → pass flag, `[1]` (numeric) → score          |
//! | anything else    | baseline unchanged                                  |
//!
//! The guarantee callers rely on: [`ResultNormalizer::normalize`] always
//! returns a fully-populated record, degrading to the internal scorer when
//! the comparator is absent, fails, or returns something uninterpretable.

use serde_json::Value;
use thiserror::Error;

use super::scorer::{Metrics, Scorer, ScorerConfig};

// ---------------------------------------------------------------------------
// Comparator
// ---------------------------------------------------------------------------

/// A pluggable, externally supplied comparison function.
///
/// Implementations return any JSON value; the normalizer interprets it by
/// shape. Failures of any kind are absorbed — an evaluation is never aborted
/// because a comparator misbehaved.
pub trait Comparator: Send + Sync {
    fn compare(&self, target: &str, candidate: &str) -> Result<Value, ComparatorError>;
}

/// Failure of a pluggable comparator. Always absorbed by the normalizer.
#[derive(Debug, Clone, Error)]
#[error("comparator failed: {0}")]
pub struct ComparatorError(pub String);

// ---------------------------------------------------------------------------
// Shape classification
// ---------------------------------------------------------------------------

/// The recognized return shapes of an external comparator.
enum ExternalShape<'a> {
    /// Mapping with named fields.
    Record(&'a serde_json::Map<String, Value>),
    /// A bare pass/fail flag.
    Flag(bool),
    /// An ordered sequence; first element is the flag, second the score.
    Pair(&'a [Value]),
    /// Anything else — float, string, null, empty array.
    Unrecognized,
}

fn classify(value: &Value) -> ExternalShape<'_> {
    match value {
        Value::Object(map) => ExternalShape::Record(map),
        Value::Bool(b) => ExternalShape::Flag(*b),
        Value::Number(n) if n.is_i64() || n.is_u64() => {
            let nonzero = n
                .as_i64()
                .map(|i| i != 0)
                .or_else(|| n.as_u64().map(|u| u != 0))
                .unwrap_or(false);
            ExternalShape::Flag(nonzero)
        }
        Value::Array(items) if !items.is_empty() => ExternalShape::Pair(items),
        _ => ExternalShape::Unrecognized,
    }
}

// ---------------------------------------------------------------------------
// ResultNormalizer
// ---------------------------------------------------------------------------

/// Produces one canonical [`Metrics`] record per comparison, regardless of
/// what the optional external comparator returns.
///
/// # Example
///
/// ```
/// use readback::score::{ResultNormalizer, ScorerConfig};
///
/// let normalizer = ResultNormalizer::new(ScorerConfig::fallback());
/// let m = normalizer.normalize("cleared to land", "cleared to land", None);
/// assert_eq!(m.score, 100);
/// ```
#[derive(Debug, Clone)]
pub struct ResultNormalizer {
    scorer: Scorer,
}

impl ResultNormalizer {
    pub fn new(config: ScorerConfig) -> Self {
        Self {
            scorer: Scorer::new(config),
        }
    }

    /// Baseline metrics for a pair, as used when no comparator contributes.
    pub fn baseline(&self, target: &str, candidate: &str) -> Metrics {
        self.scorer.score(target, candidate)
    }

    /// Compute baseline metrics, then merge the external comparator's result
    /// over them.
    ///
    /// With `comparator == None` this returns exactly the baseline. A
    /// comparator error or an uninterpretable return shape also yields the
    /// baseline — the similarity sub-fields are never lost.
    pub fn normalize(
        &self,
        target: &str,
        candidate: &str,
        comparator: Option<&dyn Comparator>,
    ) -> Metrics {
        let baseline = self.scorer.score(target, candidate);

        let Some(comparator) = comparator else {
            return baseline;
        };

        match comparator.compare(target, candidate) {
            Ok(value) => merge(baseline, &value),
            Err(e) => {
                log::warn!("external comparator failed, keeping baseline metrics: {e}");
                baseline
            }
        }
    }
}

/// Overlay an external comparator value onto baseline metrics by shape.
fn merge(mut base: Metrics, value: &Value) -> Metrics {
    match classify(value) {
        ExternalShape::Record(map) => {
            overlay_metric(map.get("score"), &mut base.score);
            overlay_metric(map.get("ratio"), &mut base.ratio);
            overlay_metric(map.get("partial"), &mut base.partial);
            overlay_metric(map.get("token_sort"), &mut base.token_sort);

            if let Some(flag) = map.get("passed").and_then(coerce_flag) {
                base.passed = flag;
            }
            if let Some(feedback) = map.get("feedback").and_then(Value::as_str) {
                base.feedback = feedback.to_string();
            }
        }

        ExternalShape::Flag(flag) => {
            base.passed = flag;
        }

        ExternalShape::Pair(items) => {
            // Coercion failure of the first element is swallowed; the
            // baseline verdict stands.
            if let Some(flag) = coerce_flag(&items[0]) {
                base.passed = flag;
            }
            if let Some(score) = items.get(1).and_then(Value::as_f64) {
                base.score = clamp_metric(score);
            }
        }

        ExternalShape::Unrecognized => {}
    }

    base
}

/// Overlay one numeric metric field when present, non-null, and coercible.
fn overlay_metric(value: Option<&Value>, field: &mut u8) {
    if let Some(n) = value.and_then(Value::as_f64) {
        *field = clamp_metric(n);
    }
}

/// Truncate toward zero and clamp into `[0, 100]`.
fn clamp_metric(n: f64) -> u8 {
    n.trunc().clamp(0.0, 100.0) as u8
}

/// Best-effort integer coercion to a pass flag: bools, integers, floats
/// (truncated) and numeric strings all count; anything else is `None`.
fn coerce_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .map(|i| i != 0),
        Value::String(s) => s.trim().parse::<i64>().ok().map(|i| i != 0),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
