//! Baseline scoring — turns a target/candidate pair into a [`Metrics`] record.
//!
//! [`Scorer`] is a pure function of its two string inputs and its
//! [`ScorerConfig`]; it never fails. Inputs are normalized (trimmed,
//! lower-cased) before the three similarity metrics are computed, so casing
//! and surrounding whitespace never affect the outcome.

use serde::{Deserialize, Serialize};

use super::similarity;

/// Feedback shown when an attempt passes.
pub const PASS_FEEDBACK: &str = "Good work, keep up!";
/// Feedback shown when an attempt fails.
pub const FAIL_FEEDBACK: &str = "You have to practice more";

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// How the three similarity metrics collapse into one aggregate score.
///
/// The evaluation path and the comparator-fallback path historically used
/// different policies, so both are kept selectable rather than silently
/// unified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    /// Arithmetic mean of the three metrics, rounded down.
    Mean,
    /// Maximum of the three metrics.
    Max,
}

// ---------------------------------------------------------------------------
// ScorerConfig
// ---------------------------------------------------------------------------

/// Aggregation policy and pass threshold for one scoring call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScorerConfig {
    /// Aggregation policy for the derived `score`.
    pub aggregation: Aggregation,
    /// An attempt passes when `score >= pass_threshold`.
    pub pass_threshold: u8,
}

impl Default for ScorerConfig {
    /// The evaluation-path policy: mean aggregation, threshold 80.
    fn default() -> Self {
        Self {
            aggregation: Aggregation::Mean,
            pass_threshold: 80,
        }
    }
}

impl ScorerConfig {
    /// The comparator-fallback policy: max aggregation, threshold 85.
    pub fn fallback() -> Self {
        Self {
            aggregation: Aggregation::Max,
            pass_threshold: 85,
        }
    }
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// The canonical outcome of one target/candidate comparison.
///
/// All similarity fields are bounded to `[0, 100]`; `passed` derives from
/// `score` and the configured threshold, and `feedback` derives solely from
/// `passed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metrics {
    /// Aggregate of the three similarity metrics (policy-dependent).
    pub score: u8,
    /// Whole-string similarity.
    pub ratio: u8,
    /// Best-aligned-substring similarity.
    pub partial: u8,
    /// Token-order-insensitive similarity.
    pub token_sort: u8,
    /// Verdict: `score >= pass_threshold`.
    pub passed: bool,
    /// One of [`PASS_FEEDBACK`] / [`FAIL_FEEDBACK`].
    pub feedback: String,
}

// ---------------------------------------------------------------------------
// Scorer
// ---------------------------------------------------------------------------

/// Computes baseline [`Metrics`] for a target sentence and a transcript.
///
/// # Example
///
/// ```
/// use readback::score::{Scorer, ScorerConfig};
///
/// let scorer = Scorer::new(ScorerConfig::default());
/// let m = scorer.score("Contact ground on 121.9", "contact ground on 121.9  ");
/// assert_eq!(m.score, 100);
/// assert!(m.passed);
/// ```
#[derive(Debug, Clone)]
pub struct Scorer {
    config: ScorerConfig,
}

impl Scorer {
    pub fn new(config: ScorerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> ScorerConfig {
        self.config
    }

    /// Score `candidate` against `target`.
    ///
    /// Never fails; empty or degenerate inputs yield low similarity, not an
    /// error.
    pub fn score(&self, target: &str, candidate: &str) -> Metrics {
        let target = normalize(target);
        let candidate = normalize(candidate);

        let ratio = similarity::ratio(&target, &candidate);
        let partial = similarity::partial_ratio(&target, &candidate);
        let token_sort = similarity::token_sort_ratio(&target, &candidate);

        let score = match self.config.aggregation {
            Aggregation::Mean => {
                ((ratio as u16 + partial as u16 + token_sort as u16) / 3) as u8
            }
            Aggregation::Max => ratio.max(partial).max(token_sort),
        };

        let passed = score >= self.config.pass_threshold;

        Metrics {
            score,
            ratio,
            partial,
            token_sort,
            passed,
            feedback: if passed { PASS_FEEDBACK } else { FAIL_FEEDBACK }.to_string(),
        }
    }
}

/// Trim surrounding whitespace and lower-case.
fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
