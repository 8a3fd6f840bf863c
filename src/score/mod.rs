//! Scoring module — fuzzy similarity metrics, baseline scoring, and
//! normalization of pluggable comparator results.
//!
//! ```text
//! similarity  ── ratio / partial_ratio / token_sort_ratio   (pure fns)
//!      │
//! Scorer      ── target + candidate → Metrics               (baseline)
//!      │
//! ResultNormalizer ── Metrics ⊕ Comparator output → Metrics (canonical)
//! ```

pub mod normalize;
pub mod scorer;
pub mod similarity;

// ── Public re-exports ──────────────────────────────────────────────────────

pub use normalize::{Comparator, ComparatorError, ResultNormalizer};
pub use scorer::{
    Aggregation, Metrics, Scorer, ScorerConfig, FAIL_FEEDBACK, PASS_FEEDBACK,
};
