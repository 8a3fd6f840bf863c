//! Fuzzy string-similarity metrics.
//!
//! Three related measures, each returning an integer in `[0, 100]`:
//!
//! * [`ratio`] — whole-string similarity based on the insert/delete edit
//!   distance (equivalently, the longest common subsequence).
//! * [`partial_ratio`] — the best [`ratio`] between the shorter string and
//!   any equally-long character window of the longer string, so a correct
//!   phrase embedded in extra speech still scores high.
//! * [`token_sort_ratio`] — [`ratio`] after lower-casing, stripping
//!   punctuation and sorting the words, so word order does not matter.
//!
//! All three treat an empty input as having no similarity (0) rather than
//! erroring, so callers never need to special-case degenerate transcripts.

/// Longest common subsequence length between two char slices.
///
/// Two-row dynamic program; O(len(a) · len(b)) time, O(len(b)) space.
fn lcs_len(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let mut prev = vec![0usize; b.len() + 1];
    let mut cur = vec![0usize; b.len() + 1];

    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            cur[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(cur[j])
            };
        }
        std::mem::swap(&mut prev, &mut cur);
    }

    prev[b.len()]
}

/// Similarity of two char slices in `[0, 100]`.
///
/// `round(200 · lcs / (len(a) + len(b)))` — 100 means identical, 0 means no
/// characters in common (or either side empty).
fn char_ratio(a: &[char], b: &[char]) -> u8 {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let matched = lcs_len(a, b);
    let total = a.len() + b.len();
    ((200 * matched) as f64 / total as f64).round() as u8
}

/// Whole-string similarity in `[0, 100]`.
///
/// # Example
///
/// ```
/// use readback::score::similarity::ratio;
///
/// assert_eq!(ratio("contact ground", "contact ground"), 100);
/// assert_eq!(ratio("anything", ""), 0);
/// ```
pub fn ratio(a: &str, b: &str) -> u8 {
    let ca: Vec<char> = a.chars().collect();
    let cb: Vec<char> = b.chars().collect();
    char_ratio(&ca, &cb)
}

/// Best-aligned-substring similarity in `[0, 100]`.
///
/// Slides a window the length of the shorter string across the longer one
/// and returns the best [`ratio`] over all windows. A target sentence spoken
/// verbatim inside a longer utterance therefore scores 100.
pub fn partial_ratio(a: &str, b: &str) -> u8 {
    let ca: Vec<char> = a.chars().collect();
    let cb: Vec<char> = b.chars().collect();

    if ca.is_empty() || cb.is_empty() {
        return 0;
    }

    let (short, long) = if ca.len() <= cb.len() {
        (&ca, &cb)
    } else {
        (&cb, &ca)
    };

    let mut best = 0u8;
    for window in long.windows(short.len()) {
        best = best.max(char_ratio(short, window));
        if best == 100 {
            break;
        }
    }
    best
}

/// Token-order-insensitive similarity in `[0, 100]`.
///
/// Both inputs are lower-cased, every non-alphanumeric character becomes a
/// space, and the resulting words are sorted before comparing, so
/// `"runway 18 tower"` and `"Tower runway 18."` are a perfect match.
pub fn token_sort_ratio(a: &str, b: &str) -> u8 {
    ratio(&sorted_tokens(a), &sorted_tokens(b))
}

/// Lower-case, strip punctuation to spaces, sort words, re-join.
fn sorted_tokens(s: &str) -> String {
    let cleaned: String = s
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();

    let mut tokens: Vec<&str> = cleaned.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
