//! Text comparison primitives: sequence matching, similarity ratio, and
//! unified-diff rendering.
//!
//! Everything here is deterministic and allocation-bounded by the input
//! size; the same matcher drives both the similarity ratio and the diff
//! output, so the two views of "how different are these snippets" always
//! agree.

mod diff;
mod matcher;

pub use diff::unified_diff;
pub use matcher::{MatchingBlock, Opcode, SequenceMatcher, Tag};

/// Character-level similarity ratio between two strings, in `[0, 1]`.
///
/// Identical strings score exactly 1.0. See [`SequenceMatcher::ratio`]
/// for the definition.
///
/// # Example
///
/// ```rust
/// use snipstash::text::ratio;
///
/// assert!((ratio("print(1)", "print(1)") - 1.0).abs() < f64::EPSILON);
/// assert!(ratio("print(1)", "print(2)") < 1.0);
/// ```
#[must_use]
pub fn ratio(a: &str, b: &str) -> f64 {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    SequenceMatcher::new(&a_chars, &b_chars).ratio()
}
