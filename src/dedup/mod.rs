//! Content hashing and near-duplicate scoring.
//!
//! Two tiers of duplicate detection run at ingestion time:
//! 1. **Exact match**: SHA-256 content hash lookup against the index
//! 2. **Near duplicate**: pairwise similarity ratio against every snippet
//!    in the new snippet's (language, platform) partition
//!
//! The exact tier is the identity check and always wins; the similarity
//! tier only records edges, it never rejects a snippet.

use crate::models::{ContentHash, Snippet};
use crate::text;
use sha2::{Digest, Sha256};

/// Content hasher for snippet identity.
///
/// Produces the SHA-256 digest of the snippet text, hex-encoded. The hash
/// is byte-exact over the trimmed content: code is whitespace- and
/// case-significant, so `print(1)` and `Print(1)` are different snippets.
/// Metadata (platform, title, URL) never participates in the hash.
///
/// # Example
///
/// ```rust
/// use snipstash::ContentHasher;
///
/// let hash = ContentHasher::hash("print(1)");
/// assert_eq!(hash.as_str().len(), 64); // SHA-256 produces 64 hex chars
/// assert_eq!(hash, ContentHasher::hash("print(1)"));
/// ```
pub struct ContentHasher;

impl ContentHasher {
    /// Computes the content hash of a snippet's text.
    ///
    /// Deterministic: identical bytes always produce the same digest, so
    /// re-submitting a snippet always resolves to the same identity.
    #[must_use]
    pub fn hash(content: &str) -> ContentHash {
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        ContentHash::new(hex::encode(hasher.finalize()))
    }
}

/// Threshold-gated pairwise similarity scorer.
///
/// Wraps the character-level [`text::ratio`] and applies the configured
/// near-duplicate window `[threshold, 1.0)`. A score of exactly 1.0 is
/// excluded by design: identical content is deduplicated by hash before
/// the scan ever runs, so a 1.0 here would mean hash-equal content slipped
/// past the exact tier.
#[derive(Debug, Clone)]
pub struct SimilarityScorer {
    threshold: f64,
}

impl SimilarityScorer {
    /// Creates a scorer with the given edge threshold.
    #[must_use]
    pub const fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Returns the configured threshold.
    #[must_use]
    pub const fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Scores a single pair of texts, in `[0, 1]`.
    #[must_use]
    pub fn score(a: &str, b: &str) -> f64 {
        text::ratio(a, b)
    }

    /// Scans `candidates` for near duplicates of `content`.
    ///
    /// Returns the candidates scoring within `[threshold, 1.0)`, with
    /// their scores, in candidate order. Runs one pairwise comparison per
    /// candidate; cost is linear in partition size times comparison cost.
    #[must_use]
    pub fn scan<'a>(&self, content: &str, candidates: &'a [Snippet]) -> Vec<(&'a Snippet, f64)> {
        candidates
            .iter()
            .filter_map(|candidate| {
                let score = Self::score(content, &candidate.content);
                (score >= self.threshold && score < 1.0).then_some((candidate, score))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::path::PathBuf;

    fn snippet(content: &str) -> Snippet {
        Snippet {
            hash: ContentHasher::hash(content),
            content: content.to_string(),
            language: "python".to_string(),
            platform: "discord".to_string(),
            source_url: "https://example.com".to_string(),
            title: "t".to_string(),
            captured_at: Utc::now(),
            storage_path: PathBuf::from("discord/python/x.python"),
            created_at: 0,
        }
    }

    #[test]
    fn test_hash_produces_64_char_hex() {
        let hash = ContentHasher::hash("print(1)");
        assert_eq!(hash.as_str().len(), 64);
        assert!(hash.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_same_content_same_hash() {
        assert_eq!(ContentHasher::hash("print(1)"), ContentHasher::hash("print(1)"));
    }

    #[test]
    fn test_different_content_different_hash() {
        assert_ne!(ContentHasher::hash("print(1)"), ContentHasher::hash("print(2)"));
    }

    #[test]
    fn test_hash_is_whitespace_sensitive() {
        // Indentation is meaning in code; no whitespace normalization.
        assert_ne!(
            ContentHasher::hash("if x:\n    y()"),
            ContentHasher::hash("if x:\n  y()")
        );
    }

    #[test]
    fn test_hash_is_case_sensitive() {
        assert_ne!(ContentHasher::hash("foo()"), ContentHasher::hash("Foo()"));
    }

    #[test]
    fn test_scan_collects_near_duplicates() {
        let scorer = SimilarityScorer::new(0.85);
        let candidates = vec![
            snippet("def hello():\n    print('Hello')"),
            snippet("class Entirely:\n    different = True"),
        ];

        let matches = scorer.scan("def hello():\n    print('Hello!')", &candidates);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].0.hash, candidates[0].hash);
        assert!(matches[0].1 > 0.85);
    }

    #[test]
    fn test_scan_excludes_identical_content() {
        let scorer = SimilarityScorer::new(0.85);
        let candidates = vec![snippet("print(1)")];
        // Identical text scores exactly 1.0, which is outside the window.
        assert!(scorer.scan("print(1)", &candidates).is_empty());
    }

    #[test]
    fn test_scan_respects_threshold() {
        let strict = SimilarityScorer::new(0.999);
        let candidates = vec![snippet("def hello():\n    print('Hello')")];
        assert!(strict.scan("def hello():\n    print('Hello!')", &candidates).is_empty());
    }
}
