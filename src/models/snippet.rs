//! Snippet types and identifiers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Content hash identifying a snippet.
///
/// The lowercase hex SHA-256 digest of the snippet's trimmed content. Two
/// snippets with identical text are the same logical entity regardless of
/// where they were captured.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHash(String);

impl ContentHash {
    /// Creates a content hash from an existing digest string.
    #[must_use]
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    /// Returns the digest as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the first 8 hex characters, used in blob filenames.
    #[must_use]
    pub fn prefix8(&self) -> &str {
        let end = self.0.len().min(8);
        &self.0[..end]
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ContentHash {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ContentHash {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A stored code snippet.
///
/// Immutable once created; the index never updates or deletes snippet rows.
#[derive(Debug, Clone, Serialize)]
pub struct Snippet {
    /// Content hash; primary identity.
    pub hash: ContentHash,
    /// The snippet text (trimmed at the ingestion boundary).
    pub content: String,
    /// Language partition key.
    pub language: String,
    /// Platform partition key.
    pub platform: String,
    /// URL of the page the snippet was captured from.
    pub source_url: String,
    /// Page or conversation title.
    pub title: String,
    /// When the snippet was captured in the browser.
    pub captured_at: DateTime<Utc>,
    /// Blob file location, assigned once at persistence time.
    pub storage_path: PathBuf,
    /// Insertion timestamp (Unix epoch seconds); drives listing order.
    pub created_at: i64,
}

/// Filter for listing queries.
///
/// # Example
///
/// ```rust
/// use snipstash::QueryFilter;
///
/// let filter = QueryFilter::new().with_language("python").with_limit(10);
/// assert_eq!(filter.language.as_deref(), Some("python"));
/// assert_eq!(filter.limit, 10);
/// ```
#[derive(Debug, Clone)]
pub struct QueryFilter {
    /// Restrict to a platform.
    pub platform: Option<String>,
    /// Restrict to a language.
    pub language: Option<String>,
    /// Only rows inserted strictly after this Unix timestamp (the
    /// watcher's poll predicate).
    pub created_after: Option<i64>,
    /// Maximum number of rows returned.
    pub limit: usize,
}

impl Default for QueryFilter {
    fn default() -> Self {
        Self {
            platform: None,
            language: None,
            created_after: None,
            limit: crate::config::DEFAULT_QUERY_LIMIT,
        }
    }
}

impl QueryFilter {
    /// Creates an unrestricted filter with the default limit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts results to a platform.
    #[must_use]
    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }

    /// Restricts results to a language.
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Restricts results to rows inserted strictly after a timestamp.
    #[must_use]
    pub const fn with_created_after(mut self, timestamp: i64) -> Self {
        self.created_after = Some(timestamp);
        self
    }

    /// Sets the row limit.
    #[must_use]
    pub const fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_hash_prefix() {
        let hash = ContentHash::new("0123456789abcdef0123456789abcdef");
        assert_eq!(hash.prefix8(), "01234567");
    }

    #[test]
    fn test_content_hash_prefix_short_input() {
        let hash = ContentHash::new("abc");
        assert_eq!(hash.prefix8(), "abc");
    }

    #[test]
    fn test_content_hash_display_roundtrip() {
        let hash = ContentHash::from("deadbeef");
        assert_eq!(hash.to_string(), "deadbeef");
        assert_eq!(hash.as_str(), "deadbeef");
    }

    #[test]
    fn test_query_filter_defaults() {
        let filter = QueryFilter::new();
        assert!(filter.platform.is_none());
        assert!(filter.language.is_none());
        assert_eq!(filter.limit, 100);
    }
}
