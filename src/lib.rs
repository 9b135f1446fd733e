//! # Snipstash
//!
//! A capture store for code snippets collected from browsing sessions.
//!
//! Snipstash ingests raw snippet batches, deduplicates them by content hash,
//! persists each accepted snippet as a file and as a row in a `SQLite` index,
//! and records near-duplicate relationships discovered by a textual
//! similarity scan scoped to the snippet's (language, platform) partition.
//!
//! ## Features
//!
//! - Content-addressed identity (SHA-256 of the trimmed snippet text)
//! - Brute-force near-duplicate detection with a configurable threshold
//! - Atomic snippet + similarity-edge commits in a single transaction
//! - Write-once blob files laid out by platform and language
//! - Unified-diff rendering between any two stored snippets
//!
//! ## Example
//!
//! ```rust,ignore
//! use snipstash::{IngestRequest, IngestionService, SnippetSubmission};
//!
//! let service = IngestionService::new(config, index, blobs);
//! let report = service.ingest(IngestRequest {
//!     blocks: vec![block],
//!     metadata: None,
//! });
//! println!("saved {}", report.saved_count);
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
// multiple_crate_versions is inherently crate-level (detects duplicate transitive dependencies).
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

// Module declarations
pub mod config;
pub mod dedup;
pub mod models;
pub mod observability;
pub mod services;
pub mod storage;
pub mod text;

// Re-exports for convenience
pub use config::StashConfig;
pub use dedup::{ContentHasher, SimilarityScorer};
pub use models::{
    BatchMetadata, ContentHash, IngestReport, IngestRequest, IngestedSnippet, QueryFilter,
    SimilarSnippet, Snippet, SnippetSubmission,
};
pub use services::{IngestionService, QueryService, SnippetWatcher, WatcherHandle};
pub use storage::{BlobStore, CorpusIndex, FsBlobStore, SqliteIndex};

/// Error type for snipstash operations.
///
/// Uses `thiserror` for automatic `Display` and `Error` trait implementations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `Validation` | Empty content, unsafe partition key, malformed timestamp |
/// | `Conflict` | Inserting a snippet whose hash already exists in the index |
/// | `Referential` | A similarity edge references a hash the index does not know |
/// | `NotFound` | Lookup or diff against a hash that is not stored |
/// | `Storage` | `SQLite` or filesystem operations fail |
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid input was provided.
    ///
    /// Raised when:
    /// - Snippet content is empty after trimming
    /// - A language or platform value is not a safe path component
    /// - A capture timestamp cannot be parsed as RFC 3339
    ///
    /// Validation failures skip the offending batch item; they are never
    /// fatal to the batch.
    #[error("invalid snippet: {0}")]
    Validation(String),

    /// A snippet with this content hash already exists.
    ///
    /// Raised by the index when the `snippets` primary key rejects an
    /// insert. The pipeline treats this as "already ingested" and skips
    /// the item, so callers should not normally observe it.
    #[error("snippet already exists: {hash}")]
    Conflict {
        /// The conflicting content hash.
        hash: String,
    },

    /// A similarity edge references an unknown snippet.
    ///
    /// Raised when an edge's source or target hash has no snippet row.
    /// Given the pipeline ordering this is a defensive invariant; if it
    /// fires, something upstream dropped a snippet insert.
    #[error("similarity edge references unknown snippet: {hash}")]
    Referential {
        /// The unknown hash the edge referenced.
        hash: String,
    },

    /// A requested snippet is not stored.
    ///
    /// Raised when:
    /// - `diff` is asked about a hash with no snippet row
    /// - A caller fetches a snippet that was never ingested
    #[error("snippet not found: {hash}")]
    NotFound {
        /// The hash that was requested.
        hash: String,
    },

    /// A storage operation failed.
    ///
    /// Raised when:
    /// - `SQLite` statements fail to prepare, execute, or commit
    /// - Blob files or their directories cannot be written
    ///
    /// Storage failures are fatal for the item being processed; the rest
    /// of the batch continues.
    #[error("storage operation '{operation}' failed: {cause}")]
    Storage {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },
}

/// Result type alias for snipstash operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Returns the current Unix timestamp in seconds.
///
/// Centralized so insertion timestamps are produced the same way
/// everywhere. Falls back to 0 if the system clock is before the epoch.
///
/// # Examples
///
/// ```rust
/// use snipstash::current_timestamp;
///
/// let ts = current_timestamp();
/// assert!(ts > 0);
/// ```
#[must_use]
pub fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
