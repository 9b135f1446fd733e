//! Storage backend traits.
//!
//! The index and the blob store are the two halves of persistence: the
//! index owns snippet records and similarity edges, the blob store owns the
//! on-disk byte content. Both are object-safe and shared via
//! `Arc<dyn ...>`, so implementations use `&self` with interior mutability.
//!
//! Keeping candidate enumeration (`find_by_partition`) behind this trait is
//! what allows the brute-force similarity scan to be replaced by an indexed
//! approximate structure later without touching the pipeline contract.

use crate::Result;
use crate::models::{ContentHash, QueryFilter, Snippet};
use std::path::{Path, PathBuf};

/// Trait for the relational snippet index.
///
/// # Implementor Notes
///
/// - Methods use `&self` to enable sharing via `Arc<dyn CorpusIndex>`
/// - Hash uniqueness must be enforced by the store itself (a hard
///   invariant), not merely by callers checking [`exists`](Self::exists)
///   first — concurrent duplicate inserts must collapse to one row plus a
///   [`Conflict`](crate::Error::Conflict) for the loser
/// - [`insert_snippet_with_edges`](Self::insert_snippet_with_edges) must be
///   atomic: a crash leaves either the snippet with all its edges or
///   nothing
pub trait CorpusIndex: Send + Sync {
    /// Checks whether a snippet with this hash is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    fn exists(&self, hash: &ContentHash) -> Result<bool>;

    /// Inserts a snippet record.
    ///
    /// # Errors
    ///
    /// Returns [`Conflict`](crate::Error::Conflict) if the hash already
    /// exists, or a storage error if the insert fails.
    fn insert_snippet(&self, snippet: &Snippet) -> Result<()>;

    /// Records similarity edges from `source` to existing snippets.
    ///
    /// # Errors
    ///
    /// Returns [`Referential`](crate::Error::Referential) if `source` or
    /// any target hash is unknown to the index.
    fn insert_edges(&self, source: &ContentHash, edges: &[(ContentHash, f64)]) -> Result<()>;

    /// Inserts a snippet and its edges as one atomic unit.
    ///
    /// This is what the ingestion pipeline calls: the snippet row and all
    /// of its edge rows commit together or not at all.
    ///
    /// # Errors
    ///
    /// Same error contract as [`insert_snippet`](Self::insert_snippet) and
    /// [`insert_edges`](Self::insert_edges); on any failure nothing is
    /// persisted.
    fn insert_snippet_with_edges(
        &self,
        snippet: &Snippet,
        edges: &[(ContentHash, f64)],
    ) -> Result<()>;

    /// Retrieves a snippet by hash.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    fn get(&self, hash: &ContentHash) -> Result<Option<Snippet>>;

    /// Returns every snippet in a (language, platform) partition.
    ///
    /// Used to enumerate similarity-scan candidates; ordering is not
    /// significant to correctness.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn find_by_partition(&self, language: &str, platform: &str) -> Result<Vec<Snippet>>;

    /// Returns the snippets `hash` recorded edges to, with scores,
    /// descending by score.
    ///
    /// An unknown hash yields an empty list, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn find_edges_for(&self, hash: &ContentHash) -> Result<Vec<(Snippet, f64)>>;

    /// Lists snippets matching `filter`, newest first by insertion time,
    /// bounded by the filter's limit.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn query(&self, filter: &QueryFilter) -> Result<Vec<Snippet>>;

    /// Returns the total number of stored snippets.
    ///
    /// # Errors
    ///
    /// Returns an error if the count fails.
    fn count(&self) -> Result<usize> {
        Ok(self.query(&QueryFilter::new().with_limit(usize::MAX))?.len())
    }
}

/// Trait for write-once blob persistence.
///
/// Blob stores own the on-disk bytes of accepted snippets. There is no
/// update or delete: a blob, once written, is never touched again.
pub trait BlobStore: Send + Sync {
    /// Writes `bytes` to `relative_dir/file_name` under the store root,
    /// creating intermediate directories as needed, and returns the full
    /// path.
    ///
    /// Directory creation is idempotent; writing the same (dir, name) pair
    /// twice rewrites identical content, since the name embeds the content
    /// hash prefix.
    ///
    /// # Errors
    ///
    /// Returns a storage error if directories cannot be created or the
    /// file cannot be written.
    fn write(&self, relative_dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf>;
}
