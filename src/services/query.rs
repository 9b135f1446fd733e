//! Read-side snippet operations: listing, similarity lookup, and diff.

use crate::models::{ContentHash, QueryFilter, SimilarSnippet, Snippet};
use crate::storage::CorpusIndex;
use crate::text::unified_diff;
use crate::{Error, Result};
use std::sync::Arc;
use tracing::instrument;

/// Service answering queries about stored snippets.
pub struct QueryService {
    /// Snippet and edge records.
    index: Arc<dyn CorpusIndex>,
}

impl QueryService {
    /// Creates a query service over an index.
    #[must_use]
    pub fn new(index: Arc<dyn CorpusIndex>) -> Self {
        Self { index }
    }

    /// Lists stored snippets, newest first, per the filter.
    ///
    /// # Errors
    ///
    /// Returns an error if the index query fails.
    #[instrument(skip(self, filter), fields(limit = filter.limit))]
    pub fn list(&self, filter: &QueryFilter) -> Result<Vec<Snippet>> {
        self.index.query(filter)
    }

    /// Returns snippets similar to `hash`, descending by score.
    ///
    /// Only edges recorded at `hash`'s own ingestion are returned; an
    /// earlier snippet never lists later near-duplicates. An unknown hash
    /// yields an empty list — whether that becomes a 404 is the serving
    /// layer's policy, not ours.
    ///
    /// # Errors
    ///
    /// Returns an error if the index query fails.
    #[instrument(skip(self), fields(snippet.hash = %hash.as_str()))]
    pub fn similar(&self, hash: &ContentHash) -> Result<Vec<SimilarSnippet>> {
        let edges = self.index.find_edges_for(hash)?;
        Ok(edges
            .into_iter()
            .map(|(snippet, score)| SimilarSnippet {
                hash: snippet.hash,
                score,
                url: snippet.source_url,
                title: snippet.title,
                storage_path: snippet.storage_path,
            })
            .collect())
    }

    /// Renders a unified diff between two stored snippets.
    ///
    /// # Errors
    ///
    /// Returns [`NotFound`](crate::Error::NotFound) if either hash is not
    /// stored.
    #[instrument(skip(self), fields(from = %hash.as_str(), to = %other.as_str()))]
    pub fn diff(&self, hash: &ContentHash, other: &ContentHash) -> Result<String> {
        let from = self.fetch(hash)?;
        let to = self.fetch(other)?;

        Ok(unified_diff(
            &from.content,
            &to.content,
            &format!("block_{}", from.hash.prefix8()),
            &format!("block_{}", to.hash.prefix8()),
        ))
    }

    fn fetch(&self, hash: &ContentHash) -> Result<Snippet> {
        self.index.get(hash)?.ok_or_else(|| Error::NotFound {
            hash: hash.as_str().to_string(),
        })
    }
}
