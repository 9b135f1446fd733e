//! Ingestion request and report types.
//!
//! These are the wire shapes the capturing front end submits and receives;
//! they serialize 1:1 to the JSON the serving layer moves around.

use super::ContentHash;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Title used when neither the block nor the batch provides one.
pub const UNTITLED: &str = "Untitled";

/// One raw code block as captured in the browser.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnippetSubmission {
    /// The captured code text.
    pub code: String,
    /// Language the block was highlighted as.
    pub language: String,
    /// Platform the block was captured from (e.g. `discord`, `slack`).
    pub platform: String,
    /// URL of the page the block came from.
    #[serde(default)]
    pub url: String,
    /// Capture timestamp, RFC 3339. Defaults to the ingestion time when
    /// absent.
    #[serde(default)]
    pub timestamp: Option<String>,
    /// Optional per-block title.
    #[serde(default)]
    pub title: Option<String>,
}

impl SnippetSubmission {
    /// Creates a submission with the given code and partition keys.
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        language: impl Into<String>,
        platform: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            language: language.into(),
            platform: platform.into(),
            ..Default::default()
        }
    }

    /// Sets the source URL.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Sets the capture timestamp (RFC 3339).
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    /// Sets the per-block title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Batch-level metadata accompanying a submission.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchMetadata {
    /// Fallback title for blocks that carry none.
    #[serde(default)]
    pub title: Option<String>,
}

/// A batch of captured blocks submitted for ingestion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestRequest {
    /// The captured blocks, processed in submission order.
    #[serde(default)]
    pub blocks: Vec<SnippetSubmission>,
    /// Batch-level metadata.
    #[serde(default)]
    pub metadata: Option<BatchMetadata>,
}

/// A snippet similar to some other snippet, with its score.
#[derive(Debug, Clone, Serialize)]
pub struct SimilarSnippet {
    /// Hash of the similar snippet.
    pub hash: ContentHash,
    /// Similarity ratio in `[threshold, 1.0)`.
    pub score: f64,
    /// Source URL of the similar snippet.
    pub url: String,
    /// Title of the similar snippet.
    pub title: String,
    /// Blob location of the similar snippet.
    pub storage_path: PathBuf,
}

/// Result entry for one newly accepted snippet.
#[derive(Debug, Clone, Serialize)]
pub struct IngestedSnippet {
    /// Content hash of the accepted snippet.
    pub hash: ContentHash,
    /// Where the blob was written.
    pub storage_path: PathBuf,
    /// Near-duplicates found in the snippet's partition at ingestion time.
    pub similar: Vec<SimilarSnippet>,
}

/// Report for one ingestion batch.
///
/// Skipped items (empty, invalid, or already ingested) are omitted from
/// `results`; `saved_count` counts only newly persisted snippets.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestReport {
    /// Number of snippets newly persisted by this batch.
    pub saved_count: usize,
    /// Per-snippet results, in submission order.
    pub results: Vec<IngestedSnippet>,
}
