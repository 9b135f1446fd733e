//! Snippet ingestion pipeline.
//!
//! One logical unit per block: trim → validate → hash → dedup check →
//! similarity scan → blob write → atomic index commit. Items fail
//! individually; nothing a single block does can abort the batch.

use crate::config::StashConfig;
use crate::dedup::{ContentHasher, SimilarityScorer};
use crate::models::{
    ContentHash, IngestReport, IngestRequest, IngestedSnippet, SimilarSnippet, Snippet,
    SnippetSubmission, UNTITLED,
};
use crate::storage::{BlobStore, CorpusIndex, FsBlobStore, SqliteIndex, blob_file_name, partition_dir};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, error, instrument, warn};

/// Service orchestrating snippet ingestion.
///
/// Safe to share across threads; concurrent batches may be submitted
/// simultaneously. Two concurrent submissions of identical content both
/// pass the `exists` check at worst — the index's uniqueness constraint
/// then lets exactly one through and the other is treated as already
/// ingested.
pub struct IngestionService {
    /// Configuration.
    config: StashConfig,
    /// Near-duplicate scorer, configured from the threshold.
    scorer: SimilarityScorer,
    /// Snippet and edge records.
    index: Arc<dyn CorpusIndex>,
    /// On-disk snippet bytes.
    blobs: Arc<dyn BlobStore>,
}

impl IngestionService {
    /// Creates an ingestion service over explicit backends.
    #[must_use]
    pub fn new(config: StashConfig, index: Arc<dyn CorpusIndex>, blobs: Arc<dyn BlobStore>) -> Self {
        let scorer = SimilarityScorer::new(config.similarity_threshold);
        Self {
            config,
            scorer,
            index,
            blobs,
        }
    }

    /// Opens the default backends described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the index database or the blob root cannot be
    /// opened.
    pub fn open(config: StashConfig) -> Result<Self> {
        let index: Arc<dyn CorpusIndex> = Arc::new(SqliteIndex::new(&config.db_path)?);
        let blobs: Arc<dyn BlobStore> = Arc::new(FsBlobStore::new(&config.storage_dir)?);
        Ok(Self::new(config, index, blobs))
    }

    /// Returns the service configuration.
    #[must_use]
    pub const fn config(&self) -> &StashConfig {
        &self.config
    }

    /// Ingests a batch of captured blocks, in submission order.
    ///
    /// Empty, invalid, and already-ingested blocks are skipped and omitted
    /// from the report; `saved_count` counts only newly persisted
    /// snippets.
    #[instrument(skip(self, request), fields(block_count = request.blocks.len()))]
    pub fn ingest(&self, request: IngestRequest) -> IngestReport {
        let batch_title = request.metadata.as_ref().and_then(|m| m.title.clone());

        let mut report = IngestReport::default();
        for block in &request.blocks {
            match self.ingest_block(block, batch_title.as_deref()) {
                Ok(Some(result)) => {
                    metrics::counter!("snippets_ingested_total").increment(1);
                    report.results.push(result);
                },
                Ok(None) => {
                    metrics::counter!("snippets_skipped_total", "reason" => "duplicate_or_empty")
                        .increment(1);
                },
                Err(Error::Validation(reason)) => {
                    metrics::counter!("snippets_skipped_total", "reason" => "invalid").increment(1);
                    warn!(%reason, "skipping invalid block");
                },
                Err(Error::Referential { hash }) => {
                    // The pipeline inserts every edge target it just read
                    // from the index, so this cannot fire unless the store
                    // dropped a row out from under us.
                    metrics::counter!("snippets_skipped_total", "reason" => "referential")
                        .increment(1);
                    error!(%hash, "similarity edge referenced unknown snippet; item dropped");
                },
                Err(e) => {
                    metrics::counter!("snippets_skipped_total", "reason" => "storage").increment(1);
                    warn!(error = %e, "failed to persist block; continuing batch");
                },
            }
        }

        report.saved_count = report.results.len();
        report
    }

    /// Processes one block. `Ok(None)` means a silent skip (empty content
    /// or already ingested).
    fn ingest_block(
        &self,
        block: &SnippetSubmission,
        batch_title: Option<&str>,
    ) -> Result<Option<IngestedSnippet>> {
        let content = block.code.trim();
        if content.is_empty() {
            debug!("skipping block with empty content");
            return Ok(None);
        }

        validate_partition_key(&block.language, "language")?;
        validate_partition_key(&block.platform, "platform")?;
        let captured_at = parse_capture_timestamp(block.timestamp.as_deref())?;

        let hash = ContentHasher::hash(content);
        if self.index.exists(&hash)? {
            debug!(hash = %hash, "content already ingested");
            return Ok(None);
        }

        // Scan the partition before anything is persisted. Candidates read
        // here are a snapshot; a near-duplicate landing concurrently in
        // the same partition may be missed by both sides (accepted gap).
        let candidates = self
            .index
            .find_by_partition(&block.language, &block.platform)?;
        let matches = self.scorer.scan(content, &candidates);

        let title = block
            .title
            .as_deref()
            .or(batch_title)
            .unwrap_or(UNTITLED)
            .to_string();

        let file_name = blob_file_name(&captured_at, &hash, &block.language);
        let storage_path = self.blobs.write(
            &partition_dir(&block.platform, &block.language),
            &file_name,
            content.as_bytes(),
        )?;

        let snippet = Snippet {
            hash: hash.clone(),
            content: content.to_string(),
            language: block.language.clone(),
            platform: block.platform.clone(),
            source_url: block.url.clone(),
            title,
            captured_at,
            storage_path: storage_path.clone(),
            created_at: crate::current_timestamp(),
        };

        let edges: Vec<(ContentHash, f64)> = matches
            .iter()
            .map(|(candidate, score)| (candidate.hash.clone(), *score))
            .collect();

        match self.index.insert_snippet_with_edges(&snippet, &edges) {
            Ok(()) => {},
            Err(Error::Conflict { hash }) => {
                // A concurrent submission of the same content won the
                // race; treat it as already ingested. The blob we wrote is
                // byte-identical to the winner's, so nothing is orphaned.
                debug!(%hash, "concurrent duplicate insert; treating as existing");
                return Ok(None);
            },
            Err(e) => {
                // The blob was written but the index row was not: an
                // orphaned file, left for out-of-band reconciliation.
                warn!(path = %storage_path.display(), "index write failed after blob write; blob orphaned");
                return Err(e);
            },
        }

        let similar = matches
            .into_iter()
            .map(|(candidate, score)| SimilarSnippet {
                hash: candidate.hash.clone(),
                score,
                url: candidate.source_url.clone(),
                title: candidate.title.clone(),
                storage_path: candidate.storage_path.clone(),
            })
            .collect();

        Ok(Some(IngestedSnippet {
            hash,
            storage_path,
            similar,
        }))
    }
}

/// Validates a partition key as a safe path component.
///
/// Partition keys become directory names under the blob root, so anything
/// that could escape or alias a directory is rejected at the boundary.
fn validate_partition_key(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::Validation(format!("{field} must not be empty")));
    }
    if value.contains(['/', '\\', '\0']) || value == "." || value == ".." {
        return Err(Error::Validation(format!(
            "{field} is not a safe path component: {value:?}"
        )));
    }
    Ok(())
}

/// Parses the submitted capture timestamp, defaulting to now when absent.
fn parse_capture_timestamp(timestamp: Option<&str>) -> Result<DateTime<Utc>> {
    timestamp.map_or_else(
        || Ok(Utc::now()),
        |ts| {
            DateTime::parse_from_rfc3339(ts)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| Error::Validation(format!("malformed capture timestamp {ts:?}: {e}")))
        },
    )
}
