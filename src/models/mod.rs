//! Core data types for snippets, similarity edges, and ingestion.

mod ingest;
mod snippet;

pub use ingest::{
    BatchMetadata, IngestReport, IngestRequest, IngestedSnippet, SimilarSnippet, SnippetSubmission,
    UNTITLED,
};
pub use snippet::{ContentHash, QueryFilter, Snippet};
