//! Ingestion pipeline integration tests.
//!
//! Exercises the full flow against real backends (`SQLite` file + blob
//! directory in a temp dir): dedup by content hash, partition-scoped
//! near-duplicate edges with directionality, diff rendering, listing
//! queries, and concurrent submission of identical content.

// Integration tests use expect/unwrap for simplicity - panics are acceptable in tests
#![allow(clippy::expect_used, clippy::unwrap_used)]

use snipstash::{
    ContentHash, ContentHasher, Error, IngestRequest, IngestionService, QueryFilter, QueryService,
    SnippetSubmission, StashConfig,
};
use std::sync::Arc;
use tempfile::TempDir;

// ============================================================================
// Test Helpers
// ============================================================================

/// Creates an ingestion service backed by a temp dir.
fn create_service(temp_dir: &TempDir) -> IngestionService {
    let config = StashConfig::default()
        .with_storage_dir(temp_dir.path().join("blobs"))
        .with_db_path(temp_dir.path().join("index.db"));
    IngestionService::open(config).expect("Failed to open ingestion service")
}

/// Creates a query service sharing the same index as `create_service`.
fn create_query_service(temp_dir: &TempDir) -> QueryService {
    let index = snipstash::SqliteIndex::new(temp_dir.path().join("index.db"))
        .expect("Failed to open index");
    QueryService::new(Arc::new(index))
}

fn python_block(code: &str) -> SnippetSubmission {
    SnippetSubmission::new(code, "python", "discord")
        .with_url("https://discord.com/channels/42")
        .with_timestamp("2024-03-01T12:00:00Z")
}

fn batch(blocks: Vec<SnippetSubmission>) -> IngestRequest {
    IngestRequest {
        blocks,
        metadata: None,
    }
}

// ============================================================================
// Dedup Tests
// ============================================================================

/// Test: identical content submitted twice saves once
///
/// `saved_count` is 1 for the first call and 0 for the second; the second
/// call's item is omitted from results entirely.
#[test]
fn test_identical_content_saves_once() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let service = create_service(&temp_dir);

    let first = service.ingest(batch(vec![python_block("print(1)")]));
    assert_eq!(first.saved_count, 1);

    let second = service.ingest(batch(vec![python_block("print(1)")]));
    assert_eq!(second.saved_count, 0);
    assert!(second.results.is_empty());
}

/// Test: metadata does not participate in identity
///
/// The same code under a different platform and title is the same logical
/// snippet.
#[test]
fn test_dedup_ignores_metadata() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let service = create_service(&temp_dir);

    service.ingest(batch(vec![python_block("print(1)")]));

    let other_metadata = SnippetSubmission::new("print(1)", "python", "slack")
        .with_title("completely different context")
        .with_timestamp("2025-06-01T00:00:00Z");
    let report = service.ingest(batch(vec![other_metadata]));
    assert_eq!(report.saved_count, 0);
}

/// Test: a batch mixing new and known content saves only the new items
#[test]
fn test_mixed_batch_partial_save() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let service = create_service(&temp_dir);

    service.ingest(batch(vec![python_block("a = 1")]));
    let report = service.ingest(batch(vec![
        python_block("a = 1"),
        python_block("b = 2"),
        python_block(""),
    ]));

    assert_eq!(report.saved_count, 1);
    assert_eq!(report.results[0].hash, ContentHasher::hash("b = 2"));
}

// ============================================================================
// Similarity Tests
// ============================================================================

/// Test: near-duplicate in the same partition records one directed edge
///
/// The second snippet's lookup lists the first with score > 0.85; the
/// first snippet's lookup stays empty (only the newer item records edges).
#[test]
fn test_near_duplicate_edge_direction_and_score() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let service = create_service(&temp_dir);

    let first = python_block("def hello():\n    print('Hello')");
    let second = python_block("def hello():\n    print('Hello!')");
    let first_hash = ContentHasher::hash("def hello():\n    print('Hello')");
    let second_hash = ContentHasher::hash("def hello():\n    print('Hello!')");

    service.ingest(batch(vec![first]));
    let report = service.ingest(batch(vec![second]));
    assert_eq!(report.saved_count, 1);
    assert_eq!(report.results[0].similar.len(), 1);

    let queries = create_query_service(&temp_dir);

    let from_second = queries.similar(&second_hash).unwrap();
    assert_eq!(from_second.len(), 1);
    assert_eq!(from_second[0].hash, first_hash);
    assert!(from_second[0].score > 0.85);
    assert!(from_second[0].score < 1.0);

    let from_first = queries.similar(&first_hash).unwrap();
    assert!(from_first.is_empty(), "edges are directed new -> existing");
}

/// Test: similarity lookups are ordered by score, best match first
#[test]
fn test_similar_ordered_by_score() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let service = create_service(&temp_dir);

    let base = "def hello():\n    print('Hello world')";
    let close = "def hello():\n    print('Hello world!')";
    let further = "def hello():\n    print('Hello world, friends')";

    service.ingest(batch(vec![python_block(close)]));
    service.ingest(batch(vec![python_block(further)]));
    let report = service.ingest(batch(vec![python_block(base)]));
    assert_eq!(report.saved_count, 1);
    assert!(report.results[0].similar.len() >= 2, "expected two near duplicates");

    let queries = create_query_service(&temp_dir);
    let similar = queries.similar(&ContentHasher::hash(base)).unwrap();
    assert_eq!(similar.len(), report.results[0].similar.len());
    assert_eq!(similar[0].hash, ContentHasher::hash(close), "closest match first");
    for pair in similar.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

/// Test: a snippet is never similar to itself
///
/// Resubmitting identical content is intercepted by hash dedup before the
/// scan, so no self-edge can exist.
#[test]
fn test_self_similarity_never_recorded() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let service = create_service(&temp_dir);

    let hash = ContentHasher::hash("print(1)");
    service.ingest(batch(vec![python_block("print(1)")]));
    service.ingest(batch(vec![python_block("print(1)")]));

    let queries = create_query_service(&temp_dir);
    assert!(queries.similar(&hash).unwrap().is_empty());
}

/// Test: partitions isolate similarity scans
///
/// The same near-duplicate pair split across platforms records no edge.
#[test]
fn test_partition_isolation() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let service = create_service(&temp_dir);

    let on_discord = python_block("def hello():\n    print('Hello')");
    let on_slack = SnippetSubmission::new("def hello():\n    print('Hello!')", "python", "slack")
        .with_timestamp("2024-03-01T12:00:00Z");

    service.ingest(batch(vec![on_discord]));
    let report = service.ingest(batch(vec![on_slack]));

    assert_eq!(report.saved_count, 1);
    assert!(report.results[0].similar.is_empty());
}

// ============================================================================
// Diff Tests
// ============================================================================

/// Test: diff between two stored snippets differing in one line
#[test]
fn test_diff_between_stored_snippets() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let service = create_service(&temp_dir);

    let a = "def hello():\n    print('Hello')";
    let b = "def hello():\n    print('Hello!')";
    service.ingest(batch(vec![python_block(a), python_block(b)]));

    let queries = create_query_service(&temp_dir);
    let diff = queries
        .diff(&ContentHasher::hash(a), &ContentHasher::hash(b))
        .unwrap();

    let removed: Vec<&str> = diff
        .lines()
        .filter(|l| l.starts_with('-') && !l.starts_with("---"))
        .collect();
    let added: Vec<&str> = diff
        .lines()
        .filter(|l| l.starts_with('+') && !l.starts_with("+++"))
        .collect();
    assert_eq!(removed, vec!["-    print('Hello')"]);
    assert_eq!(added, vec!["+    print('Hello!')"]);
}

/// Test: diff against an unknown hash fails with NotFound
#[test]
fn test_diff_unknown_hash_not_found() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let service = create_service(&temp_dir);
    service.ingest(batch(vec![python_block("print(1)")]));

    let queries = create_query_service(&temp_dir);
    let err = queries
        .diff(&ContentHasher::hash("print(1)"), &ContentHash::new("0000"))
        .unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }), "got {err:?}");
}

// ============================================================================
// Query Tests
// ============================================================================

/// Test: listing respects limit and returns newest first
#[test]
fn test_list_limit_and_order() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let service = create_service(&temp_dir);

    for code in ["one()", "two()", "three()"] {
        service.ingest(batch(vec![python_block(code)]));
    }

    let queries = create_query_service(&temp_dir);
    let listed = queries.list(&QueryFilter::new().with_limit(2)).unwrap();
    assert_eq!(listed.len(), 2);
    // All three land within the same second; insertion order breaks the tie.
    assert_eq!(listed[0].content, "three()");
    assert_eq!(listed[1].content, "two()");
}

/// Test: language filter returns only matching snippets
#[test]
fn test_list_language_filter() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let service = create_service(&temp_dir);

    service.ingest(batch(vec![python_block("x = 1")]));
    let rust_block = SnippetSubmission::new("fn main() {}", "rust", "discord")
        .with_timestamp("2024-03-01T12:00:00Z");
    service.ingest(batch(vec![rust_block]));

    let queries = create_query_service(&temp_dir);
    let rust_only = queries
        .list(&QueryFilter::new().with_language("rust"))
        .unwrap();
    assert_eq!(rust_only.len(), 1);
    assert_eq!(rust_only[0].language, "rust");
}

// ============================================================================
// Blob Layout Tests
// ============================================================================

/// Test: blobs land at `<platform>/<language>/<timestamp>_<hash8>.<language>`
#[test]
fn test_blob_layout() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let service = create_service(&temp_dir);

    let report = service.ingest(batch(vec![python_block("print(1)")]));
    let path = &report.results[0].storage_path;
    let hash = ContentHasher::hash("print(1)");

    let expected_name = format!("20240301_120000_{}.python", hash.prefix8());
    assert!(path.ends_with(format!("discord/python/{expected_name}")));
    assert_eq!(
        std::fs::read_to_string(path).expect("blob should exist"),
        "print(1)"
    );
}

// ============================================================================
// Concurrency Tests
// ============================================================================

/// Test: concurrent submissions of identical content store exactly one row
///
/// Both threads may pass the `exists` check; the index's uniqueness
/// constraint decides the winner and the loser sees a silent skip, never
/// an error.
#[test]
fn test_concurrent_identical_submissions() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let service = Arc::new(create_service(&temp_dir));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let service = Arc::clone(&service);
            std::thread::spawn(move || {
                service.ingest(batch(vec![python_block("shared = true")]))
            })
        })
        .collect();

    let total_saved: usize = handles
        .into_iter()
        .map(|h| h.join().expect("ingest thread panicked").saved_count)
        .sum();
    assert_eq!(total_saved, 1, "exactly one submission may win");

    let queries = create_query_service(&temp_dir);
    let listed = queries.list(&QueryFilter::new()).unwrap();
    assert_eq!(listed.len(), 1);
}

/// Test: concurrent batches across partitions all succeed independently
#[test]
fn test_concurrent_distinct_partitions() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let service = Arc::new(create_service(&temp_dir));

    let handles: Vec<_> = ["discord", "slack", "teams", "matrix"]
        .into_iter()
        .map(|platform| {
            let service = Arc::clone(&service);
            std::thread::spawn(move || {
                let block =
                    SnippetSubmission::new(format!("x = '{platform}'"), "python", platform)
                        .with_timestamp("2024-03-01T12:00:00Z");
                service.ingest(batch(vec![block])).saved_count
            })
        })
        .collect();

    let total: usize = handles
        .into_iter()
        .map(|h| h.join().expect("ingest thread panicked"))
        .sum();
    assert_eq!(total, 4);
}
