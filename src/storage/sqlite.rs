//! `SQLite` corpus index backend.
//!
//! Snippet records and similarity edges live in two tables; the snippet
//! hash is the primary key and both edge columns carry foreign keys back to
//! it, so the dedup and referential invariants hold at the schema level
//! regardless of caller discipline.

use crate::models::{ContentHash, QueryFilter, Snippet};
use crate::storage::traits::CorpusIndex;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;
use tracing::instrument;

/// Helper to acquire mutex lock with poison recovery.
///
/// If the mutex is poisoned (due to a panic in a previous critical
/// section), we recover the inner value and log a warning. This prevents
/// cascading failures when one operation panics.
fn acquire_lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            tracing::warn!("SQLite mutex was poisoned, recovering");
            metrics::counter!("sqlite_mutex_poison_recovery_total").increment(1);
            poisoned.into_inner()
        },
    }
}

/// Records operation count and latency for index operations.
fn record_operation_metrics(operation: &'static str, start: Instant, status: &'static str) {
    metrics::counter!(
        "index_operations_total",
        "backend" => "sqlite",
        "operation" => operation,
        "status" => status
    )
    .increment(1);
    metrics::histogram!(
        "index_operation_duration_ms",
        "backend" => "sqlite",
        "operation" => operation,
        "status" => status
    )
    .record(start.elapsed().as_secs_f64() * 1000.0);
}

/// SQLite-based corpus index.
pub struct SqliteIndex {
    /// Connection to the `SQLite` database.
    conn: Mutex<Connection>,
    /// Path to the `SQLite` database (None for in-memory).
    db_path: Option<PathBuf>,
}

struct SnippetRow {
    hash: String,
    content: String,
    language: String,
    platform: String,
    source_url: String,
    title: String,
    captured_at: String,
    storage_path: String,
    created_at: i64,
}

impl SnippetRow {
    const COLUMNS: &'static str =
        "hash, content, language, platform, source_url, title, captured_at, storage_path, created_at";

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            hash: row.get(0)?,
            content: row.get(1)?,
            language: row.get(2)?,
            platform: row.get(3)?,
            source_url: row.get(4)?,
            title: row.get(5)?,
            captured_at: row.get(6)?,
            storage_path: row.get(7)?,
            created_at: row.get(8)?,
        })
    }

    fn into_snippet(self) -> Snippet {
        // Timestamps were written by us as RFC 3339; a row that fails to
        // parse is from a corrupted database and falls back to the epoch
        // rather than poisoning the whole query.
        let captured_at = DateTime::parse_from_rfc3339(&self.captured_at)
            .map_or(DateTime::<Utc>::UNIX_EPOCH, |dt| dt.with_timezone(&Utc));

        Snippet {
            hash: ContentHash::new(self.hash),
            content: self.content,
            language: self.language,
            platform: self.platform,
            source_url: self.source_url,
            title: self.title,
            captured_at,
            storage_path: PathBuf::from(self.storage_path),
            created_at: self.created_at,
        }
    }
}

impl SqliteIndex {
    /// Creates a new `SQLite` index at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| Error::Storage {
                    operation: "create_db_dir".to_string(),
                    cause: e.to_string(),
                })?;
            }
        }

        let conn = Connection::open(&db_path).map_err(|e| Error::Storage {
            operation: "open_sqlite".to_string(),
            cause: e.to_string(),
        })?;

        let index = Self {
            conn: Mutex::new(conn),
            db_path: Some(db_path),
        };

        index.initialize()?;
        Ok(index)
    }

    /// Creates an in-memory `SQLite` index (useful for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| Error::Storage {
            operation: "open_sqlite_memory".to_string(),
            cause: e.to_string(),
        })?;

        let index = Self {
            conn: Mutex::new(conn),
            db_path: None,
        };

        index.initialize()?;
        Ok(index)
    }

    /// Returns the database path.
    #[must_use]
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Initializes the database schema.
    fn initialize(&self) -> Result<()> {
        let conn = acquire_lock(&self.conn);

        // WAL allows concurrent readers against a single writer; NORMAL
        // synchronous and a busy timeout keep lock contention graceful.
        // journal_mode returns a string result, so pragma_update's value
        // is ignored rather than treated as an error.
        let _ = conn.pragma_update(None, "journal_mode", "WAL");
        let _ = conn.pragma_update(None, "synchronous", "NORMAL");
        let _ = conn.pragma_update(None, "busy_timeout", "5000");
        // Foreign keys are off by default in SQLite; the edge tables'
        // referential invariant depends on them.
        let _ = conn.pragma_update(None, "foreign_keys", "ON");

        conn.execute(
            "CREATE TABLE IF NOT EXISTS snippets (
                hash TEXT PRIMARY KEY,
                content TEXT NOT NULL,
                language TEXT NOT NULL,
                platform TEXT NOT NULL,
                source_url TEXT NOT NULL,
                title TEXT NOT NULL,
                captured_at TEXT NOT NULL,
                storage_path TEXT NOT NULL,
                created_at INTEGER NOT NULL
            )",
            [],
        )
        .map_err(|e| Error::Storage {
            operation: "create_snippets_table".to_string(),
            cause: e.to_string(),
        })?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS similarity_edges (
                source_hash TEXT NOT NULL REFERENCES snippets(hash),
                target_hash TEXT NOT NULL REFERENCES snippets(hash),
                score REAL NOT NULL,
                created_at INTEGER NOT NULL,
                PRIMARY KEY (source_hash, target_hash)
            )",
            [],
        )
        .map_err(|e| Error::Storage {
            operation: "create_edges_table".to_string(),
            cause: e.to_string(),
        })?;

        Self::create_indexes(&conn);

        Ok(())
    }

    /// Creates indexes for common query patterns.
    fn create_indexes(conn: &Connection) {
        // Partition scans on every ingest
        let _ = conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_snippets_partition
             ON snippets(language, platform)",
            [],
        );

        // Newest-first listing queries
        let _ = conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_snippets_created_at
             ON snippets(created_at DESC)",
            [],
        );

        // Similarity lookups by source
        let _ = conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_edges_source
             ON similarity_edges(source_hash, score DESC)",
            [],
        );
    }

    /// Maps a constraint failure on a snippet insert to the domain error.
    fn map_snippet_insert_error(e: &rusqlite::Error, hash: &ContentHash) -> Error {
        if let rusqlite::Error::SqliteFailure(ffi_err, _) = e {
            if matches!(
                ffi_err.extended_code,
                rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY | rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
            ) {
                return Error::Conflict {
                    hash: hash.as_str().to_string(),
                };
            }
        }
        Error::Storage {
            operation: "insert_snippet".to_string(),
            cause: e.to_string(),
        }
    }

    /// Maps a constraint failure on an edge insert to the domain error.
    fn map_edge_insert_error(e: &rusqlite::Error, target: &ContentHash) -> Error {
        if let rusqlite::Error::SqliteFailure(ffi_err, _) = e {
            if ffi_err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY {
                return Error::Referential {
                    hash: target.as_str().to_string(),
                };
            }
        }
        Error::Storage {
            operation: "insert_edge".to_string(),
            cause: e.to_string(),
        }
    }

    /// Inserts the snippet row on an open connection.
    fn insert_snippet_row(conn: &Connection, snippet: &Snippet) -> Result<()> {
        conn.execute(
            "INSERT INTO snippets
             (hash, content, language, platform, source_url, title, captured_at, storage_path, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                snippet.hash.as_str(),
                snippet.content,
                snippet.language,
                snippet.platform,
                snippet.source_url,
                snippet.title,
                snippet.captured_at.to_rfc3339(),
                snippet.storage_path.to_string_lossy(),
                snippet.created_at,
            ],
        )
        .map_err(|e| Self::map_snippet_insert_error(&e, &snippet.hash))?;
        Ok(())
    }

    /// Inserts edge rows on an open connection.
    fn insert_edge_rows(
        conn: &Connection,
        source: &ContentHash,
        edges: &[(ContentHash, f64)],
    ) -> Result<()> {
        for (target, score) in edges {
            conn.execute(
                "INSERT INTO similarity_edges (source_hash, target_hash, score, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    source.as_str(),
                    target.as_str(),
                    score,
                    crate::current_timestamp()
                ],
            )
            .map_err(|e| Self::map_edge_insert_error(&e, target))?;
        }
        Ok(())
    }

    /// Runs `body` inside a `BEGIN IMMEDIATE` transaction on the shared
    /// connection, committing on success and rolling back on error.
    fn with_transaction<F>(&self, body: F) -> Result<()>
    where
        F: FnOnce(&Connection) -> Result<()>,
    {
        let conn = acquire_lock(&self.conn);

        conn.execute("BEGIN IMMEDIATE", [])
            .map_err(|e| Error::Storage {
                operation: "begin_transaction".to_string(),
                cause: e.to_string(),
            })?;

        let result = body(&conn);

        if result.is_ok() {
            conn.execute("COMMIT", []).map_err(|e| Error::Storage {
                operation: "commit_transaction".to_string(),
                cause: e.to_string(),
            })?;
        } else {
            let _ = conn.execute("ROLLBACK", []);
        }

        result
    }
}

impl CorpusIndex for SqliteIndex {
    #[instrument(skip(self), fields(operation = "exists", backend = "sqlite", snippet.hash = %hash.as_str()))]
    fn exists(&self, hash: &ContentHash) -> Result<bool> {
        let conn = acquire_lock(&self.conn);
        let found: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM snippets WHERE hash = ?1",
                params![hash.as_str()],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| Error::Storage {
                operation: "exists".to_string(),
                cause: e.to_string(),
            })?;
        Ok(found.is_some())
    }

    #[instrument(
        skip(self, snippet),
        fields(
            operation = "insert_snippet",
            backend = "sqlite",
            snippet.hash = %snippet.hash.as_str(),
            language = %snippet.language,
            platform = %snippet.platform
        )
    )]
    fn insert_snippet(&self, snippet: &Snippet) -> Result<()> {
        let start = Instant::now();
        let result = self.with_transaction(|conn| Self::insert_snippet_row(conn, snippet));

        let status = if result.is_ok() { "success" } else { "error" };
        record_operation_metrics("insert_snippet", start, status);
        result
    }

    #[instrument(
        skip(self, edges),
        fields(
            operation = "insert_edges",
            backend = "sqlite",
            snippet.hash = %source.as_str(),
            edge_count = edges.len()
        )
    )]
    fn insert_edges(&self, source: &ContentHash, edges: &[(ContentHash, f64)]) -> Result<()> {
        let start = Instant::now();
        let result = self.with_transaction(|conn| {
            // The edge FKs catch unknown targets; an unknown source is
            // checked explicitly so empty edge lists still honor the
            // referential contract.
            let known: Option<i64> = conn
                .query_row(
                    "SELECT 1 FROM snippets WHERE hash = ?1",
                    params![source.as_str()],
                    |row| row.get(0),
                )
                .optional()
                .map_err(|e| Error::Storage {
                    operation: "check_edge_source".to_string(),
                    cause: e.to_string(),
                })?;
            if known.is_none() {
                return Err(Error::Referential {
                    hash: source.as_str().to_string(),
                });
            }

            Self::insert_edge_rows(conn, source, edges)
        });

        let status = if result.is_ok() { "success" } else { "error" };
        record_operation_metrics("insert_edges", start, status);
        result
    }

    #[instrument(
        skip(self, snippet, edges),
        fields(
            operation = "insert_snippet_with_edges",
            backend = "sqlite",
            snippet.hash = %snippet.hash.as_str(),
            edge_count = edges.len()
        )
    )]
    fn insert_snippet_with_edges(
        &self,
        snippet: &Snippet,
        edges: &[(ContentHash, f64)],
    ) -> Result<()> {
        let start = Instant::now();
        let result = self.with_transaction(|conn| {
            Self::insert_snippet_row(conn, snippet)?;
            Self::insert_edge_rows(conn, &snippet.hash, edges)
        });

        let status = if result.is_ok() { "success" } else { "error" };
        record_operation_metrics("insert_snippet_with_edges", start, status);
        result
    }

    #[instrument(skip(self), fields(operation = "get", backend = "sqlite", snippet.hash = %hash.as_str()))]
    fn get(&self, hash: &ContentHash) -> Result<Option<Snippet>> {
        let conn = acquire_lock(&self.conn);
        let sql = format!(
            "SELECT {} FROM snippets WHERE hash = ?1",
            SnippetRow::COLUMNS
        );
        let row = conn
            .query_row(&sql, params![hash.as_str()], SnippetRow::from_row)
            .optional()
            .map_err(|e| Error::Storage {
                operation: "get_snippet".to_string(),
                cause: e.to_string(),
            })?;
        Ok(row.map(SnippetRow::into_snippet))
    }

    #[instrument(skip(self), fields(operation = "find_by_partition", backend = "sqlite", language, platform))]
    fn find_by_partition(&self, language: &str, platform: &str) -> Result<Vec<Snippet>> {
        let conn = acquire_lock(&self.conn);
        let sql = format!(
            "SELECT {} FROM snippets WHERE language = ?1 AND platform = ?2",
            SnippetRow::COLUMNS
        );
        let mut stmt = conn.prepare(&sql).map_err(|e| Error::Storage {
            operation: "prepare_find_by_partition".to_string(),
            cause: e.to_string(),
        })?;

        let rows = stmt
            .query_map(params![language, platform], SnippetRow::from_row)
            .map_err(|e| Error::Storage {
                operation: "find_by_partition".to_string(),
                cause: e.to_string(),
            })?;

        let mut snippets = Vec::new();
        for row in rows {
            let row = row.map_err(|e| Error::Storage {
                operation: "read_partition_row".to_string(),
                cause: e.to_string(),
            })?;
            snippets.push(row.into_snippet());
        }
        Ok(snippets)
    }

    #[instrument(skip(self), fields(operation = "find_edges_for", backend = "sqlite", snippet.hash = %hash.as_str()))]
    fn find_edges_for(&self, hash: &ContentHash) -> Result<Vec<(Snippet, f64)>> {
        let conn = acquire_lock(&self.conn);
        let sql = format!(
            "SELECT {}, e.score
             FROM similarity_edges e
             JOIN snippets s ON e.target_hash = s.hash
             WHERE e.source_hash = ?1
             ORDER BY e.score DESC, s.rowid ASC",
            // Qualify the shared column list with the snippets alias.
            SnippetRow::COLUMNS
                .split(", ")
                .map(|c| format!("s.{c}"))
                .collect::<Vec<_>>()
                .join(", ")
        );
        let mut stmt = conn.prepare(&sql).map_err(|e| Error::Storage {
            operation: "prepare_find_edges".to_string(),
            cause: e.to_string(),
        })?;

        let rows = stmt
            .query_map(params![hash.as_str()], |row| {
                let snippet_row = SnippetRow::from_row(row)?;
                let score: f64 = row.get(9)?;
                Ok((snippet_row, score))
            })
            .map_err(|e| Error::Storage {
                operation: "find_edges_for".to_string(),
                cause: e.to_string(),
            })?;

        let mut edges = Vec::new();
        for row in rows {
            let (snippet_row, score) = row.map_err(|e| Error::Storage {
                operation: "read_edge_row".to_string(),
                cause: e.to_string(),
            })?;
            edges.push((snippet_row.into_snippet(), score));
        }
        Ok(edges)
    }

    #[instrument(skip(self, filter), fields(operation = "query", backend = "sqlite", limit = filter.limit))]
    fn query(&self, filter: &QueryFilter) -> Result<Vec<Snippet>> {
        let conn = acquire_lock(&self.conn);

        // Build the WHERE clause with numbered parameters.
        let mut conditions = Vec::new();
        let mut params_vec: Vec<String> = Vec::new();
        let mut param_idx = 1;

        if let Some(ref platform) = filter.platform {
            conditions.push(format!("platform = ?{param_idx}"));
            params_vec.push(platform.clone());
            param_idx += 1;
        }
        if let Some(ref language) = filter.language {
            conditions.push(format!("language = ?{param_idx}"));
            params_vec.push(language.clone());
            param_idx += 1;
        }
        if let Some(created_after) = filter.created_after {
            conditions.push(format!("created_at > ?{param_idx}"));
            params_vec.push(created_after.to_string());
            param_idx += 1;
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let sql = format!(
            "SELECT {} FROM snippets {where_clause}
             ORDER BY created_at DESC, rowid DESC
             LIMIT ?{param_idx}",
            SnippetRow::COLUMNS
        );

        let mut stmt = conn.prepare(&sql).map_err(|e| Error::Storage {
            operation: "prepare_query".to_string(),
            cause: e.to_string(),
        })?;

        let limit = i64::try_from(filter.limit).unwrap_or(i64::MAX);
        let rows = stmt
            .query_map(
                rusqlite::params_from_iter(
                    params_vec
                        .into_iter()
                        .chain(std::iter::once(limit.to_string())),
                ),
                SnippetRow::from_row,
            )
            .map_err(|e| Error::Storage {
                operation: "query_snippets".to_string(),
                cause: e.to_string(),
            })?;

        let mut snippets = Vec::new();
        for row in rows {
            let row = row.map_err(|e| Error::Storage {
                operation: "read_query_row".to_string(),
                cause: e.to_string(),
            })?;
            snippets.push(row.into_snippet());
        }
        Ok(snippets)
    }

    #[instrument(skip(self), fields(operation = "count", backend = "sqlite"))]
    fn count(&self) -> Result<usize> {
        let conn = acquire_lock(&self.conn);
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM snippets", [], |row| row.get(0))
            .map_err(|e| Error::Storage {
                operation: "count_snippets".to_string(),
                cause: e.to_string(),
            })?;
        Ok(usize::try_from(count).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dedup::ContentHasher;

    fn snippet(content: &str, language: &str, platform: &str, created_at: i64) -> Snippet {
        Snippet {
            hash: ContentHasher::hash(content),
            content: content.to_string(),
            language: language.to_string(),
            platform: platform.to_string(),
            source_url: "https://example.com/page".to_string(),
            title: "Untitled".to_string(),
            captured_at: Utc::now(),
            storage_path: PathBuf::from(format!("{platform}/{language}/x.{language}")),
            created_at,
        }
    }

    #[test]
    fn test_insert_and_exists() {
        let index = SqliteIndex::in_memory().unwrap();
        let snip = snippet("print(1)", "python", "discord", 1);

        assert!(!index.exists(&snip.hash).unwrap());
        index.insert_snippet(&snip).unwrap();
        assert!(index.exists(&snip.hash).unwrap());
    }

    #[test]
    fn test_duplicate_insert_is_conflict() {
        let index = SqliteIndex::in_memory().unwrap();
        let snip = snippet("print(1)", "python", "discord", 1);

        index.insert_snippet(&snip).unwrap();
        let err = index.insert_snippet(&snip).unwrap_err();
        assert!(matches!(err, Error::Conflict { .. }), "got {err:?}");
    }

    #[test]
    fn test_get_roundtrip() {
        let index = SqliteIndex::in_memory().unwrap();
        let snip = snippet("SELECT 1;", "sql", "stackoverflow", 7);
        index.insert_snippet(&snip).unwrap();

        let fetched = index.get(&snip.hash).unwrap().unwrap();
        assert_eq!(fetched.content, "SELECT 1;");
        assert_eq!(fetched.language, "sql");
        assert_eq!(fetched.platform, "stackoverflow");
        assert_eq!(fetched.created_at, 7);
        assert_eq!(fetched.storage_path, snip.storage_path);
    }

    #[test]
    fn test_get_unknown_is_none() {
        let index = SqliteIndex::in_memory().unwrap();
        assert!(index.get(&ContentHash::new("nope")).unwrap().is_none());
    }

    #[test]
    fn test_edges_require_known_hashes() {
        let index = SqliteIndex::in_memory().unwrap();
        let known = snippet("print(1)", "python", "discord", 1);
        index.insert_snippet(&known).unwrap();

        // Unknown target
        let err = index
            .insert_edges(&known.hash, &[(ContentHash::new("missing"), 0.9)])
            .unwrap_err();
        assert!(matches!(err, Error::Referential { .. }), "got {err:?}");

        // Unknown source
        let err = index
            .insert_edges(&ContentHash::new("missing"), &[(known.hash.clone(), 0.9)])
            .unwrap_err();
        assert!(matches!(err, Error::Referential { .. }), "got {err:?}");
    }

    #[test]
    fn test_edges_ordered_by_score_desc() {
        let index = SqliteIndex::in_memory().unwrap();
        let source = snippet("a", "python", "discord", 1);
        let low = snippet("b", "python", "discord", 2);
        let high = snippet("c", "python", "discord", 3);
        index.insert_snippet(&source).unwrap();
        index.insert_snippet(&low).unwrap();
        index.insert_snippet(&high).unwrap();

        index
            .insert_edges(
                &source.hash,
                &[(low.hash.clone(), 0.86), (high.hash.clone(), 0.95)],
            )
            .unwrap();

        let edges = index.find_edges_for(&source.hash).unwrap();
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0].0.hash, high.hash);
        assert!(edges[0].1 > edges[1].1);

        // Directionality: nothing recorded from the targets' side.
        assert!(index.find_edges_for(&low.hash).unwrap().is_empty());
    }

    #[test]
    fn test_atomic_insert_rolls_back_on_bad_edge() {
        let index = SqliteIndex::in_memory().unwrap();
        let snip = snippet("print(1)", "python", "discord", 1);

        let err = index
            .insert_snippet_with_edges(&snip, &[(ContentHash::new("missing"), 0.9)])
            .unwrap_err();
        assert!(matches!(err, Error::Referential { .. }), "got {err:?}");

        // The snippet insert must have rolled back with the failing edge.
        assert!(!index.exists(&snip.hash).unwrap());
    }

    #[test]
    fn test_find_by_partition_scopes_both_keys() {
        let index = SqliteIndex::in_memory().unwrap();
        index
            .insert_snippet(&snippet("a", "python", "discord", 1))
            .unwrap();
        index
            .insert_snippet(&snippet("b", "python", "slack", 2))
            .unwrap();
        index
            .insert_snippet(&snippet("c", "rust", "discord", 3))
            .unwrap();

        let partition = index.find_by_partition("python", "discord").unwrap();
        assert_eq!(partition.len(), 1);
        assert_eq!(partition[0].content, "a");
    }

    #[test]
    fn test_query_newest_first_with_limit() {
        let index = SqliteIndex::in_memory().unwrap();
        for (i, content) in ["one", "two", "three"].iter().enumerate() {
            index
                .insert_snippet(&snippet(content, "python", "discord", i as i64))
                .unwrap();
        }

        let filter = QueryFilter::new().with_limit(2);
        let results = index.query(&filter).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].content, "three");
        assert_eq!(results[1].content, "two");
    }

    #[test]
    fn test_query_filters_by_language_and_platform() {
        let index = SqliteIndex::in_memory().unwrap();
        index
            .insert_snippet(&snippet("a", "python", "discord", 1))
            .unwrap();
        index
            .insert_snippet(&snippet("b", "rust", "discord", 2))
            .unwrap();
        index
            .insert_snippet(&snippet("c", "rust", "slack", 3))
            .unwrap();

        let by_language = index.query(&QueryFilter::new().with_language("rust")).unwrap();
        assert_eq!(by_language.len(), 2);
        assert!(by_language.iter().all(|s| s.language == "rust"));

        let both = index
            .query(
                &QueryFilter::new()
                    .with_language("rust")
                    .with_platform("slack"),
            )
            .unwrap();
        assert_eq!(both.len(), 1);
        assert_eq!(both[0].content, "c");
    }

    #[test]
    fn test_query_created_after() {
        let index = SqliteIndex::in_memory().unwrap();
        index
            .insert_snippet(&snippet("a", "python", "discord", 100))
            .unwrap();
        index
            .insert_snippet(&snippet("b", "python", "discord", 200))
            .unwrap();

        let fresh = index
            .query(&QueryFilter::new().with_created_after(100))
            .unwrap();
        assert_eq!(fresh.len(), 1);
        assert_eq!(fresh[0].content, "b");
    }

    #[test]
    fn test_count() {
        let index = SqliteIndex::in_memory().unwrap();
        assert_eq!(index.count().unwrap(), 0);
        index
            .insert_snippet(&snippet("a", "python", "discord", 1))
            .unwrap();
        assert_eq!(index.count().unwrap(), 1);
    }
}
