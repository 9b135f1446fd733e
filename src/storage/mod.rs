//! Storage backends.
//!
//! Two layers with a deliberate ownership split:
//!
//! - [`CorpusIndex`]: snippet records and similarity edges in `SQLite`
//! - [`BlobStore`]: the raw snippet bytes on disk, one write-once file each
//!
//! The pipeline writes the blob first and commits the index second; a crash
//! between the two leaves an orphaned file with no index row, which is
//! accepted and left to out-of-band reconciliation.

mod blob;
mod sqlite;
mod traits;

pub use blob::{FsBlobStore, blob_file_name, partition_dir};
pub use sqlite::SqliteIndex;
pub use traits::{BlobStore, CorpusIndex};
