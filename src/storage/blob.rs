//! Filesystem blob store.
//!
//! One file per accepted snippet, write-once, laid out by partition:
//! `<root>/<platform>/<language>/<YYYYmmdd_HHMMSS>_<hash8>.<language>`.
//! Two snippets captured in the same second cannot collide because the
//! hash prefix disambiguates, and an identical (timestamp, prefix) pair is
//! definitionally the same content.

use crate::models::ContentHash;
use crate::storage::traits::BlobStore;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};

/// Filesystem-backed blob store rooted at a configured directory.
pub struct FsBlobStore {
    /// Absolute base directory for blob files.
    base_path: PathBuf,
}

impl FsBlobStore {
    /// Creates a blob store rooted at `base_path`, creating the directory
    /// if needed.
    ///
    /// The root is canonicalized so every returned blob path is absolute.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or resolved.
    pub fn new(base_path: impl Into<PathBuf>) -> Result<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).map_err(|e| Error::Storage {
            operation: "create_storage_root".to_string(),
            cause: e.to_string(),
        })?;

        let base_path = base_path.canonicalize().map_err(|e| Error::Storage {
            operation: "resolve_storage_root".to_string(),
            cause: e.to_string(),
        })?;

        Ok(Self { base_path })
    }

    /// Returns the store's root directory.
    #[must_use]
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

impl BlobStore for FsBlobStore {
    fn write(&self, relative_dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
        let dir = self.base_path.join(relative_dir);
        fs::create_dir_all(&dir).map_err(|e| Error::Storage {
            operation: "create_partition_dir".to_string(),
            cause: e.to_string(),
        })?;

        let path = dir.join(file_name);
        fs::write(&path, bytes).map_err(|e| Error::Storage {
            operation: "write_blob".to_string(),
            cause: e.to_string(),
        })?;

        tracing::debug!(path = %path.display(), size = bytes.len(), "wrote blob");
        Ok(path)
    }
}

/// Returns the partition directory for a (platform, language) pair.
///
/// Callers must have validated both values as safe path components (the
/// ingestion boundary does); this function only assembles them.
#[must_use]
pub fn partition_dir(platform: &str, language: &str) -> PathBuf {
    PathBuf::from(platform).join(language)
}

/// Builds the blob filename for a snippet.
///
/// Layout: capture timestamp to second precision, the first 8 hex chars of
/// the content hash, and a language-derived extension.
#[must_use]
pub fn blob_file_name(captured_at: &DateTime<Utc>, hash: &ContentHash, language: &str) -> String {
    format!(
        "{}_{}.{}",
        captured_at.format("%Y%m%d_%H%M%S"),
        hash.prefix8(),
        language
    )
}
