//! Configuration management.
//!
//! All components receive an explicit [`StashConfig`] through their
//! constructors; there is no process-wide mutable configuration. This keeps
//! concurrent test instances isolated and allows several stores per process.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Default similarity threshold for near-duplicate edges.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.85;

/// Default maximum number of rows returned by a listing query.
pub const DEFAULT_QUERY_LIMIT: usize = 100;

/// Main configuration for snipstash.
#[derive(Debug, Clone)]
pub struct StashConfig {
    /// Root directory for snippet blob files.
    pub storage_dir: PathBuf,
    /// Path to the `SQLite` index database.
    pub db_path: PathBuf,
    /// Minimum similarity score for recording a near-duplicate edge.
    ///
    /// Edges are recorded for scores in `[similarity_threshold, 1.0)`;
    /// a score of exactly 1.0 means identical content, which is handled
    /// by hash dedup instead.
    pub similarity_threshold: f64,
    /// Default row limit for listing queries.
    pub default_query_limit: usize,
    /// Poll interval for the new-snippet watcher.
    pub watch_interval: Duration,
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    /// Blob storage root.
    pub storage_dir: Option<String>,
    /// Index database path.
    pub db_path: Option<String>,
    /// Similarity threshold.
    pub similarity_threshold: Option<f64>,
    /// Default query limit.
    pub default_query_limit: Option<usize>,
    /// Watcher poll interval in seconds.
    pub watch_interval_secs: Option<u64>,
}

impl Default for StashConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from("code_blocks"),
            db_path: PathBuf::from("code_blocks.db"),
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            default_query_limit: DEFAULT_QUERY_LIMIT,
            watch_interval: Duration::from_secs(1),
        }
    }
}

impl StashConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &std::path::Path) -> crate::Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| crate::Error::Storage {
            operation: "read_config_file".to_string(),
            cause: e.to_string(),
        })?;

        let file: ConfigFile = toml::from_str(&contents).map_err(|e| crate::Error::Storage {
            operation: "parse_config_file".to_string(),
            cause: e.to_string(),
        })?;

        Ok(Self::from_config_file(file))
    }

    /// Loads configuration from the default location.
    ///
    /// Checks the following paths in order:
    /// 1. Platform-specific config dir (`~/Library/Application Support/snipstash/` on macOS)
    /// 2. XDG config dir (`~/.config/snipstash/` for Unix compatibility)
    ///
    /// Returns default configuration if no config file is found. Environment
    /// overrides are applied on top of whichever source was used.
    #[must_use]
    pub fn load_default() -> Self {
        let Some(base_dirs) = directories::BaseDirs::new() else {
            return Self::default().with_env_overrides();
        };

        // Check platform-specific config dir first
        let platform_config = base_dirs.config_dir().join("snipstash").join("config.toml");
        if platform_config.exists() {
            if let Ok(config) = Self::load_from_file(&platform_config) {
                return config.with_env_overrides();
            }
        }

        // Fall back to XDG-style ~/.config/snipstash/ for Unix compatibility
        let xdg_config = base_dirs
            .home_dir()
            .join(".config")
            .join("snipstash")
            .join("config.toml");
        if xdg_config.exists() {
            if let Ok(config) = Self::load_from_file(&xdg_config) {
                return config.with_env_overrides();
            }
        }

        Self::default().with_env_overrides()
    }

    /// Converts a `ConfigFile` to `StashConfig`.
    fn from_config_file(file: ConfigFile) -> Self {
        let mut config = Self::default();

        if let Some(storage_dir) = file.storage_dir {
            config.storage_dir = PathBuf::from(storage_dir);
        }
        if let Some(db_path) = file.db_path {
            config.db_path = PathBuf::from(db_path);
        }
        if let Some(threshold) = file.similarity_threshold {
            config.similarity_threshold = threshold;
        }
        if let Some(limit) = file.default_query_limit {
            config.default_query_limit = limit;
        }
        if let Some(secs) = file.watch_interval_secs {
            config.watch_interval = Duration::from_secs(secs);
        }

        config
    }

    /// Applies `SNIPSTASH_*` environment variable overrides.
    ///
    /// Unset or unparsable variables leave the current value in place.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = std::env::var("SNIPSTASH_STORAGE_DIR") {
            self.storage_dir = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("SNIPSTASH_DB_PATH") {
            self.db_path = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("SNIPSTASH_SIMILARITY_THRESHOLD") {
            if let Ok(threshold) = v.parse() {
                self.similarity_threshold = threshold;
            }
        }
        if let Ok(v) = std::env::var("SNIPSTASH_WATCH_INTERVAL_SECS") {
            if let Ok(secs) = v.parse() {
                self.watch_interval = Duration::from_secs(secs);
            }
        }
        self
    }

    /// Sets the blob storage root.
    #[must_use]
    pub fn with_storage_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.storage_dir = path.into();
        self
    }

    /// Sets the index database path.
    #[must_use]
    pub fn with_db_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.db_path = path.into();
        self
    }

    /// Sets the similarity threshold.
    #[must_use]
    pub const fn with_similarity_threshold(mut self, threshold: f64) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    /// Sets the default query limit.
    #[must_use]
    pub const fn with_default_query_limit(mut self, limit: usize) -> Self {
        self.default_query_limit = limit;
        self
    }

    /// Sets the watcher poll interval.
    #[must_use]
    pub const fn with_watch_interval(mut self, interval: Duration) -> Self {
        self.watch_interval = interval;
        self
    }
}
