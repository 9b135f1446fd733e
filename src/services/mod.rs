//! Business logic services.
//!
//! Services orchestrate the storage backends and provide the operations
//! the serving layer consumes.

mod ingest;
mod query;
mod watch;

pub use ingest::IngestionService;
pub use query::QueryService;
pub use watch::{SnippetWatcher, WatcherHandle};
