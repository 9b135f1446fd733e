//! Polling observer for newly inserted snippets.
//!
//! Decoupled from the ingestion path: the watcher only reads the index,
//! on an interval, looking for rows inserted since its last check. It runs
//! on its own thread and stops via an explicit signal rather than an
//! unbounded loop.

use crate::models::{QueryFilter, Snippet};
use crate::storage::CorpusIndex;
use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, warn};

/// Watches the corpus index for newly inserted snippets.
///
/// Insertion timestamps have second precision, so a snippet landing in the
/// same second as a poll can be delivered on the next poll instead; the
/// watcher never delivers the same row twice.
pub struct SnippetWatcher {
    /// Snippet records to poll.
    index: Arc<dyn CorpusIndex>,
    /// Poll interval.
    interval: Duration,
}

/// Handle to a running watcher thread.
///
/// Dropping the handle without calling [`stop`](Self::stop) detaches the
/// thread; it keeps polling until the process exits.
pub struct WatcherHandle {
    stop_tx: mpsc::Sender<()>,
    handle: JoinHandle<()>,
}

impl WatcherHandle {
    /// Signals the watcher to stop and waits for its thread to finish.
    pub fn stop(self) {
        let _ = self.stop_tx.send(());
        if self.handle.join().is_err() {
            warn!("watcher thread panicked before shutdown");
        }
    }
}

impl SnippetWatcher {
    /// Creates a watcher polling `index` every `interval`.
    #[must_use]
    pub fn new(index: Arc<dyn CorpusIndex>, interval: Duration) -> Self {
        Self { index, interval }
    }

    /// Starts the watcher thread.
    ///
    /// `on_new` is invoked with each non-empty batch of snippets inserted
    /// after the watcher started, newest first. The thread terminates
    /// promptly when the returned handle is stopped.
    #[must_use]
    pub fn start<F>(self, on_new: F) -> WatcherHandle
    where
        F: Fn(Vec<Snippet>) + Send + 'static,
    {
        let (stop_tx, stop_rx) = mpsc::channel();
        // Rows already present this second are treated as pre-existing.
        let mut last_seen = crate::current_timestamp() - 1;

        let handle = std::thread::spawn(move || {
            loop {
                match stop_rx.recv_timeout(self.interval) {
                    Err(RecvTimeoutError::Timeout) => {},
                    // Stop requested, or the handle was dropped.
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }

                let filter = QueryFilter::new()
                    .with_created_after(last_seen)
                    .with_limit(usize::MAX);
                match self.index.query(&filter) {
                    Ok(fresh) if fresh.is_empty() => {},
                    Ok(fresh) => {
                        last_seen = fresh
                            .iter()
                            .map(|s| s.created_at)
                            .max()
                            .unwrap_or(last_seen);
                        debug!(count = fresh.len(), "new snippets observed");
                        on_new(fresh);
                    },
                    Err(e) => {
                        // Transient index errors should not kill the
                        // watcher; the next tick retries.
                        warn!(error = %e, "watch poll failed");
                    },
                }
            }
            debug!("watcher stopped");
        });

        WatcherHandle { stop_tx, handle }
    }
}
