//! Logging initialization.
//!
//! The library itself only emits `tracing` events; wiring them to an
//! output is the binary's job, via [`init`].

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Initializes the global tracing subscriber.
///
/// `RUST_LOG` takes precedence when set; otherwise the level defaults to
/// `info`, or `debug` with `verbose`. Logs go to stderr so command output
/// on stdout stays machine-readable. Calling this twice is a no-op.
pub fn init(verbose: bool) {
    let default_directive = if verbose { "snipstash=debug,info" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init();
}
