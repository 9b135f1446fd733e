//! Binary entry point for snipstash.
//!
//! A thin command-line front end over the library: it parses JSON batches,
//! prints JSON results, and otherwise stays out of the pipeline's way.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print macros in the main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow needless_pass_by_value for command functions
#![allow(clippy::needless_pass_by_value)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

use anyhow::Context;
use clap::{Parser, Subcommand};
use snipstash::{
    ContentHash, IngestRequest, IngestionService, QueryFilter, QueryService, SnippetWatcher,
    StashConfig, observability,
    storage::{CorpusIndex, SqliteIndex},
};
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

/// Snipstash - a capture store for browsed code snippets.
#[derive(Parser)]
#[command(name = "snipstash")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Ingest a JSON batch of captured blocks.
    Ingest {
        /// Batch file to read; stdin when omitted.
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// List stored snippets, newest first.
    List {
        /// Filter by platform.
        #[arg(short, long)]
        platform: Option<String>,

        /// Filter by language.
        #[arg(short, long)]
        language: Option<String>,

        /// Maximum number of rows.
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Show snippets similar to a stored snippet.
    Similar {
        /// Content hash of the snippet.
        hash: String,
    },

    /// Show a unified diff between two stored snippets.
    Diff {
        /// Content hash of the first snippet.
        hash: String,

        /// Content hash of the second snippet.
        other: String,
    },

    /// Watch the index for newly ingested snippets until Ctrl-C.
    Watch {
        /// Poll interval in seconds.
        #[arg(short, long)]
        interval: Option<u64>,
    },

    /// Show store statistics.
    Status,
}

/// Main entry point.
fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        },
    };

    observability::init(cli.verbose);

    match run_command(cli.command, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        },
    }
}

/// Loads configuration from an explicit path or the default locations.
fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<StashConfig> {
    path.map_or_else(
        || Ok(StashConfig::load_default()),
        |p| {
            StashConfig::load_from_file(p)
                .with_context(|| format!("reading config from {}", p.display()))
        },
    )
}

/// Dispatches the parsed command.
fn run_command(command: Commands, config: StashConfig) -> anyhow::Result<()> {
    match command {
        Commands::Ingest { input } => cmd_ingest(config, input),
        Commands::List {
            platform,
            language,
            limit,
        } => cmd_list(config, platform, language, limit),
        Commands::Similar { hash } => cmd_similar(config, hash),
        Commands::Diff { hash, other } => cmd_diff(config, hash, other),
        Commands::Watch { interval } => cmd_watch(config, interval),
        Commands::Status => cmd_status(config),
    }
}

/// Opens the index configured for read-side commands.
fn open_index(config: &StashConfig) -> anyhow::Result<Arc<dyn CorpusIndex>> {
    let index = SqliteIndex::new(&config.db_path)
        .with_context(|| format!("opening index at {}", config.db_path.display()))?;
    Ok(Arc::new(index))
}

fn cmd_ingest(config: StashConfig, input: Option<PathBuf>) -> anyhow::Result<()> {
    let raw = match input {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("reading batch from {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading batch from stdin")?;
            buf
        },
    };

    let request: IngestRequest = serde_json::from_str(&raw).context("parsing batch JSON")?;
    let service = IngestionService::open(config)?;
    let report = service.ingest(request);

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn cmd_list(
    config: StashConfig,
    platform: Option<String>,
    language: Option<String>,
    limit: Option<usize>,
) -> anyhow::Result<()> {
    let mut filter = QueryFilter::new().with_limit(limit.unwrap_or(config.default_query_limit));
    if let Some(platform) = platform {
        filter = filter.with_platform(platform);
    }
    if let Some(language) = language {
        filter = filter.with_language(language);
    }

    let service = QueryService::new(open_index(&config)?);
    let snippets = service.list(&filter)?;

    let summaries: Vec<_> = snippets.iter().map(snippet_summary).collect();
    println!("{}", serde_json::to_string_pretty(&summaries)?);
    Ok(())
}

fn cmd_similar(config: StashConfig, hash: String) -> anyhow::Result<()> {
    let service = QueryService::new(open_index(&config)?);
    let similar = service.similar(&ContentHash::new(hash))?;
    println!("{}", serde_json::to_string_pretty(&similar)?);
    Ok(())
}

fn cmd_diff(config: StashConfig, hash: String, other: String) -> anyhow::Result<()> {
    let service = QueryService::new(open_index(&config)?);
    let diff = service.diff(&ContentHash::new(hash), &ContentHash::new(other))?;
    if diff.is_empty() {
        println!("snippets are identical");
    } else {
        print!("{diff}");
    }
    Ok(())
}

fn cmd_watch(config: StashConfig, interval: Option<u64>) -> anyhow::Result<()> {
    let interval = interval.map_or(config.watch_interval, Duration::from_secs);
    let watcher = SnippetWatcher::new(open_index(&config)?, interval);

    let handle = watcher.start(|fresh| {
        println!("{} new snippet(s)", fresh.len());
        for snippet in fresh {
            println!(
                "  {} [{}/{}] {}",
                snippet.hash.prefix8(),
                snippet.platform,
                snippet.language,
                snippet.title
            );
        }
    });

    let (shutdown_tx, shutdown_rx) = std::sync::mpsc::channel();
    ctrlc::set_handler(move || {
        let _ = shutdown_tx.send(());
    })
    .context("installing Ctrl-C handler")?;

    eprintln!("watching for new snippets every {interval:?}; Ctrl-C to stop");
    let _ = shutdown_rx.recv();
    handle.stop();
    Ok(())
}

fn cmd_status(config: StashConfig) -> anyhow::Result<()> {
    let index = open_index(&config)?;
    let count = index.count()?;
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "snippets": count,
            "db_path": config.db_path,
            "storage_dir": config.storage_dir,
            "similarity_threshold": config.similarity_threshold,
        }))?
    );
    Ok(())
}

/// Listing view of a snippet: everything but the content body.
fn snippet_summary(snippet: &snipstash::Snippet) -> serde_json::Value {
    serde_json::json!({
        "hash": snippet.hash,
        "language": snippet.language,
        "platform": snippet.platform,
        "url": snippet.source_url,
        "title": snippet.title,
        "captured_at": snippet.captured_at.to_rfc3339(),
        "storage_path": snippet.storage_path,
        "created_at": snippet.created_at,
    })
}
