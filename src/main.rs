//! Linktide main entry point
//!
//! This is the command-line interface for the Linktide link import and
//! validation engine.

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use linktide::config::{load_config_with_hash, Config};
use linktide::output::{print_history, print_progress, print_summary, MarkdownRunLog, RunSummary};
use linktide::pipeline::RunSnapshot;
use linktide::storage::{RunHistory, SqliteRunLog};
use linktide::workers::{
    candidates_from_bookmarks, BookmarkStore, HttpBookmarkStore, HttpProbe, ImportWorker,
    Operation, ValidationWorker,
};
use linktide::{
    extract, record_run, retry_failed, run_import, run_validation, LinkCandidate, PipelineError,
    PipelineStatus, RawInput, RunConfig,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Linktide: bulk link import and validation
///
/// Linktide extracts links from pasted text or delimited files, imports them
/// as bookmarks or checks their health, and records every run.
#[derive(Parser, Debug)]
#[command(name = "linktide")]
#[command(version)]
#[command(about = "Bulk link import and validation", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import the links of a file as bookmarks
    Import {
        /// File holding the links
        #[arg(long, value_name = "FILE")]
        input: PathBuf,

        #[arg(long, value_enum, default_value_t = InputFormat::Text)]
        format: InputFormat,

        /// Re-run failed links until none is eligible for retry
        #[arg(long)]
        retry: bool,
    },

    /// Check the health of links
    Validate {
        /// File holding the links
        #[arg(long, value_name = "FILE", required_unless_present = "from_library")]
        input: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = InputFormat::Text)]
        format: InputFormat,

        /// Check the links already stored as bookmarks
        #[arg(long, conflicts_with = "input")]
        from_library: bool,

        /// Most bookmarks checked with --from-library
        #[arg(long, default_value_t = 100)]
        limit: usize,

        /// Re-check broken links until none is eligible for retry
        #[arg(long)]
        retry: bool,
    },

    /// Validate the configuration and print it
    CheckConfig,

    /// List recent runs from the run log
    History {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

/// How an input file is read
#[derive(Clone, Copy, Debug, ValueEnum)]
enum InputFormat {
    /// Free text; every URL-like token is a link
    Text,
    /// Comma separated cells
    Csv,
    /// Tab separated cells
    Tsv,
    /// The whole file is one link
    Single,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());

    match cli.command {
        Command::Import {
            input,
            format,
            retry,
        } => handle_import(&config, &config_hash, &input, format, retry, cancel).await,
        Command::Validate {
            input,
            format,
            from_library,
            limit,
            retry,
        } => {
            let source = match input {
                Some(path) if !from_library => Source::File(path, format),
                _ => Source::Library(limit),
            };
            handle_validate(&config, &config_hash, source, retry, cancel).await
        }
        Command::CheckConfig => {
            handle_check_config(&config, &config_hash);
            Ok(())
        }
        Command::History { limit } => handle_history(&config, limit),
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("linktide=info,warn"),
            1 => EnvFilter::new("linktide=debug,info"),
            2 => EnvFilter::new("linktide=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Cancels the run at the next window boundary on Ctrl-C
fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, stopping after the current window");
            cancel.cancel();
        }
    });
}

/// Where validation targets come from
enum Source {
    File(PathBuf, InputFormat),
    Library(usize),
}

async fn read_candidates(path: &Path, format: InputFormat) -> anyhow::Result<Vec<LinkCandidate>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let raw = match format {
        InputFormat::Text => RawInput::Text(content),
        InputFormat::Csv => RawInput::Delimited {
            content,
            delimiter: ',',
        },
        InputFormat::Tsv => RawInput::Delimited {
            content,
            delimiter: '\t',
        },
        InputFormat::Single => RawInput::Single(content),
    };

    let candidates = extract(&raw);
    tracing::info!("Extracted {} unique links from {}", candidates.len(), path.display());
    Ok(candidates)
}

/// Handles the import command
async fn handle_import(
    config: &Config,
    config_hash: &str,
    input: &Path,
    format: InputFormat,
    retry: bool,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let candidates = read_candidates(input, format).await?;

    let store = HttpBookmarkStore::new(&config.bookmark_api, &config.user_agent)?;
    let worker = ImportWorker::new(Arc::new(store), config.import.clone());
    let run_config = RunConfig::from_config(worker, &config.pipeline).with_cancellation(cancel);

    let started_at = Utc::now();
    let snapshot = match run_import(candidates, &run_config, print_progress).await {
        Err(PipelineError::NoLinksFound) => {
            println!("No links found in {}", input.display());
            return Ok(());
        }
        result => result?,
    };
    let snapshot = retry_until_settled(snapshot, &run_config, retry).await?;

    finish_run(
        config,
        config_hash,
        &input.display().to_string(),
        &snapshot,
        started_at,
    )
    .await
}

/// Handles the validate command
async fn handle_validate(
    config: &Config,
    config_hash: &str,
    source: Source,
    retry: bool,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let (candidates, source_name) = match source {
        Source::File(path, format) => (
            read_candidates(&path, format).await?,
            path.display().to_string(),
        ),
        Source::Library(limit) => {
            let store = HttpBookmarkStore::new(&config.bookmark_api, &config.user_agent)?;
            let records = store
                .list(limit)
                .await
                .context("Failed to list bookmarks")?;
            tracing::info!("Loaded {} bookmarks from the library", records.len());
            (candidates_from_bookmarks(&records), "library".to_string())
        }
    };

    let probe = HttpProbe::from_config(&config.validation, &config.user_agent)?;
    let worker = ValidationWorker::from_config(Arc::new(probe), &config.validation);
    let run_config = RunConfig::from_config(worker, &config.pipeline).with_cancellation(cancel);

    let started_at = Utc::now();
    let snapshot = match run_validation(candidates, &run_config, print_progress).await {
        Err(PipelineError::NoLinksFound) => {
            println!("No links found in {}", source_name);
            return Ok(());
        }
        result => result?,
    };
    let snapshot = retry_until_settled(snapshot, &run_config, retry).await?;

    finish_run(config, config_hash, &source_name, &snapshot, started_at).await
}

/// Calls `retry_failed` until no item is eligible, when asked to
async fn retry_until_settled<O: Operation>(
    mut snapshot: RunSnapshot<O::Status>,
    run_config: &RunConfig<O>,
    retry: bool,
) -> Result<RunSnapshot<O::Status>, PipelineError> {
    if !retry {
        let eligible = snapshot.retry_eligible(run_config.max_retries);
        if eligible > 0 {
            println!("{} link(s) can be retried with --retry", eligible);
        }
        return Ok(snapshot);
    }

    loop {
        let eligible = snapshot.retry_eligible(run_config.max_retries);
        if eligible == 0 || snapshot.progress.cancelled {
            return Ok(snapshot);
        }
        println!("Retrying {} link(s)...", eligible);
        snapshot = retry_failed(snapshot, run_config, print_progress).await?;
    }
}

/// Prints the summary and records it in both run logs
async fn finish_run<S: PipelineStatus>(
    config: &Config,
    config_hash: &str,
    source: &str,
    snapshot: &RunSnapshot<S>,
    started_at: DateTime<Utc>,
) -> anyhow::Result<()> {
    let summary = RunSummary::from_snapshot(snapshot, source)
        .with_settings(serde_json::to_value(config)?, config_hash)
        .with_started_at(started_at);

    print_summary(&summary);

    match SqliteRunLog::new(Path::new(&config.output.database_path)) {
        Ok(log) => {
            record_run(&log, &summary).await;
        }
        Err(e) => tracing::warn!("Run log unavailable: {}", e),
    }
    record_run(&MarkdownRunLog::new(&config.output.summary_path), &summary).await;

    Ok(())
}

/// Handles the check-config command: validates config and prints it
fn handle_check_config(config: &Config, config_hash: &str) {
    println!("=== Linktide Configuration ===\n");

    println!("Pipeline:");
    println!("  Concurrency limit: {}", config.pipeline.concurrency_limit);
    println!("  Max retries: {}", config.pipeline.max_retries);

    println!("\nValidation:");
    println!("  Timeout: {}ms", config.validation.timeout_ms);
    println!("  Method: {:?}", config.validation.method);

    println!("\nImport defaults:");
    println!(
        "  Priority: {}",
        config.import.priority.as_deref().unwrap_or("(none)")
    );
    println!("  Categories: {:?}", config.import.category_ids);
    println!("  Tags: {:?}", config.import.tags);

    println!("\nBookmark API:");
    println!("  Base URL: {}", config.bookmark_api.base_url);
    println!(
        "  Token: {}",
        if config.bookmark_api.api_token.is_some() {
            "set"
        } else {
            "not set"
        }
    );
    println!("  Timeout: {}ms", config.bookmark_api.timeout_ms);

    println!("\nUser Agent: {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);
    println!("  Summary: {}", config.output.summary_path);

    println!("\n✓ Configuration is valid (hash: {})", config_hash);
}

/// Handles the history command: lists recent runs
fn handle_history(config: &Config, limit: usize) -> anyhow::Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let log = SqliteRunLog::new(Path::new(&config.output.database_path))?;
    let runs = log.recent_runs(limit)?;
    print_history(&runs);

    Ok(())
}
