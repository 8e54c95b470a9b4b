//! Pipeline engine
//!
//! This module ties the item store, the batch scheduler and the retry
//! controller together into the entry points callers use:
//! - `run_import` / `run_validation`: seed a store and process every item
//! - `retry_failed`: re-queue eligible failures of a finished run and process them
//!
//! Every entry point reports progress through a callback after each window
//! and returns the final `RunSnapshot`.

mod classify;
mod progress;
mod retry;
mod scheduler;

pub use classify::{classify_import, classify_probe, Outcome};
pub use progress::{snapshot, Progress, RunSnapshot};
pub use retry::{is_retry_eligible, select_for_retry};
pub use scheduler::BatchScheduler;

use crate::config::PipelineConfig;
use crate::state::{ImportStatus, ItemStore, PipelineStatus, ValidationStatus};
use crate::url::LinkCandidate;
use crate::workers::Operation;
use crate::{PipelineError, Result};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Settings of one run, fixed for its whole duration
pub struct RunConfig<O> {
    /// Window size; values below 1 are treated as 1
    pub concurrency_limit: usize,

    /// How many times one item may be re-queued by `retry_failed`
    pub max_retries: u32,

    pub operation: Arc<O>,

    /// Checked before every window
    pub cancel: CancellationToken,
}

impl<O: Operation> RunConfig<O> {
    pub fn new(operation: O, concurrency_limit: usize, max_retries: u32) -> Self {
        Self {
            concurrency_limit: concurrency_limit.max(1),
            max_retries,
            operation: Arc::new(operation),
            cancel: CancellationToken::new(),
        }
    }

    pub fn from_config(operation: O, config: &PipelineConfig) -> Self {
        Self::new(operation, config.concurrency_limit, config.max_retries)
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

impl<O> Clone for RunConfig<O> {
    fn clone(&self) -> Self {
        Self {
            concurrency_limit: self.concurrency_limit,
            max_retries: self.max_retries,
            operation: Arc::clone(&self.operation),
            cancel: self.cancel.clone(),
        }
    }
}

/// Processes every candidate once
///
/// # Returns
///
/// * `Ok(RunSnapshot)` - Final state of every item, in candidate order
/// * `Err(PipelineError::NoLinksFound)` - `candidates` is empty; nothing was scheduled
pub async fn run<O, F>(
    candidates: Vec<LinkCandidate>,
    config: &RunConfig<O>,
    on_progress: F,
) -> Result<RunSnapshot<O::Status>>
where
    O: Operation,
    F: FnMut(&RunSnapshot<O::Status>),
{
    if candidates.is_empty() {
        return Err(PipelineError::NoLinksFound);
    }

    let mut store = ItemStore::seed(candidates);
    let ids = store.ids();

    tracing::info!(
        "Starting {} run: {} links, {} per window",
        O::Status::pipeline_name(),
        ids.len(),
        config.concurrency_limit
    );

    let progress = BatchScheduler::new(config)
        .run(&mut store, &ids, on_progress)
        .await?;
    let result = snapshot(store.items(), progress);

    tracing::info!(
        "{} run finished: {}/{} succeeded ({:.1}%)",
        O::Status::pipeline_name(),
        result.count(O::Status::success()),
        result.total,
        result.success_rate * 100.0
    );

    Ok(result)
}

/// Creates a bookmark for every candidate
///
/// # Example
///
/// ```no_run
/// use linktide::config::{BookmarkApiConfig, ImportConfig, UserAgentConfig};
/// use linktide::workers::{HttpBookmarkStore, ImportWorker};
/// use linktide::{extract, run_import, RawInput, RunConfig};
/// use std::sync::Arc;
///
/// # async fn example(api: BookmarkApiConfig, ua: UserAgentConfig) -> linktide::Result<()> {
/// let store = HttpBookmarkStore::new(&api, &ua)?;
/// let worker = ImportWorker::new(Arc::new(store), ImportConfig::default());
/// let candidates = extract(&RawInput::Text("example.com and https://foo.org".into()));
///
/// let snapshot = run_import(candidates, &RunConfig::new(worker, 5, 2), |snap| {
///     println!("{}%", snap.progress.percent);
/// })
/// .await?;
/// println!("{} imported", snapshot.total);
/// # Ok(())
/// # }
/// ```
pub async fn run_import<O, F>(
    candidates: Vec<LinkCandidate>,
    config: &RunConfig<O>,
    on_progress: F,
) -> Result<RunSnapshot<ImportStatus>>
where
    O: Operation<Status = ImportStatus>,
    F: FnMut(&RunSnapshot<ImportStatus>),
{
    run(candidates, config, on_progress).await
}

/// Probes the health of every candidate
pub async fn run_validation<O, F>(
    candidates: Vec<LinkCandidate>,
    config: &RunConfig<O>,
    on_progress: F,
) -> Result<RunSnapshot<ValidationStatus>>
where
    O: Operation<Status = ValidationStatus>,
    F: FnMut(&RunSnapshot<ValidationStatus>),
{
    run(candidates, config, on_progress).await
}

/// Re-runs the retry-eligible items of a finished run
///
/// Only items in a retryable status with `attempts < max_retries` are
/// re-queued and processed; every other item is carried over untouched. When
/// nothing is eligible the previous run is returned unchanged with an empty,
/// complete pass.
///
/// A re-queued item the pass never reached because of cancellation gets its
/// previous status back and keeps its attempt, so it stays eligible.
pub async fn retry_failed<O, F>(
    previous: RunSnapshot<O::Status>,
    config: &RunConfig<O>,
    on_progress: F,
) -> Result<RunSnapshot<O::Status>>
where
    O: Operation,
    F: FnMut(&RunSnapshot<O::Status>),
{
    if config.cancel.is_cancelled() {
        tracing::warn!(
            "{} retry not started: run is cancelled",
            O::Status::pipeline_name()
        );
        let mut progress = Progress::new(0);
        progress.cancelled = true;
        return Ok(snapshot(&previous.items, progress));
    }

    let mut store = ItemStore::from_items(previous.items);
    let before = store.clone();
    let selected = select_for_retry(&mut store, config.max_retries)?;

    if selected.is_empty() {
        tracing::info!("No {} items eligible for retry", O::Status::pipeline_name());
        return Ok(snapshot(store.items(), Progress::new(0)));
    }

    tracing::info!(
        "Retrying {} {} item(s)",
        selected.len(),
        O::Status::pipeline_name()
    );

    let progress = BatchScheduler::new(config)
        .run(&mut store, &selected, on_progress)
        .await?;

    let unreached = &selected[progress.processed.min(selected.len())..];
    if !unreached.is_empty() {
        tracing::warn!(
            "Retry cancelled, restoring {} unprocessed {} item(s)",
            unreached.len(),
            O::Status::pipeline_name()
        );
    }
    for &id in unreached {
        let item = before
            .get(id)
            .cloned()
            .ok_or(PipelineError::UnknownItem(id.0))?;
        store.restore(item)?;
    }

    Ok(snapshot(store.items(), progress))
}
