//! Window scheduler
//!
//! This module drives one pass over a set of items:
//! - Splitting the ids into consecutive windows of `concurrency_limit`
//! - Spawning one task per item of a window, then waiting for all of them
//! - Writing every classified outcome back into the store
//! - Publishing a fresh snapshot after each window
//! - Stopping at a window boundary when the run is cancelled

use crate::pipeline::classify::classify_crash;
use crate::pipeline::progress::{snapshot, Progress, RunSnapshot};
use crate::pipeline::RunConfig;
use crate::state::{ItemId, ItemStore, PipelineStatus, StatusDetails};
use crate::workers::Operation;
use crate::{PipelineError, Result};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// Runs items through an operation, one window at a time
pub struct BatchScheduler<O> {
    concurrency_limit: usize,
    operation: Arc<O>,
    cancel: CancellationToken,
}

impl<O: Operation> BatchScheduler<O> {
    pub fn new(config: &RunConfig<O>) -> Self {
        Self {
            concurrency_limit: config.concurrency_limit.max(1),
            operation: Arc::clone(&config.operation),
            cancel: config.cancel.clone(),
        }
    }

    /// Processes `ids` in order
    ///
    /// Each window is fully resolved before the next one starts, so at most
    /// `concurrency_limit` operations are ever in flight and the store is only
    /// written between windows.
    ///
    /// # Arguments
    ///
    /// * `store` - The items of the run
    /// * `ids` - The items to process in this pass, in submission order
    /// * `on_progress` - Called with a fresh snapshot after every window
    ///
    /// # Returns
    ///
    /// * `Ok(Progress)` - Progress of the pass, flagged if it was cancelled
    /// * `Err(PipelineError::UnknownItem)` - An id is not in the store
    pub async fn run<F>(
        &self,
        store: &mut ItemStore<O::Status>,
        ids: &[ItemId],
        mut on_progress: F,
    ) -> Result<Progress>
    where
        F: FnMut(&RunSnapshot<O::Status>),
    {
        let mut progress = Progress::new(ids.len());
        let window_count = ids.len().div_ceil(self.concurrency_limit);

        for (index, window) in ids.chunks(self.concurrency_limit).enumerate() {
            if self.cancel.is_cancelled() {
                tracing::warn!(
                    "{} run cancelled before window {}/{} ({} of {} items processed)",
                    O::Status::pipeline_name(),
                    index + 1,
                    window_count,
                    progress.processed,
                    progress.pass_total
                );
                progress.cancelled = true;
                on_progress(&snapshot(store.items(), progress));
                break;
            }

            let started = Instant::now();
            self.run_window(store, window).await?;
            progress.advance(window.len());

            let snap = snapshot(store.items(), progress);
            tracing::info!(
                "Window {}/{} done in {:?}: {}/{} processed ({}%)",
                index + 1,
                window_count,
                started.elapsed(),
                progress.processed,
                progress.pass_total,
                progress.percent
            );
            on_progress(&snap);
        }

        Ok(progress)
    }

    async fn run_window(&self, store: &mut ItemStore<O::Status>, window: &[ItemId]) -> Result<()> {
        // Resolve the whole window before touching any status
        let candidates = window
            .iter()
            .map(|&id| {
                store
                    .get(id)
                    .map(|item| (id, item.candidate.clone()))
                    .ok_or(PipelineError::UnknownItem(id.0))
            })
            .collect::<Result<Vec<_>>>()?;

        for &id in window {
            store.update_status(id, O::Status::in_flight(), StatusDetails::default())?;
        }

        // Every task is spawned before any of them is awaited
        let mut handles = Vec::with_capacity(candidates.len());
        for (id, candidate) in candidates {
            let operation = Arc::clone(&self.operation);
            let handle = tokio::spawn(async move { operation.execute(&candidate).await });
            handles.push((id, handle));
        }

        let results = join_all(
            handles
                .into_iter()
                .map(|(id, handle)| async move { (id, handle.await) }),
        )
        .await;

        for (id, joined) in results {
            let outcome = joined.unwrap_or_else(|e| {
                tracing::warn!("Worker for item {} did not return: {}", id, e);
                classify_crash(e)
            });
            tracing::debug!("Item {} -> {}", id, outcome.status);
            store.update_status(id, outcome.status, outcome.details)?;
        }

        Ok(())
    }
}
