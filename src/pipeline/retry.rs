use crate::state::{ItemId, ItemStore, LinkItem, PipelineStatus};
use crate::Result;

/// Whether a retry with this ceiling would re-queue the item
pub fn is_retry_eligible<S: PipelineStatus>(item: &LinkItem<S>, max_retries: u32) -> bool {
    item.status.is_retryable() && item.attempts < max_retries
}

/// Re-queues every retry-eligible item
///
/// Each selected item gets `attempts += 1` and goes back to the pipeline's
/// initial status. Items at the ceiling keep their failure status.
///
/// # Returns
///
/// The ids of the re-queued items, in original order
pub fn select_for_retry<S: PipelineStatus>(
    store: &mut ItemStore<S>,
    max_retries: u32,
) -> Result<Vec<ItemId>> {
    let selected: Vec<ItemId> = store
        .selectable(|item| is_retry_eligible(item, max_retries))
        .iter()
        .map(|item| item.id)
        .collect();

    for &id in &selected {
        store.requeue(id)?;
    }

    let exhausted = store
        .selectable(|item| item.status.is_retryable())
        .len();
    if exhausted > 0 {
        tracing::info!(
            "{} {} item(s) reached the retry ceiling of {}",
            exhausted,
            S::pipeline_name(),
            max_retries
        );
    }

    Ok(selected)
}
