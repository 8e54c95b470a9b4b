use crate::state::{LinkItem, PipelineStatus, SummaryBucket};
use serde::Serialize;

/// Progress of one scheduler pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    /// Items of this pass that reached a status
    pub processed: usize,

    /// Items scheduled in this pass
    pub pass_total: usize,

    /// `processed / pass_total` rounded to a whole percent
    pub percent: u8,

    /// The pass stopped at a window boundary because it was cancelled
    pub cancelled: bool,
}

impl Progress {
    pub fn new(pass_total: usize) -> Self {
        Self {
            processed: 0,
            pass_total,
            percent: percent_of(0, pass_total),
            cancelled: false,
        }
    }

    /// Records a finished window
    pub fn advance(&mut self, window_len: usize) {
        self.processed = (self.processed + window_len).min(self.pass_total);
        self.percent = percent_of(self.processed, self.pass_total);
    }

    pub fn is_complete(&self) -> bool {
        self.processed >= self.pass_total
    }
}

fn percent_of(processed: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((processed as f64 / total as f64) * 100.0).round() as u8
}

/// Point-in-time view of a run
///
/// Always rebuilt from the item list by [`snapshot`], never patched, so the
/// per-status counts add up to `total` however far the run got.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSnapshot<S> {
    pub total: usize,

    /// One entry per status of the pipeline, in declaration order
    pub counts: Vec<(S, usize)>,

    /// Share of items in the pipeline's success status; 0 for an empty run
    pub success_rate: f64,

    /// Every item, in original candidate order
    pub items: Vec<LinkItem<S>>,

    pub progress: Progress,
}

impl<S: PipelineStatus> RunSnapshot<S> {
    pub fn count(&self, status: S) -> usize {
        self.counts
            .iter()
            .find(|(s, _)| *s == status)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }

    /// Number of items whose status feeds the given summary counter
    pub fn bucket_count(&self, bucket: SummaryBucket) -> usize {
        self.counts
            .iter()
            .filter(|(s, _)| s.summary_bucket() == Some(bucket))
            .map(|(_, n)| n)
            .sum()
    }

    /// Number of items a retry with this ceiling would re-queue
    pub fn retry_eligible(&self, max_retries: u32) -> usize {
        self.items
            .iter()
            .filter(|item| super::retry::is_retry_eligible(item, max_retries))
            .count()
    }

    /// Every item holds a terminal status
    pub fn is_settled(&self) -> bool {
        self.items.iter().all(|item| item.status.is_terminal())
    }
}

/// Recomputes a snapshot from the current items
pub fn snapshot<S: PipelineStatus>(items: &[LinkItem<S>], progress: Progress) -> RunSnapshot<S> {
    let counts: Vec<(S, usize)> = S::all_states()
        .iter()
        .map(|state| {
            let n = items.iter().filter(|item| item.status == *state).count();
            (*state, n)
        })
        .collect();

    let total = items.len();
    let successes = items
        .iter()
        .filter(|item| item.status == S::success())
        .count();
    let success_rate = if total == 0 {
        0.0
    } else {
        successes as f64 / total as f64
    };

    RunSnapshot {
        total,
        counts,
        success_rate,
        items: items.to_vec(),
        progress,
    }
}
