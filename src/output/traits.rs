//! Run log traits and types
//!
//! This module defines the trait interface for run logs and the summary
//! record every finished run is reduced to.

use crate::pipeline::RunSnapshot;
use crate::state::{LinkItem, PipelineStatus, SummaryBucket};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur while writing a run log
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Final state of one link, as recorded in a run log
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryItem {
    /// Position in the original candidate list
    pub position: usize,
    pub raw_input: String,
    pub normalized_url: String,
    pub domain: String,
    pub status: String,
    pub attempts: u32,
    pub error: Option<String>,
    pub title: Option<String>,
    pub redirect_target: Option<String>,
    pub status_code: Option<u16>,
    pub latency_ms: Option<u64>,
}

impl<S: PipelineStatus> From<&LinkItem<S>> for SummaryItem {
    fn from(item: &LinkItem<S>) -> Self {
        Self {
            position: item.id.0,
            raw_input: item.candidate.raw_input.clone(),
            normalized_url: item.candidate.normalized_url.clone(),
            domain: item.candidate.domain.clone(),
            status: item.status.as_str().to_string(),
            attempts: item.attempts,
            error: item.last_error.clone(),
            title: item.result_title.clone(),
            redirect_target: item.redirect_target.clone(),
            status_code: item.status_code,
            latency_ms: item.latency_ms,
        }
    }
}

/// Summary of one finished run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// "import" or "validation"
    pub pipeline: String,

    /// Where the links came from (file path, "library", ...)
    pub source: String,

    pub total_links: usize,
    pub success_count: usize,
    pub failed_count: usize,
    pub duplicate_count: usize,
    pub skipped_count: usize,

    /// Count per status, including statuses that feed no counter above
    pub status_counts: Vec<(String, usize)>,

    pub success_rate: f64,
    pub cancelled: bool,
    pub items: Vec<SummaryItem>,

    /// Settings the run was started with
    pub settings_used: serde_json::Value,
    pub settings_hash: String,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunSummary {
    /// Reduces a snapshot to a summary
    ///
    /// For validation runs `Healthy` is counted as success and `Broken` plus
    /// `Timeout` as failed; `Redirect` only shows up in `status_counts`.
    pub fn from_snapshot<S: PipelineStatus>(
        snapshot: &RunSnapshot<S>,
        source: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            pipeline: S::pipeline_name().to_string(),
            source: source.into(),
            total_links: snapshot.total,
            success_count: snapshot.bucket_count(SummaryBucket::Success),
            failed_count: snapshot.bucket_count(SummaryBucket::Failed),
            duplicate_count: snapshot.bucket_count(SummaryBucket::Duplicate),
            skipped_count: snapshot.bucket_count(SummaryBucket::Skipped),
            status_counts: snapshot
                .counts
                .iter()
                .map(|(status, n)| (status.as_str().to_string(), *n))
                .collect(),
            success_rate: snapshot.success_rate,
            cancelled: snapshot.progress.cancelled,
            items: snapshot.items.iter().map(SummaryItem::from).collect(),
            settings_used: serde_json::Value::Null,
            settings_hash: String::new(),
            started_at: now,
            finished_at: now,
        }
    }

    pub fn with_settings(mut self, settings: serde_json::Value, hash: impl Into<String>) -> Self {
        self.settings_used = settings;
        self.settings_hash = hash.into();
        self
    }

    pub fn with_started_at(mut self, started_at: DateTime<Utc>) -> Self {
        self.started_at = started_at;
        self
    }

    pub fn status_count(&self, status: &str) -> usize {
        self.status_counts
            .iter()
            .find(|(s, _)| s == status)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }

    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }
}

/// Audit trail of finished runs
///
/// Appending is fire-and-forget from the engine's point of view: callers go
/// through [`crate::output::record_run`], which logs and swallows failures.
#[async_trait]
pub trait RunLog: Send + Sync {
    /// Short name used in log messages
    fn name(&self) -> &str;

    async fn append(&self, summary: &RunSummary) -> OutputResult<()>;
}
