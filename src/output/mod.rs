//! Output module for run summaries and reports
//!
//! This module handles:
//! - Reducing a finished run to a `RunSummary`
//! - Writing summaries to run logs (markdown report, SQLite history)
//! - Printing progress and statistics to the console

mod markdown;
pub mod stats;
mod traits;

pub use markdown::{format_markdown_summary, MarkdownRunLog};
pub use stats::{format_progress, print_history, print_progress, print_summary};
pub use traits::{OutputError, OutputResult, RunLog, RunSummary, SummaryItem};

/// Appends a summary to a run log without letting a failure reach the run
///
/// # Returns
///
/// `true` if the summary was written; a failure is logged and `false` is
/// returned.
pub async fn record_run(log: &dyn RunLog, summary: &RunSummary) -> bool {
    match log.append(summary).await {
        Ok(()) => {
            tracing::info!("Recorded {} run in {}", summary.pipeline, log.name());
            true
        }
        Err(e) => {
            tracing::warn!("Failed to record run in {}: {}", log.name(), e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;

    struct BrokenLog;

    #[async_trait]
    impl RunLog for BrokenLog {
        fn name(&self) -> &str {
            "broken"
        }

        async fn append(&self, _summary: &RunSummary) -> OutputResult<()> {
            Err(OutputError::Write("endpoint down".to_string()))
        }
    }

    fn empty_summary() -> RunSummary {
        RunSummary {
            pipeline: "import".to_string(),
            source: "test".to_string(),
            total_links: 0,
            success_count: 0,
            failed_count: 0,
            duplicate_count: 0,
            skipped_count: 0,
            status_counts: vec![],
            success_rate: 0.0,
            cancelled: false,
            items: vec![],
            settings_used: serde_json::Value::Null,
            settings_hash: String::new(),
            started_at: Utc::now(),
            finished_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_record_run_swallows_failure() {
        assert!(!record_run(&BrokenLog, &empty_summary()).await);
    }

    #[tokio::test]
    async fn test_record_run_to_markdown() {
        let dir = tempfile::tempdir().unwrap();
        let log = MarkdownRunLog::new(dir.path().join("out.md"));
        assert!(record_run(&log, &empty_summary()).await);
    }
}
