//! Markdown run report
//!
//! This module renders a run summary as a human-readable markdown report,
//! including counters, the per-status breakdown and the failed links.

use crate::output::traits::{OutputResult, RunLog, RunSummary, SummaryItem};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Most failed links listed in one report
const MAX_LISTED_FAILURES: usize = 100;

/// Writes the summary of the latest run to a markdown file
///
/// Each append replaces the previous report.
pub struct MarkdownRunLog {
    path: PathBuf,
}

impl MarkdownRunLog {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl RunLog for MarkdownRunLog {
    fn name(&self) -> &str {
        "markdown report"
    }

    async fn append(&self, summary: &RunSummary) -> OutputResult<()> {
        let markdown = format_markdown_summary(summary);
        tokio::fs::write(&self.path, markdown).await?;
        tracing::debug!("Wrote run report to {}", self.path.display());
        Ok(())
    }
}

/// Formats a run summary as markdown
///
/// # Arguments
///
/// * `summary` - The run summary
///
/// # Returns
///
/// A formatted markdown string
pub fn format_markdown_summary(summary: &RunSummary) -> String {
    let mut md = String::new();

    md.push_str(&format!(
        "# Linktide {} Summary\n\n",
        capitalize(&summary.pipeline)
    ));

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Source**: {}\n", summary.source));
    md.push_str(&format!("- **Started**: {}\n", summary.started_at.to_rfc3339()));
    md.push_str(&format!(
        "- **Finished**: {}\n",
        summary.finished_at.to_rfc3339()
    ));
    md.push_str(&format!(
        "- **Duration**: {} seconds\n",
        summary.duration_seconds()
    ));
    if summary.cancelled {
        md.push_str("- **Status**: cancelled before completion\n");
    }
    if !summary.settings_hash.is_empty() {
        md.push_str(&format!("- **Config Hash**: {}\n", summary.settings_hash));
    }
    md.push('\n');

    // Counters
    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!("- **Total Links**: {}\n", summary.total_links));
    md.push_str(&format!("- **Succeeded**: {}\n", summary.success_count));
    md.push_str(&format!("- **Failed**: {}\n", summary.failed_count));
    if summary.pipeline == "import" {
        md.push_str(&format!("- **Duplicates**: {}\n", summary.duplicate_count));
        md.push_str(&format!("- **Skipped**: {}\n", summary.skipped_count));
    }
    md.push_str(&format!(
        "- **Success Rate**: {:.2}%\n\n",
        summary.success_rate * 100.0
    ));

    // Status breakdown
    md.push_str("## Status Breakdown\n\n");
    md.push_str("| Status | Count |\n");
    md.push_str("|--------|-------|\n");
    for (status, count) in &summary.status_counts {
        md.push_str(&format!("| {} | {} |\n", status, count));
    }
    md.push('\n');

    // Redirects
    let redirects: Vec<&SummaryItem> = summary
        .items
        .iter()
        .filter(|item| item.redirect_target.is_some())
        .collect();
    if !redirects.is_empty() {
        md.push_str("## Redirects\n\n");
        md.push_str("| URL | Target |\n");
        md.push_str("|-----|--------|\n");
        for item in redirects {
            md.push_str(&format!(
                "| {} | {} |\n",
                item.normalized_url,
                item.redirect_target.as_deref().unwrap_or("")
            ));
        }
        md.push('\n');
    }

    // Failures
    let failures: Vec<&SummaryItem> = summary
        .items
        .iter()
        .filter(|item| item.error.is_some())
        .collect();
    if !failures.is_empty() {
        md.push_str("## Problems\n\n");
        md.push_str("| URL | Status | Attempts | Error |\n");
        md.push_str("|-----|--------|----------|-------|\n");
        for item in failures.iter().take(MAX_LISTED_FAILURES) {
            md.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                item.normalized_url,
                item.status,
                item.attempts,
                escape_cell(item.error.as_deref().unwrap_or(""))
            ));
        }
        if failures.len() > MAX_LISTED_FAILURES {
            md.push_str(&format!(
                "\n_...and {} more_\n",
                failures.len() - MAX_LISTED_FAILURES
            ));
        }
        md.push('\n');
    }

    md
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn escape_cell(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ")
}
