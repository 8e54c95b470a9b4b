//! Console statistics
//!
//! This module prints run progress, run summaries and the run history to
//! stdout.

use crate::output::traits::RunSummary;
use crate::pipeline::RunSnapshot;
use crate::state::PipelineStatus;
use crate::storage::RunRecord;

/// Formats the one-line progress report printed after each window
pub fn format_progress<S: PipelineStatus>(snapshot: &RunSnapshot<S>) -> String {
    let counts: Vec<String> = snapshot
        .counts
        .iter()
        .filter(|(status, n)| *n > 0 && status.is_terminal())
        .map(|(status, n)| format!("{} {}", status, n))
        .collect();

    format!(
        "[{:>3}%] {}/{} processed{}{}",
        snapshot.progress.percent,
        snapshot.progress.processed,
        snapshot.progress.pass_total,
        if counts.is_empty() { "" } else { " | " },
        counts.join(", ")
    )
}

/// Prints the progress line for a snapshot
pub fn print_progress<S: PipelineStatus>(snapshot: &RunSnapshot<S>) {
    println!("{}", format_progress(snapshot));
}

/// Prints a run summary to stdout in a formatted manner
///
/// # Arguments
///
/// * `summary` - The summary to display
pub fn print_summary(summary: &RunSummary) {
    println!("\n=== {} run: {} ===\n", summary.pipeline, summary.source);

    println!("Overview:");
    println!("  Total links: {}", summary.total_links);
    println!("  Succeeded: {}", summary.success_count);
    println!("  Failed: {}", summary.failed_count);
    if summary.pipeline == "import" {
        println!("  Duplicates: {}", summary.duplicate_count);
        println!("  Skipped: {}", summary.skipped_count);
    }
    println!();

    println!("Links by Status:");
    let mut counts: Vec<_> = summary
        .status_counts
        .iter()
        .filter(|(_, n)| *n > 0)
        .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1));

    for (status, count) in counts {
        let percentage = if summary.total_links > 0 {
            (*count as f64 / summary.total_links as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", status, count, percentage);
    }
    println!();

    if summary.cancelled {
        println!("Run was cancelled; unprocessed links kept their initial status.\n");
    }

    println!(
        "Success Rate: {:.1}% ({} / {} links)",
        summary.success_rate * 100.0,
        summary.success_count,
        summary.total_links
    );
}

/// Prints recent runs from the run log
pub fn print_history(runs: &[RunRecord]) {
    if runs.is_empty() {
        println!("No runs recorded yet.");
        return;
    }

    println!(
        "{:>5}  {:<10}  {:<25}  {:>6}  {:>7}  {:>6}  {:>4}  {:>7}",
        "ID", "PIPELINE", "STARTED", "TOTAL", "SUCCESS", "FAILED", "DUP", "SKIPPED"
    );
    for run in runs {
        println!(
            "{:>5}  {:<10}  {:<25}  {:>6}  {:>7}  {:>6}  {:>4}  {:>7}",
            run.id,
            run.pipeline,
            run.started_at,
            run.total_links,
            run.success_count,
            run.failed_count,
            run.duplicate_count,
            run.skipped_count
        );
    }
}
