//! Integration tests for the pipeline engine
//!
//! These tests drive full runs through `run_import`, `run_validation` and
//! `retry_failed` with in-process operations, and check the run-level
//! guarantees: bounded concurrency, ordering, snapshot consistency, retry
//! ceilings and failure isolation.

use async_trait::async_trait;
use linktide::pipeline::Outcome;
use linktide::state::StatusDetails;
use linktide::workers::{operation_fn, LinkProbe, ProbeResult, ValidationWorker};
use linktide::{
    extract, retry_failed, run_import, run_validation, ImportStatus, LinkCandidate,
    PipelineError, PipelineStatus, RawInput, RunConfig, RunSnapshot, ValidationStatus,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn candidates(domains: &[&str]) -> Vec<LinkCandidate> {
    domains.iter().map(|d| LinkCandidate::new(d)).collect()
}

fn statuses<S: PipelineStatus>(snapshot: &RunSnapshot<S>) -> Vec<S> {
    snapshot.items.iter().map(|item| item.status).collect()
}

/// Tracks how many operations are running at once
#[derive(Default)]
struct InFlight {
    current: AtomicUsize,
    max: AtomicUsize,
}

impl InFlight {
    fn enter(&self) {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.max.fetch_max(now, Ordering::SeqCst);
    }

    fn leave(&self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }
}

#[tokio::test]
async fn test_import_all_succeed_with_bounded_concurrency() {
    let in_flight = Arc::new(InFlight::default());
    let tracker = Arc::clone(&in_flight);
    let config = RunConfig::new(
        operation_fn(move |_| {
            let tracker = Arc::clone(&tracker);
            async move {
                tracker.enter();
                tokio::time::sleep(Duration::from_millis(20)).await;
                tracker.leave();
                Outcome::new(ImportStatus::Success)
            }
        }),
        2,
        0,
    );

    let mut processing_between_windows = Vec::new();
    let snapshot = run_import(
        candidates(&["a.com", "b.com", "c.com", "d.com", "e.com"]),
        &config,
        |snap| processing_between_windows.push(snap.count(ImportStatus::Processing)),
    )
    .await
    .unwrap();

    assert_eq!(snapshot.total, 5);
    assert_eq!(snapshot.count(ImportStatus::Success), 5);
    for status in [
        ImportStatus::Queued,
        ImportStatus::Processing,
        ImportStatus::Duplicate,
        ImportStatus::Failed,
        ImportStatus::Skipped,
    ] {
        assert_eq!(snapshot.count(status), 0, "{} should be empty", status);
    }
    assert_eq!(snapshot.success_rate, 1.0);

    assert!(in_flight.max.load(Ordering::SeqCst) <= 2);
    assert_eq!(in_flight.max.load(Ordering::SeqCst), 2);
    assert_eq!(processing_between_windows, vec![0, 0, 0]);
}

#[tokio::test]
async fn test_import_conflict_becomes_duplicate() {
    let config = RunConfig::new(
        operation_fn(|candidate: LinkCandidate| async move {
            if candidate.domain == "c.com" {
                Outcome::new(ImportStatus::Duplicate)
            } else {
                Outcome::new(ImportStatus::Success)
            }
        }),
        2,
        0,
    );

    let snapshot = run_import(
        candidates(&["a.com", "b.com", "c.com", "d.com", "e.com"]),
        &config,
        |_| {},
    )
    .await
    .unwrap();

    assert_eq!(
        statuses(&snapshot),
        vec![
            ImportStatus::Success,
            ImportStatus::Success,
            ImportStatus::Duplicate,
            ImportStatus::Success,
            ImportStatus::Success,
        ]
    );
    assert!(snapshot.items[2].last_error.is_none());
}

/// Answers 200 for every link except `slow.com`, which never answers
struct SlowForOne;

#[async_trait]
impl LinkProbe for SlowForOne {
    async fn probe(&self, url: &str) -> ProbeResult {
        if url.contains("slow.com") {
            tokio::time::sleep(Duration::from_secs(30)).await;
        }
        ProbeResult::Response {
            status_code: 200,
            location: None,
            latency: Duration::from_millis(5),
        }
    }
}

#[tokio::test]
async fn test_validation_timeout_excluded_from_success_rate() {
    let worker = ValidationWorker::new(Arc::new(SlowForOne), Duration::from_millis(100));
    let config = RunConfig::new(worker, 3, 0);

    let snapshot = run_validation(
        candidates(&["fast.com", "slow.com", "quick.org", "swift.net"]),
        &config,
        |_| {},
    )
    .await
    .unwrap();

    assert_eq!(snapshot.items[1].status, ValidationStatus::Timeout);
    assert_eq!(snapshot.count(ValidationStatus::Healthy), 3);
    assert_eq!(snapshot.count(ValidationStatus::Timeout), 1);
    assert!((snapshot.success_rate - 0.75).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_retry_ceiling_is_respected() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let config = RunConfig::new(
        operation_fn(move |candidate: LinkCandidate| {
            let counter = Arc::clone(&counter);
            async move {
                if candidate.domain == "flaky.com" {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Outcome::new(ImportStatus::Failed)
                        .with_details(StatusDetails::error("HTTP 503"))
                } else {
                    Outcome::new(ImportStatus::Success)
                }
            }
        }),
        2,
        1,
    );

    let first = run_import(candidates(&["ok.com", "flaky.com"]), &config, |_| {})
        .await
        .unwrap();
    assert_eq!(first.items[1].status, ImportStatus::Failed);
    assert_eq!(first.items[1].attempts, 0);
    assert_eq!(first.retry_eligible(1), 1);

    // First retry re-queues the item once
    let mut requeued_seen = false;
    let second = retry_failed(first, &config, |snap| {
        requeued_seen |= snap.progress.pass_total == 1;
    })
    .await
    .unwrap();
    assert!(requeued_seen);
    assert_eq!(second.items[1].status, ImportStatus::Failed);
    assert_eq!(second.items[1].attempts, 1);
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    // Second retry finds the item at its ceiling
    let third = retry_failed(second, &config, |_| panic!("nothing should be scheduled"))
        .await
        .unwrap();
    assert_eq!(third.items[1].status, ImportStatus::Failed);
    assert_eq!(third.items[1].attempts, 1);
    assert_eq!(third.items[1].last_error.as_deref(), Some("HTTP 503"));
    assert_eq!(third.items[0].status, ImportStatus::Success);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_retry_after_cancellation_keeps_failures() {
    let cancel = CancellationToken::new();
    let config = RunConfig::new(
        operation_fn(|_| async {
            Outcome::new(ImportStatus::Failed).with_details(StatusDetails::error("HTTP 502"))
        }),
        2,
        3,
    )
    .with_cancellation(cancel.clone());

    let first = run_import(candidates(&["a.com", "b.com"]), &config, |_| {})
        .await
        .unwrap();
    assert_eq!(first.count(ImportStatus::Failed), 2);

    cancel.cancel();
    let after = retry_failed(first, &config, |_| panic!("nothing should be scheduled"))
        .await
        .unwrap();

    assert!(after.progress.cancelled);
    assert_eq!(after.count(ImportStatus::Failed), 2);
    assert_eq!(after.count(ImportStatus::Queued), 0);
    assert!(after.items.iter().all(|item| item.attempts == 0));
    assert_eq!(after.retry_eligible(3), 2);
}

#[tokio::test]
async fn test_retry_cancelled_mid_pass_restores_unreached_items() {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let config = RunConfig::new(
        operation_fn(move |_| {
            // The first retry call cancels the run
            if counter.fetch_add(1, Ordering::SeqCst) == 3 {
                trigger.cancel();
            }
            async { Outcome::new(ImportStatus::Failed).with_details(StatusDetails::error("HTTP 502")) }
        }),
        1,
        3,
    )
    .with_cancellation(cancel);

    let first = run_import(candidates(&["a.com", "b.com", "c.com"]), &config, |_| {})
        .await
        .unwrap();

    let after = retry_failed(first, &config, |_| {}).await.unwrap();

    assert!(after.progress.cancelled);
    assert_eq!(after.progress.processed, 1);
    assert_eq!(after.count(ImportStatus::Failed), 3);
    assert_eq!(
        after.items.iter().map(|item| item.attempts).collect::<Vec<_>>(),
        vec![1, 0, 0]
    );
    assert!(after
        .items
        .iter()
        .all(|item| item.last_error.as_deref() == Some("HTTP 502")));
    assert_eq!(after.retry_eligible(3), 3);
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_empty_input_reports_no_links() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let config = RunConfig::new(
        operation_fn(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Outcome::new(ImportStatus::Success) }
        }),
        2,
        0,
    );

    let candidates = extract(&RawInput::Text("   \n\t ".to_string()));
    assert!(candidates.is_empty());

    let result = run_import(candidates, &config, |_| {}).await;
    assert!(matches!(result, Err(PipelineError::NoLinksFound)));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_final_order_matches_extraction_order() {
    let input = RawInput::Text(
        "Read https://slowest.io first, then mid.org, then www.fastest.dev/page".to_string(),
    );
    let extracted = extract(&input);
    let expected: Vec<String> = extracted.iter().map(|c| c.normalized_url.clone()).collect();
    assert_eq!(expected.len(), 3);

    // Earlier items finish later, so completion order is reversed
    let config = RunConfig::new(
        operation_fn(|candidate: LinkCandidate| async move {
            let delay = match candidate.domain.as_str() {
                "slowest.io" => 60,
                "mid.org" => 30,
                _ => 0,
            };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Outcome::new(ImportStatus::Success)
        }),
        3,
        0,
    );

    let snapshot = run_import(extracted, &config, |_| {}).await.unwrap();
    let actual: Vec<String> = snapshot
        .items
        .iter()
        .map(|item| item.candidate.normalized_url.clone())
        .collect();
    assert_eq!(actual, expected);
}

#[tokio::test]
async fn test_every_snapshot_is_consistent() {
    let config = RunConfig::new(
        operation_fn(|candidate: LinkCandidate| async move {
            match candidate.domain.len() % 3 {
                0 => Outcome::new(ValidationStatus::Healthy),
                1 => Outcome::new(ValidationStatus::Broken),
                _ => Outcome::new(ValidationStatus::Redirect),
            }
        }),
        3,
        0,
    );

    let seen = Mutex::new(Vec::new());
    let snapshot = run_validation(
        candidates(&[
            "a.io", "bb.io", "ccc.io", "dddd.io", "eeeee.io", "ffffff.io", "g.io",
        ]),
        &config,
        |snap| {
            let sum: usize = snap.counts.iter().map(|(_, n)| n).sum();
            seen.lock().unwrap().push((sum, snap.total, snap.progress.percent));
        },
    )
    .await
    .unwrap();

    let seen = seen.into_inner().unwrap();
    assert_eq!(seen.len(), 3);
    for (sum, total, _) in &seen {
        assert_eq!(sum, total);
    }
    assert_eq!(
        seen.iter().map(|(_, _, p)| *p).collect::<Vec<_>>(),
        vec![43, 86, 100]
    );
    assert!(snapshot.is_settled());
}

#[tokio::test]
async fn test_panicking_worker_is_isolated() {
    let config = RunConfig::new(
        operation_fn(|candidate: LinkCandidate| async move {
            if candidate.domain == "boom.com" {
                panic!("unexpected payload");
            }
            Outcome::new(ImportStatus::Success)
        }),
        3,
        2,
    );

    let snapshot = run_import(candidates(&["a.com", "boom.com", "c.com"]), &config, |_| {})
        .await
        .unwrap();

    assert_eq!(
        statuses(&snapshot),
        vec![
            ImportStatus::Success,
            ImportStatus::Failed,
            ImportStatus::Success,
        ]
    );
    assert_eq!(
        snapshot.items[1].last_error.as_deref(),
        Some("Worker panicked: unexpected payload")
    );
    assert_eq!(snapshot.retry_eligible(2), 1);
}
