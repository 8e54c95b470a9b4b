//! State module for tracking link processing
//!
//! This module provides the per-link records that a run mutates and the two
//! closed status sets they move through.
//!
//! # Components
//!
//! - `PipelineStatus`: The contract both status sets implement
//! - `ImportStatus`: Queued → Processing → Success | Duplicate | Failed | Skipped
//! - `ValidationStatus`: Unknown → Checking → Healthy | Redirect | Broken | Timeout
//! - `LinkItem`: A candidate plus its mutable processing status
//! - `ItemStore`: The ordered collection of items owned by one run

mod import_status;
mod item;
mod store;
mod validation_status;

use serde::Serialize;
use std::fmt::{Debug, Display};
use std::hash::Hash;

// Re-export main types
pub use import_status::ImportStatus;
pub use item::{ItemId, LinkItem, StatusDetails};
pub use store::ItemStore;
pub use validation_status::ValidationStatus;

/// Which run-summary counter a terminal status feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SummaryBucket {
    Success,
    Failed,
    Duplicate,
    Skipped,
}

/// Behaviour shared by the status sets of every pipeline
///
/// A status set has exactly one initial status, one in-flight status, and a
/// number of terminal statuses. Only some terminal statuses are eligible for
/// a retry.
pub trait PipelineStatus:
    Copy + Eq + Hash + Debug + Display + Serialize + Send + Sync + 'static
{
    /// Name of the pipeline this status set belongs to
    fn pipeline_name() -> &'static str;

    /// Status every item is seeded with (and reset to by a retry)
    fn initial() -> Self;

    /// Status an item holds while its operation is running
    fn in_flight() -> Self;

    /// Status counted in the numerator of the success rate
    fn success() -> Self;

    /// Status given to an item whose operation crashed
    fn failure() -> Self;

    /// Every status of the set, in display order
    fn all_states() -> &'static [Self];

    /// Short machine-readable name
    fn as_str(&self) -> &'static str;

    /// Returns true if no further automatic transition happens from this status
    fn is_terminal(&self) -> bool;

    /// Returns true if the Retry Controller may re-queue an item in this status
    fn is_retryable(&self) -> bool;

    /// Summary counter this status feeds, if any
    fn summary_bucket(&self) -> Option<SummaryBucket>;
}
