//! Storage traits and error types
//!
//! This module defines the trait interface for run history backends and
//! associated error types.

use crate::output::{RunSummary, SummaryItem};
use crate::storage::RunRecord;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Persistent history of finished runs
pub trait RunHistory {
    /// Stores a run summary together with all of its items
    ///
    /// # Returns
    ///
    /// The ID of the stored run
    fn insert_run(&self, summary: &RunSummary) -> StorageResult<i64>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent runs, newest first
    fn recent_runs(&self, limit: usize) -> StorageResult<Vec<RunRecord>>;

    /// Gets the items of a run, in original candidate order
    fn run_items(&self, run_id: i64) -> StorageResult<Vec<SummaryItem>>;
}
