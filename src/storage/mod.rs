//! Storage module for the run history
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Persisting run summaries and the final state of every link
//! - Listing past runs

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteRunLog;
pub use traits::{RunHistory, StorageError, StorageResult};

/// Represents a run in the database
#[derive(Debug, Clone, PartialEq)]
pub struct RunRecord {
    pub id: i64,
    pub pipeline: String,
    pub source: String,
    pub started_at: String,
    pub finished_at: String,
    pub status: RunStatus,
    pub config_hash: String,
    pub total_links: i64,
    pub success_count: i64,
    pub failed_count: i64,
    pub duplicate_count: i64,
    pub skipped_count: i64,
    pub success_rate: f64,
}

/// How a recorded run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Completed,
    Cancelled,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}
