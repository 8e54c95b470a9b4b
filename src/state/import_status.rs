/// Import status definitions
///
/// This module defines every state a link can be in while it is being created
/// as a bookmark.
use crate::state::{PipelineStatus, SummaryBucket};
use serde::Serialize;
use std::fmt;

/// Represents the current state of a link in an import run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportStatus {
    // ===== Active States =====
    /// Link is waiting for its window
    Queued,

    /// Bookmark creation is in flight
    Processing,

    // ===== Terminal States =====
    /// Bookmark was created
    Success,

    /// Bookmark storage reported that the link already exists
    Duplicate,

    /// Bookmark storage rejected the link, or the request failed
    Failed,

    /// Link was not a usable URL and was never sent to storage
    Skipped,
}

const ALL_IMPORT_STATES: &[ImportStatus] = &[
    ImportStatus::Queued,
    ImportStatus::Processing,
    ImportStatus::Success,
    ImportStatus::Duplicate,
    ImportStatus::Failed,
    ImportStatus::Skipped,
];

impl ImportStatus {
    /// Converts the status to its database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Processing => "processing",
            Self::Success => "success",
            Self::Duplicate => "duplicate",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }

    /// Parses a status from its database string representation
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "queued" => Some(Self::Queued),
            "processing" => Some(Self::Processing),
            "success" => Some(Self::Success),
            "duplicate" => Some(Self::Duplicate),
            "failed" => Some(Self::Failed),
            "skipped" => Some(Self::Skipped),
            _ => None,
        }
    }
}

impl PipelineStatus for ImportStatus {
    fn pipeline_name() -> &'static str {
        "import"
    }

    fn initial() -> Self {
        Self::Queued
    }

    fn in_flight() -> Self {
        Self::Processing
    }

    fn success() -> Self {
        Self::Success
    }

    fn failure() -> Self {
        Self::Failed
    }

    fn all_states() -> &'static [Self] {
        ALL_IMPORT_STATES
    }

    fn as_str(&self) -> &'static str {
        self.to_db_string()
    }

    fn is_terminal(&self) -> bool {
        !matches!(self, Self::Queued | Self::Processing)
    }

    fn is_retryable(&self) -> bool {
        matches!(self, Self::Failed)
    }

    fn summary_bucket(&self) -> Option<SummaryBucket> {
        match self {
            Self::Queued | Self::Processing => None,
            Self::Success => Some(SummaryBucket::Success),
            Self::Duplicate => Some(SummaryBucket::Duplicate),
            Self::Failed => Some(SummaryBucket::Failed),
            Self::Skipped => Some(SummaryBucket::Skipped),
        }
    }
}

impl fmt::Display for ImportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}
