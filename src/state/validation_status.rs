/// Validation status definitions
///
/// This module defines every state a link can be in while its health is probed.
use crate::state::{PipelineStatus, SummaryBucket};
use serde::Serialize;
use std::fmt;

/// Represents the health of a link in a validation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    // ===== Active States =====
    /// Link has not been probed yet
    Unknown,

    /// Probe is in flight
    Checking,

    // ===== Terminal States =====
    /// Link answered with a success status
    Healthy,

    /// Link answered with a redirect
    Redirect,

    /// Link answered with a client/server error, or could not be reached
    Broken,

    /// Probe did not finish within the configured timeout
    Timeout,
}

const ALL_VALIDATION_STATES: &[ValidationStatus] = &[
    ValidationStatus::Unknown,
    ValidationStatus::Checking,
    ValidationStatus::Healthy,
    ValidationStatus::Redirect,
    ValidationStatus::Broken,
    ValidationStatus::Timeout,
];

impl ValidationStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Checking => "checking",
            Self::Healthy => "healthy",
            Self::Redirect => "redirect",
            Self::Broken => "broken",
            Self::Timeout => "timeout",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "unknown" => Some(Self::Unknown),
            "checking" => Some(Self::Checking),
            "healthy" => Some(Self::Healthy),
            "redirect" => Some(Self::Redirect),
            "broken" => Some(Self::Broken),
            "timeout" => Some(Self::Timeout),
            _ => None,
        }
    }
}

impl PipelineStatus for ValidationStatus {
    fn pipeline_name() -> &'static str {
        "validation"
    }

    fn initial() -> Self {
        Self::Unknown
    }

    fn in_flight() -> Self {
        Self::Checking
    }

    fn success() -> Self {
        Self::Healthy
    }

    fn failure() -> Self {
        Self::Broken
    }

    fn all_states() -> &'static [Self] {
        ALL_VALIDATION_STATES
    }

    fn as_str(&self) -> &'static str {
        self.to_db_string()
    }

    fn is_terminal(&self) -> bool {
        !matches!(self, Self::Unknown | Self::Checking)
    }

    fn is_retryable(&self) -> bool {
        matches!(self, Self::Broken | Self::Timeout)
    }

    fn summary_bucket(&self) -> Option<SummaryBucket> {
        match self {
            Self::Unknown | Self::Checking | Self::Redirect => None,
            Self::Healthy => Some(SummaryBucket::Success),
            Self::Broken | Self::Timeout => Some(SummaryBucket::Failed),
        }
    }
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}
