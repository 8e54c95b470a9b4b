//! Linktide: bulk link import and validation engine
//!
//! This crate ingests a set of candidate URLs, runs every one of them through a
//! pluggable per-item operation (bookmark import or health probe) under a
//! bounded concurrency budget, and produces a classified, retryable result set
//! with progress reported after every window.

pub mod config;
pub mod output;
pub mod pipeline;
pub mod state;
pub mod storage;
pub mod url;
pub mod workers;

use thiserror::Error;

/// Main error type for Linktide operations
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("No links found in input")]
    NoLinksFound,

    #[error("Unknown item id: {0}")]
    UnknownItem(usize),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Missing host in URL: {0}")]
    MissingHost(String),
}

/// Result type alias for Linktide operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use output::{record_run, RunLog, RunSummary};
pub use pipeline::{retry_failed, run_import, run_validation, Progress, RunConfig, RunSnapshot};
pub use state::{ImportStatus, ItemId, LinkItem, PipelineStatus, ValidationStatus};
pub use url::{extract, extract_domain, normalize_url, LinkCandidate, RawInput};
