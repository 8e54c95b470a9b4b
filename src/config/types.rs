use serde::{Deserialize, Serialize};

/// Main configuration structure for Linktide
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub import: ImportConfig,
    #[serde(rename = "bookmark-api")]
    pub bookmark_api: BookmarkApiConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

/// Batch scheduling configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineConfig {
    /// Number of links processed concurrently in one window
    #[serde(rename = "concurrency-limit")]
    pub concurrency_limit: usize,

    /// How many times a failed link may be re-queued
    #[serde(rename = "max-retries", default)]
    pub max_retries: u32,
}

/// How the health probe talks to a link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeMethod {
    Head,
    Get,
}

/// Link health check configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ValidationConfig {
    /// Per-link probe timeout (milliseconds)
    #[serde(rename = "timeout-ms", default = "default_probe_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_probe_method")]
    pub method: ProbeMethod,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_probe_timeout_ms(),
            method: default_probe_method(),
        }
    }
}

fn default_probe_timeout_ms() -> u64 {
    10_000
}

fn default_probe_method() -> ProbeMethod {
    ProbeMethod::Head
}

/// Defaults applied to every bookmark created by an import run
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ImportConfig {
    #[serde(default)]
    pub priority: Option<String>,

    #[serde(rename = "category-ids", default)]
    pub category_ids: Vec<String>,

    #[serde(default)]
    pub tags: Vec<String>,
}

/// Bookmark REST API connection settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BookmarkApiConfig {
    /// Base URL of the bookmark API (e.g. "http://localhost:3000/api")
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Bearer token sent with every request
    #[serde(rename = "api-token", default, skip_serializing)]
    pub api_token: Option<String>,

    /// Request timeout for the bookmark API (milliseconds)
    #[serde(rename = "timeout-ms", default = "default_api_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_api_timeout_ms() -> u64 {
    30_000
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UserAgentConfig {
    #[serde(rename = "client-name")]
    pub client_name: String,

    #[serde(rename = "client-version")]
    pub client_version: String,

    /// URL with information about the client
    #[serde(rename = "contact-url")]
    pub contact_url: String,
}

impl UserAgentConfig {
    /// Formats the user agent header value: `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{})",
            self.client_name, self.client_version, self.contact_url
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Path to the SQLite run log
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Path to the markdown run report
    #[serde(rename = "summary-path")]
    pub summary_path: String,
}
