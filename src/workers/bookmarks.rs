//! Bookmark storage collaborator
//!
//! The engine never stores bookmarks itself. It talks to the bookmark REST API
//! through the `BookmarkStore` trait; `HttpBookmarkStore` is the reqwest-backed
//! implementation used by the CLI.

use crate::config::{BookmarkApiConfig, UserAgentConfig};
use crate::url::{dedup_candidates, LinkCandidate};
use crate::{ConfigError, PipelineError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors reported by the bookmark storage collaborator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreateError {
    #[error("Bookmark already exists")]
    Conflict,

    #[error("Bookmark rejected: {0}")]
    Rejected(String),

    #[error("Bookmark API unreachable: {0}")]
    Transport(String),
}

/// Request body for creating a bookmark
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBookmark {
    pub url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub category_ids: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// What the API answers after a successful create
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CreatedBookmark {
    /// Canonical title chosen by the API, if any
    #[serde(default)]
    pub title: Option<String>,
}

/// A stored bookmark, as returned by the listing endpoint
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkRecord {
    pub id: String,
    pub url: String,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub last_validated: Option<DateTime<Utc>>,
}

/// Bookmark storage used by the import worker and to seed validation runs
#[async_trait]
pub trait BookmarkStore: Send + Sync {
    /// Creates a bookmark
    ///
    /// # Returns
    ///
    /// * `Ok(CreatedBookmark)` - Bookmark stored
    /// * `Err(CreateError::Conflict)` - The URL is already bookmarked
    /// * `Err(CreateError::Rejected)` - The API refused the bookmark
    /// * `Err(CreateError::Transport)` - The API could not be reached
    async fn create(&self, bookmark: &NewBookmark) -> Result<CreatedBookmark, CreateError>;

    /// Lists up to `limit` stored bookmarks
    async fn list(&self, limit: usize) -> Result<Vec<BookmarkRecord>, CreateError>;
}

/// Turns a bookmark listing into validation candidates
///
/// Uses the same normalization and deduplication as the extractor.
pub fn candidates_from_bookmarks(records: &[BookmarkRecord]) -> Vec<LinkCandidate> {
    dedup_candidates(
        records
            .iter()
            .filter(|record| !record.url.trim().is_empty())
            .map(|record| LinkCandidate::new(&record.url)),
    )
}

/// Listing responses come either as a bare array or wrapped in an object
#[derive(Deserialize)]
#[serde(untagged)]
enum ListResponse {
    Bare(Vec<BookmarkRecord>),
    Wrapped { bookmarks: Vec<BookmarkRecord> },
}

/// Error bodies the API is known to send
#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Bookmark REST API client
pub struct HttpBookmarkStore {
    client: Client,
    endpoint: String,
    api_token: Option<String>,
}

impl HttpBookmarkStore {
    /// Creates a client for the configured bookmark API
    pub fn new(
        config: &BookmarkApiConfig,
        user_agent: &UserAgentConfig,
    ) -> Result<Self, PipelineError> {
        url::Url::parse(&config.base_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

        let client = Client::builder()
            .user_agent(user_agent.header_value())
            .timeout(Duration::from_millis(config.timeout_ms))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/bookmarks", config.base_url.trim_end_matches('/')),
            api_token: config.api_token.clone(),
        })
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl BookmarkStore for HttpBookmarkStore {
    async fn create(&self, bookmark: &NewBookmark) -> Result<CreatedBookmark, CreateError> {
        let response = self
            .authorize(self.client.post(&self.endpoint).json(bookmark))
            .send()
            .await
            .map_err(|e| CreateError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CreateError::Transport(e.to_string()))?;

        if status.is_success() {
            if body.trim().is_empty() {
                return Ok(CreatedBookmark::default());
            }
            return Ok(serde_json::from_str(&body).unwrap_or_else(|e| {
                tracing::debug!("Unreadable create response for {}: {}", bookmark.url, e);
                CreatedBookmark::default()
            }));
        }

        Err(classify_rejection(status, &body))
    }

    async fn list(&self, limit: usize) -> Result<Vec<BookmarkRecord>, CreateError> {
        let response = self
            .authorize(self.client.get(&self.endpoint).query(&[("limit", limit)]))
            .send()
            .await
            .map_err(|e| CreateError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CreateError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(CreateError::Rejected(error_message(status, &body)));
        }

        let records = match serde_json::from_str::<ListResponse>(&body) {
            Ok(ListResponse::Bare(records)) => records,
            Ok(ListResponse::Wrapped { bookmarks }) => bookmarks,
            Err(e) => {
                return Err(CreateError::Rejected(format!(
                    "Unreadable bookmark listing: {}",
                    e
                )))
            }
        };

        Ok(records.into_iter().take(limit).collect())
    }
}

/// Maps a non-2xx create response onto a `CreateError`
///
/// 409 is a conflict. Some API versions answer 400/422 with an "already
/// exists" message instead, which is treated the same way.
fn classify_rejection(status: StatusCode, body: &str) -> CreateError {
    let message = error_message(status, body);

    if status == StatusCode::CONFLICT || message.to_lowercase().contains("already exists") {
        return CreateError::Conflict;
    }

    CreateError::Rejected(message)
}

fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.message.or(parsed.error))
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}
