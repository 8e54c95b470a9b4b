//! HTTP health probe
//!
//! This module handles the network side of link validation:
//! - Building the HTTP client with the configured user agent
//! - HEAD requests, with a GET fallback for servers that refuse HEAD
//! - Single-hop redirect detection (redirects are reported, never followed)
//! - Timeout and network error classification

use crate::config::{ProbeMethod, UserAgentConfig, ValidationConfig};
use async_trait::async_trait;
use reqwest::header::LOCATION;
use reqwest::{redirect::Policy, Client, Method, StatusCode, Url};
use std::time::{Duration, Instant};

/// Raw result of probing one link
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeResult {
    /// The server answered
    Response {
        /// HTTP status code
        status_code: u16,
        /// Absolute `Location` target of a redirect answer
        location: Option<String>,
        /// Time until the response headers arrived
        latency: Duration,
    },

    /// No answer within the timeout
    TimedOut {
        elapsed: Duration,
    },

    /// Connection refused, DNS failure, TLS error, ...
    NetworkError {
        error: String,
    },
}

/// Link health collaborator used by the validation worker
#[async_trait]
pub trait LinkProbe: Send + Sync {
    async fn probe(&self, url: &str) -> ProbeResult;
}

/// Builds an HTTP client for probing
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Whole-request timeout
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use linktide::config::UserAgentConfig;
/// use linktide::workers::build_http_client;
/// use std::time::Duration;
///
/// let config = UserAgentConfig {
///     client_name: "Linktide".to_string(),
///     client_version: "0.1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
/// };
///
/// let client = build_http_client(&config, Duration::from_secs(10)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .redirect(Policy::none()) // Single hop: report redirects, don't follow
        .gzip(true)
        .brotli(true)
        .build()
}

/// Probes links over HTTP
pub struct HttpProbe {
    client: Client,
    method: ProbeMethod,
}

impl HttpProbe {
    pub fn new(client: Client, method: ProbeMethod) -> Self {
        Self { client, method }
    }

    pub fn from_config(
        validation: &ValidationConfig,
        user_agent: &UserAgentConfig,
    ) -> Result<Self, reqwest::Error> {
        let client = build_http_client(user_agent, Duration::from_millis(validation.timeout_ms))?;
        Ok(Self::new(client, validation.method))
    }

    async fn send(&self, method: Method, url: &str) -> Result<reqwest::Response, reqwest::Error> {
        self.client.request(method, url).send().await
    }
}

#[async_trait]
impl LinkProbe for HttpProbe {
    /// Probes one link
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | Any HTTP answer | `Response` |
    /// | HEAD answered 405/501 | retried once as GET |
    /// | Request timeout | `TimedOut` |
    /// | Connection/DNS/TLS failure | `NetworkError` |
    async fn probe(&self, url: &str) -> ProbeResult {
        let started = Instant::now();

        let mut result = match self.method {
            ProbeMethod::Head => self.send(Method::HEAD, url).await,
            ProbeMethod::Get => self.send(Method::GET, url).await,
        };

        if self.method == ProbeMethod::Head {
            if let Ok(response) = &result {
                if matches!(
                    response.status(),
                    StatusCode::METHOD_NOT_ALLOWED | StatusCode::NOT_IMPLEMENTED
                ) {
                    tracing::debug!("HEAD refused by {}, retrying with GET", url);
                    result = self.send(Method::GET, url).await;
                }
            }
        }

        match result {
            Ok(response) => {
                let status = response.status();
                let location = if status.is_redirection() {
                    response
                        .headers()
                        .get(LOCATION)
                        .and_then(|v| v.to_str().ok())
                        .map(|target| resolve_location(response.url(), target))
                } else {
                    None
                };

                ProbeResult::Response {
                    status_code: status.as_u16(),
                    location,
                    latency: started.elapsed(),
                }
            }
            Err(e) if e.is_timeout() => ProbeResult::TimedOut {
                elapsed: started.elapsed(),
            },
            Err(e) if e.is_connect() => ProbeResult::NetworkError {
                error: format!("Connection failed: {}", e),
            },
            Err(e) => ProbeResult::NetworkError {
                error: e.to_string(),
            },
        }
    }
}

/// Resolves a possibly relative `Location` header against the probed URL
fn resolve_location(base: &Url, target: &str) -> String {
    base.join(target)
        .map(|url| url.to_string())
        .unwrap_or_else(|_| target.to_string())
}
