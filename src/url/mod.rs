//! URL handling module for Linktide
//!
//! This module turns raw user input into link candidates: it scans free text
//! and delimited tables for URL-like tokens, normalizes them, reduces them to
//! their domain, and removes duplicates.

mod domain;
mod extract;
mod normalize;

use serde::{Deserialize, Serialize};

// Re-export main functions
pub use domain::{extract_domain, parse_absolute};
pub use extract::{dedup_candidates, extract, RawInput};
pub use normalize::normalize_url;

/// A normalized link extracted from raw input, not yet processed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkCandidate {
    /// The token exactly as it was found in the input
    pub raw_input: String,

    /// The URL with an explicit scheme and a normalized host
    pub normalized_url: String,

    /// The host without any leading `www.`
    pub domain: String,
}

impl LinkCandidate {
    /// Builds a candidate from a raw token
    ///
    /// # Examples
    ///
    /// ```
    /// use linktide::url::LinkCandidate;
    ///
    /// let candidate = LinkCandidate::new("www.Example.com/docs");
    /// assert_eq!(candidate.normalized_url, "https://example.com/docs");
    /// assert_eq!(candidate.domain, "example.com");
    /// ```
    pub fn new(raw: &str) -> Self {
        let normalized_url = normalize_url(raw);
        let domain = domain::host_without_www(&normalized_url)
            .unwrap_or_else(|| raw.trim().to_string());
        Self {
            raw_input: raw.to_string(),
            normalized_url,
            domain,
        }
    }
}
