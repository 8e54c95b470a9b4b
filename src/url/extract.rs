use crate::url::LinkCandidate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Matches `scheme://...` tokens and bare `(www.)host.tld...` tokens in free text
static TEXT_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)https?://[^\s<>"'`]+|\b(?:www\.)?[a-z0-9](?:[a-z0-9-]*[a-z0-9])?(?:\.[a-z0-9](?:[a-z0-9-]*[a-z0-9])?)*\.[a-z]{2,}\b(?:[/?#][^\s<>"'`]*)?"#,
    )
    .expect("text link pattern is valid")
});

/// Matches a table cell that consists of a single link
static CELL_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:https?://)?(?:www\.)?[a-z0-9](?:[a-z0-9-]*[a-z0-9])?(?:\.[a-z0-9](?:[a-z0-9-]*[a-z0-9])?)*\.[a-z]{2,}(?::\d+)?(?:[/?#]\S*)?$",
    )
    .expect("cell link pattern is valid")
});

/// Punctuation that ends a sentence rather than a link
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', ')', ']', '}', '\'', '"'];

/// Quote characters stripped from delimited cells
const QUOTES: &[char] = &['"', '\''];

/// Raw user input handed to the extractor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawInput {
    /// Pasted free text; every URL-like token is a candidate
    Text(String),

    /// Delimited rows (CSV, TSV, ...); every cell holding a link is a candidate
    Delimited { content: String, delimiter: char },

    /// One literal link
    Single(String),
}

/// Extracts link candidates from raw input
///
/// Candidates are normalized and deduplicated on their normalized URL, keeping
/// the first occurrence. An empty result means no links were found; callers
/// decide how to report that.
///
/// # Examples
///
/// ```
/// use linktide::url::{extract, RawInput};
///
/// let input = RawInput::Delimited {
///     content: "example.com, https://foo.org, www.example.com".to_string(),
///     delimiter: ',',
/// };
/// let urls: Vec<_> = extract(&input)
///     .into_iter()
///     .map(|c| c.normalized_url)
///     .collect();
/// assert_eq!(urls, vec!["https://example.com", "https://foo.org"]);
/// ```
pub fn extract(input: &RawInput) -> Vec<LinkCandidate> {
    let tokens: Vec<&str> = match input {
        RawInput::Text(text) => scan_text(text),
        RawInput::Delimited { content, delimiter } => scan_table(content, *delimiter),
        RawInput::Single(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                Vec::new()
            } else {
                vec![trimmed]
            }
        }
    };

    let candidates = dedup_candidates(tokens.into_iter().map(LinkCandidate::new));
    tracing::debug!("Extracted {} unique link candidates", candidates.len());
    candidates
}

/// Drops candidates whose normalized URL was already seen, keeping input order
pub fn dedup_candidates<I>(candidates: I) -> Vec<LinkCandidate>
where
    I: IntoIterator<Item = LinkCandidate>,
{
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|candidate| seen.insert(candidate.normalized_url.clone()))
        .collect()
}

fn scan_text(text: &str) -> Vec<&str> {
    TEXT_LINK
        .find_iter(text)
        .map(|m| m.as_str().trim_end_matches(TRAILING_PUNCTUATION))
        .filter(|token| !token.is_empty())
        .collect()
}

fn scan_table(content: &str, delimiter: char) -> Vec<&str> {
    content
        .lines()
        .flat_map(|row| row.split(delimiter))
        .map(clean_cell)
        .filter(|cell| CELL_LINK.is_match(cell))
        .collect()
}

fn clean_cell(cell: &str) -> &str {
    cell.trim().trim_matches(QUOTES).trim()
}
