use crate::url::normalize::strip_www;
use crate::{UrlError, UrlResult};
use url::Url;

/// Reduces a link to its domain
///
/// The input is parsed as a URL and its host is returned without a leading
/// `www.`. If the input does not parse, or has no host, the trimmed input is
/// returned unchanged.
///
/// # Examples
///
/// ```
/// use linktide::url::extract_domain;
///
/// assert_eq!(extract_domain("https://www.example.com/path"), "example.com");
/// assert_eq!(extract_domain("https://Blog.Example.com"), "blog.example.com");
/// assert_eq!(extract_domain("  no scheme here "), "no scheme here");
/// ```
pub fn extract_domain(input: &str) -> String {
    host_without_www(input).unwrap_or_else(|| input.trim().to_string())
}

pub(crate) fn host_without_www(input: &str) -> Option<String> {
    let url = Url::parse(input.trim()).ok()?;
    url.host_str()
        .map(|host| strip_www(&host.to_lowercase()).to_string())
}

/// Parses a normalized link into an absolute http(s) URL with a host
///
/// Workers use this to tell real links apart from tokens that merely look
/// like one.
pub fn parse_absolute(input: &str) -> UrlResult<Url> {
    let url = Url::parse(input).map_err(|e| UrlError::Parse(format!("{}: {}", input, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::Parse(format!(
            "{}: unsupported scheme '{}'",
            input,
            url.scheme()
        )));
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(UrlError::MissingHost(input.to_string())),
    }
}
