/// Scheme assumed for candidates that do not name one
const DEFAULT_SCHEME: &str = "https";

/// Schemes kept as written (compared case-insensitively)
const KNOWN_SCHEMES: &[&str] = &["https", "http"];

/// Normalizes a link candidate
///
/// # Normalization Steps
///
/// 1. Trim surrounding whitespace
/// 2. Keep an existing `http://` or `https://` scheme (lowercased), otherwise
///    prefix `https://`
/// 3. Lowercase the host
/// 4. Remove every leading `www.` label from the host
/// 5. Keep path, query and fragment verbatim
///
/// Normalizing an already-normalized string returns it unchanged. The function
/// never fails: input that is not a URL at all still comes out with a scheme,
/// and later stages decide what to do with it.
///
/// # Examples
///
/// ```
/// use linktide::url::normalize_url;
///
/// assert_eq!(normalize_url("WWW.Example.com/Page"), "https://example.com/Page");
/// assert_eq!(normalize_url("http://foo.org"), "http://foo.org");
/// ```
pub fn normalize_url(input: &str) -> String {
    let trimmed = input.trim();
    let (scheme, rest) = split_scheme(trimmed);

    let host_end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let (host, tail) = rest.split_at(host_end);
    let host = host.to_lowercase();

    format!("{}://{}{}", scheme, strip_www(&host), tail)
}

/// Removes every leading `www.` label from a host
pub(crate) fn strip_www(host: &str) -> &str {
    let mut host = host;
    while let Some(rest) = host.strip_prefix("www.") {
        host = rest;
    }
    host
}

/// Splits a known scheme off the input, defaulting to https
fn split_scheme(input: &str) -> (&'static str, &str) {
    for &scheme in KNOWN_SCHEMES {
        let prefix_len = scheme.len() + 3;
        let matches = input
            .get(..prefix_len)
            .map(|prefix| prefix.eq_ignore_ascii_case(&format!("{}://", scheme)))
            .unwrap_or(false);

        if matches {
            return (scheme, &input[prefix_len..]);
        }
    }
    (DEFAULT_SCHEME, input)
}
