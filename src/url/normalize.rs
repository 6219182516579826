use crate::UrlError;
use url::Url;

/// List of tracking query parameters to remove during normalization
const TRACKING_PARAMS: &[&str] = &["fbclid", "gclid", "mc_eid"];

/// Normalizes a URL into the form used for visit deduplication
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Accept only the http and https schemes
/// 3. Require a host and lowercase it
/// 4. Collapse repeated slashes in the path (dot segments are already
///    resolved by the parser, an empty path becomes `/`)
/// 5. Remove the fragment
/// 6. Remove tracking query parameters, keeping the order of the rest
/// 7. Remove an empty query string (trailing ?)
///
/// Trailing slashes and the scheme are kept as-is: both can change what
/// the server returns.
///
/// # Examples
///
/// ```
/// use access_mapper::url::normalize_url;
///
/// let url = normalize_url("https://EXAMPLE.COM/a//b?utm_source=x#top").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/a/b");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;
    normalize_parsed(url)
}

/// Normalizes an already parsed URL
///
/// Same rules as [`normalize_url`]; used when a link has just been resolved
/// against a base and there is no reason to go back through a string.
pub fn normalize_parsed(mut url: Url) -> Result<Url, UrlError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    // Hosts of special schemes are already lowercased by the parser, but an
    // empty host can still slip through
    match url.host_str() {
        Some(host) if !host.is_empty() => {}
        _ => return Err(UrlError::MissingDomain),
    }

    let path = url.path();
    if path.contains("//") {
        let collapsed = collapse_slashes(path);
        url.set_path(&collapsed);
    }

    url.set_fragment(None);

    if let Some(query) = url.query() {
        let segments: Vec<&str> = query.split('&').filter(|s| !s.is_empty()).collect();
        let kept: Vec<&str> = segments
            .iter()
            .copied()
            .filter(|segment| !is_tracking_param(segment.split('=').next().unwrap_or("")))
            .collect();

        // Untouched queries keep their original encoding
        if kept.is_empty() {
            url.set_query(None);
        } else if kept.len() != segments.len() {
            let joined = kept.join("&");
            url.set_query(Some(&joined));
        }
    }

    Ok(url)
}

/// Collapses runs of `/` into a single slash
fn collapse_slashes(path: &str) -> String {
    let mut result = String::with_capacity(path.len());
    let mut previous_slash = false;

    for c in path.chars() {
        if c == '/' {
            if !previous_slash {
                result.push(c);
            }
            previous_slash = true;
        } else {
            result.push(c);
            previous_slash = false;
        }
    }

    result
}

/// Checks if a query parameter is a tracking parameter
fn is_tracking_param(key: &str) -> bool {
    TRACKING_PARAMS.contains(&key) || key.starts_with("utm_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme_preserved() {
        let result = normalize_url("http://example.com/page").unwrap();
        assert_eq!(result.as_str(), "http://example.com/page");
    }

    #[test]
    fn test_www_preserved() {
        let result = normalize_url("https://www.example.com/").unwrap();
        assert_eq!(result.as_str(), "https://www.example.com/");
    }

    #[test]
    fn test_trailing_slash_preserved() {
        let result = normalize_url("https://example.com/page/").unwrap();
        assert_eq!(result.as_str(), "https://example.com/page/");
    }

    #[test]
    fn test_remove_fragment() {
        let a = normalize_url("https://example.com/page#a").unwrap();
        let b = normalize_url("https://example.com/page#b").unwrap();
        assert_eq!(a.as_str(), "https://example.com/page");
        assert_eq!(a, b);
    }

    #[test]
    fn test_remove_tracking_params() {
        let result = normalize_url("https://example.com/page?utm_source=twitter").unwrap();
        assert_eq!(result.as_str(), "https://example.com/page");
    }

    #[test]
    fn test_keep_query_order() {
        let result = normalize_url("https://example.com/page?b=2&a=1").unwrap();
        assert_eq!(result.as_str(), "https://example.com/page?b=2&a=1");
    }

    #[test]
    fn test_mixed_query_params() {
        let result = normalize_url(
            "https://example.com/page?keep=yes&utm_medium=email&another=value&fbclid=123",
        )
        .unwrap();
        assert_eq!(
            result.as_str(),
            "https://example.com/page?keep=yes&another=value"
        );
    }

    #[test]
    fn test_query_encoding_preserved() {
        for url in [
            "https://x.test/search?q",
            "https://x.test/search?a=b%20c",
            "https://x.test/files?path=/a/b&x=1",
            "https://x.test/list?b=2&a=1&a=3",
        ] {
            assert_eq!(normalize_url(url).unwrap().as_str(), url);
        }
    }

    #[test]
    fn test_tracking_removal_keeps_other_encoding() {
        let result = normalize_url("https://x.test/s?q&utm_source=mail&path=/a/b&v=b%20c").unwrap();
        assert_eq!(result.as_str(), "https://x.test/s?q&path=/a/b&v=b%20c");
    }

    #[test]
    fn test_dot_segments_resolved() {
        let result = normalize_url("https://example.com/a/../b/./c").unwrap();
        assert_eq!(result.as_str(), "https://example.com/b/c");
    }

    #[test]
    fn test_lowercase_host_only() {
        let result = normalize_url("https://EXAMPLE.COM/Page").unwrap();
        assert_eq!(result.as_str(), "https://example.com/Page");
    }

    #[test]
    fn test_default_port_elided() {
        let result = normalize_url("https://example.com:443/").unwrap();
        assert_eq!(result.as_str(), "https://example.com/");
    }

    #[test]
    fn test_multiple_slashes() {
        let result = normalize_url("https://example.com///path//to///page").unwrap();
        assert_eq!(result.as_str(), "https://example.com/path/to/page");
    }

    #[test]
    fn test_empty_path_becomes_root() {
        let result = normalize_url("https://example.com").unwrap();
        assert_eq!(result.as_str(), "https://example.com/");
    }

    #[test]
    fn test_invalid_scheme() {
        let result = normalize_url("ftp://example.com/page");
        assert!(matches!(result.unwrap_err(), UrlError::InvalidScheme(_)));
    }

    #[test]
    fn test_malformed_url() {
        let result = normalize_url("not a url");
        assert!(matches!(result.unwrap_err(), UrlError::Parse(_)));
    }
}
