//! URL inspection utilities.

use url::Url;

/// Transport and shape facts about a scanned URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UrlInfo {
    pub is_https: bool,
    pub has_query_params: bool,
}

/// Inspect a URL for scheme and query usage.
///
/// Unparseable input is reported as neither HTTPS nor parameterised.
#[must_use]
pub fn inspect_url(url: &str) -> UrlInfo {
    match Url::parse(url) {
        Ok(parsed) => UrlInfo {
            is_https: parsed.scheme() == "https",
            has_query_params: parsed.query().is_some_and(|q| !q.is_empty()),
        },
        Err(_) => UrlInfo::default(),
    }
}

/// Check if a URL is a scannable http(s) URL
#[must_use]
pub fn is_valid_url(url: &str) -> bool {
    if url.is_empty() {
        return false;
    }

    // Skip data URLs, javascript URLs, and other non-http schemes
    if url.starts_with("data:") || url.starts_with("javascript:") || url.starts_with("mailto:") {
        return false;
    }

    match Url::parse(url) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https") && parsed.host_str().is_some(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inspect_url() {
        let info = inspect_url("https://example.com/page");
        assert!(info.is_https);
        assert!(!info.has_query_params);

        let info = inspect_url("http://example.com/page?id=3&ref=nav");
        assert!(!info.is_https);
        assert!(info.has_query_params);

        assert_eq!(inspect_url("not a url"), UrlInfo::default());
    }

    #[test]
    fn test_is_valid_url() {
        assert!(is_valid_url("https://example.com"));
        assert!(is_valid_url("http://localhost:8080/x"));
        assert!(!is_valid_url(""));
        assert!(!is_valid_url("ftp://example.com"));
        assert!(!is_valid_url("javascript:alert(1)"));
        assert!(!is_valid_url("example.com"));
    }
}
