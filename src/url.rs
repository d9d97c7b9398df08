//! Crawl URL validation
//!
//! The crawler applies a deliberately loose check before reserving a URL:
//! an http(s) scheme prefix and a minimum length. Full RFC canonicalization
//! is out of scope; the metadata store's unique constraint is what prevents
//! duplicates.

/// Minimum accepted length of a crawlable URL
const MIN_URL_LEN: usize = 10;

/// Checks whether a string is acceptable as a crawl target
///
/// A valid crawl URL starts with `http://` or `https://` and is at least
/// ten characters long. Anything else is discarded without creating a
/// document record.
///
/// # Examples
///
/// ```
/// use kumo::url::is_valid_crawl_url;
///
/// assert!(is_valid_crawl_url("https://example.com/"));
/// assert!(!is_valid_crawl_url("ftp://example.com/"));
/// assert!(!is_valid_crawl_url("http://x"));
/// ```
pub fn is_valid_crawl_url(url: &str) -> bool {
    (url.starts_with("http://") || url.starts_with("https://")) && url.len() >= MIN_URL_LEN
}
