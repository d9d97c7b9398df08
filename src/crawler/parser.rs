//! Link extraction from fetched pages
//!
//! Used only when `follow-links` is enabled: anchor hrefs are resolved
//! against the page URL and filtered down to fetchable http(s) targets.

use scraper::{Html, Selector};
use url::Url;

/// Extracts all followable links from an HTML page
///
/// **Excluded:** `javascript:`, `mailto:`, `tel:`, and `data:` schemes,
/// fragment-only anchors, `download` links, and anything that does not
/// resolve to http(s).
///
/// # Arguments
///
/// * `html` - The HTML content to parse
/// * `base_url` - The page URL, for resolving relative hrefs
///
/// # Returns
///
/// Absolute URLs found in the page, in document order
pub fn extract_links(html: &str, base_url: &Url) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut links = Vec::new();

    if let Ok(selector) = Selector::parse("a[href]") {
        for element in document.select(&selector) {
            if element.value().attr("download").is_some() {
                continue;
            }
            if let Some(href) = element.value().attr("href") {
                if let Some(absolute) = resolve_link(href, base_url) {
                    links.push(absolute);
                }
            }
        }
    }

    links
}

/// Resolves an href to an absolute URL, or None if it should be skipped
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute) if absolute.scheme() == "http" || absolute.scheme() == "https" => {
            Some(absolute.to_string())
        }
        _ => None,
    }
}
