//! Visible-text extraction from HTML
//!
//! A depth-first walk over the parsed document collects text nodes, skipping
//! `<script>` and `<style>` subtrees entirely, and joins sibling fragments
//! with single spaces.

use ego_tree::NodeRef;
use scraper::{Html, Node, Selector};

/// Extracts the visible text of an HTML document
///
/// # Arguments
///
/// * `html` - The HTML content
///
/// # Returns
///
/// All visible text fragments joined by single spaces
pub fn extract_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut fragments = Vec::new();
    collect_text(document.tree.root(), &mut fragments);
    fragments.join(" ")
}

fn collect_text(node: NodeRef<'_, Node>, fragments: &mut Vec<String>) {
    for child in node.children() {
        match child.value() {
            Node::Text(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    fragments.push(trimmed.to_string());
                }
            }
            Node::Element(element) => {
                let name = element.name();
                if name.eq_ignore_ascii_case("script") || name.eq_ignore_ascii_case("style") {
                    continue;
                }
                collect_text(child, fragments);
            }
            _ => {}
        }
    }
}

/// Extracts the page title from an HTML document
///
/// Returns None when there is no `<title>` or it is empty.
pub fn extract_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("title").ok()?;

    document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}
