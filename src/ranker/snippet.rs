//! Snippet generation
//!
//! Picks the window of document text with the densest cluster of query-term
//! occurrences and wraps every match in bold markers. Matching is
//! ASCII-case-insensitive, which keeps byte offsets aligned between the
//! folded haystack and the original text.

/// Maximum snippet length in bytes of surrounding context
pub const MAX_SNIPPET_LEN: usize = 160;

/// How far before the anchor occurrence the window starts
const LEAD_IN: usize = MAX_SNIPPET_LEN / 4;

/// Builds a highlighted snippet for a document
///
/// # Arguments
///
/// * `text` - The document's extracted visible text
/// * `terms` - Normalized (lowercased) query terms
///
/// # Returns
///
/// * `Some(snippet)` - Context around the densest match cluster, matches
///   wrapped in `<b>`/`</b>`; falls back to the document's opening text
///   when no term occurs
/// * `None` - The document text is empty
pub fn build_snippet(text: &str, terms: &[String]) -> Option<String> {
    if text.is_empty() {
        return None;
    }

    let lower = text.to_ascii_lowercase();
    let spans = match_spans(&lower, terms);

    if spans.is_empty() {
        let end = floor_char_boundary(text, MAX_SNIPPET_LEN);
        return Some(text[..end].trim().to_string());
    }

    // Anchor on the occurrence whose window covers the most matches
    let mut best_index = 0;
    let mut best_count = 0;
    for (i, (anchor, _)) in spans.iter().enumerate() {
        let start = anchor.saturating_sub(LEAD_IN);
        let end = start + MAX_SNIPPET_LEN;
        let count = spans.iter().filter(|(s, _)| *s >= start && *s < end).count();
        if count > best_count {
            best_count = count;
            best_index = i;
        }
    }

    let anchor = spans[best_index].0;
    let start = floor_char_boundary(text, anchor.saturating_sub(LEAD_IN));
    let end = floor_char_boundary(text, start + MAX_SNIPPET_LEN);

    let mut snippet = String::new();
    let mut cursor = start;
    for &(s, e) in &spans {
        if s < cursor || s < start || e > end {
            continue;
        }
        snippet.push_str(&text[cursor..s]);
        snippet.push_str("<b>");
        snippet.push_str(&text[s..e]);
        snippet.push_str("</b>");
        cursor = e;
    }
    snippet.push_str(&text[cursor..end]);

    Some(snippet.trim().to_string())
}

/// Collects (start, end) byte spans of every term occurrence, sorted
fn match_spans(lower: &str, terms: &[String]) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    for term in terms {
        if term.is_empty() {
            continue;
        }
        for (pos, matched) in lower.match_indices(term.as_str()) {
            spans.push((pos, pos + matched.len()));
        }
    }
    spans.sort_unstable();
    spans
}

/// Largest char boundary at or below `index`
fn floor_char_boundary(s: &str, index: usize) -> usize {
    let mut i = index.min(s.len());
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}
