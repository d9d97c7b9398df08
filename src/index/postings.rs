//! Posting list encoding
//!
//! A posting list is stored as comma-separated decimal document ids. Parsing
//! is tolerant: malformed fragments are dropped rather than failing the
//! whole list.

use std::collections::BTreeSet;

/// Parses a comma-separated posting list into a sorted id set
pub fn parse_postings(encoded: &str) -> BTreeSet<i64> {
    encoded
        .split(',')
        .filter_map(|part| part.trim().parse::<i64>().ok())
        .collect()
}

/// Encodes a sorted id set as a comma-separated posting list
pub fn encode_postings(doc_ids: &BTreeSet<i64>) -> String {
    doc_ids
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
