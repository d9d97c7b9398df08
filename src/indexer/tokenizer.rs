//! Text tokenizer
//!
//! A token is a maximal run of alphanumeric characters, case-folded to
//! lower. Tokens shorter than three characters are discarded. The same
//! rules are applied to documents and to queries so that lookups hit.

/// Minimum token length kept by the tokenizer
pub const MIN_TOKEN_LEN: usize = 3;

/// Tokenizes text into lowercased alphanumeric runs
///
/// # Arguments
///
/// * `text` - The text to tokenize
///
/// # Returns
///
/// All tokens in order of appearance, duplicates included; the caller
/// decides whether to deduplicate
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();

    for c in text.chars() {
        if c.is_alphanumeric() {
            current.extend(c.to_lowercase());
        } else {
            flush_token(&mut current, &mut tokens);
        }
    }
    flush_token(&mut current, &mut tokens);

    tokens
}

fn flush_token(current: &mut String, tokens: &mut Vec<String>) {
    if !current.is_empty() {
        if current.chars().count() >= MIN_TOKEN_LEN {
            tokens.push(std::mem::take(current));
        } else {
            current.clear();
        }
    }
}
