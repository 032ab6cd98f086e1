//! Query sanitisation shared by the full-text providers.

use std::sync::LazyLock;

use regex::Regex;

static NON_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]").expect("non-word regex is valid"));

/// Split a free-text query into plain search terms.
///
/// Punctuation becomes whitespace and terms without any alphanumeric
/// character are dropped, so no engine-specific operator syntax survives.
pub fn query_terms(query: &str) -> Vec<String> {
    NON_WORD_RE
        .replace_all(query, " ")
        .split_whitespace()
        .filter(|term| term.chars().any(char::is_alphanumeric))
        .map(str::to_string)
        .collect()
}

/// OR-combine terms, each as a quoted phrase.
///
/// Both FTS5 and Tantivy's query parser read `"term"` as a literal, which
/// keeps words like `AND` or `NEAR` from being parsed as operators.
pub fn or_of_quoted(terms: &[String]) -> String {
    terms
        .iter()
        .map(|term| format!("\"{term}\""))
        .collect::<Vec<_>>()
        .join(" OR ")
}
