//! Property-based tests for safety - parsers and sanitizers never panic.

use proptest::prelude::*;

use taskctx::context::{parse_timestamp, tokenize};
use taskctx::search::query_terms;
use taskctx::tasks::TaskCollection;

proptest! {
    #[test]
    fn parse_timestamp_never_panics(raw in ".{0,40}") {
        let seconds = parse_timestamp(&raw);
        prop_assert!(seconds.is_finite());
    }

    #[test]
    fn query_terms_are_plain_words(raw in ".{0,80}") {
        for term in query_terms(&raw) {
            prop_assert!(!term.chars().any(char::is_whitespace));
            prop_assert!(!term.chars().any(|c| c.is_ascii_punctuation() && c != '_'));
            prop_assert!(term.chars().any(char::is_alphanumeric));
        }
    }

    #[test]
    fn tokens_are_lowercase_ascii(raw in ".{0,80}") {
        for token in tokenize(&raw) {
            prop_assert!(token.len() >= 2);
            prop_assert!(token.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'));
        }
    }

    #[test]
    fn task_loader_never_panics(raw in ".{0,200}") {
        let _ = TaskCollection::from_json(&raw);
    }
}
