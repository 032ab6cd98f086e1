//! Scoring documents: the normalized view of a task used by every ranker.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;

use crate::tasks::{Priority, Task, TaskStatus};

/// Only the most recent updates contribute text.
pub const RECENT_UPDATE_WINDOW: usize = 10;

static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9_]{2,}").expect("token regex is valid"));

const NAIVE_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// A task projected into the fields the rankers consume.
///
/// Borrows the source task so the selection can be traced back to it
/// without cloning.
#[derive(Debug, Clone)]
pub struct ScoringDocument<'a> {
    pub task: &'a Task,
    /// Title, details, recent update text, open blocker descriptions,
    /// definition-of-done items and subtask titles, space separated.
    pub full_text: String,
    /// Lower-cased word tokens of `full_text`.
    pub tokens: BTreeSet<String>,
    /// Latest known activity, in epoch seconds. `0.0` means unknown.
    pub last_touch: f64,
    pub open_blockers: usize,
}

impl<'a> ScoringDocument<'a> {
    pub fn project(task: &'a Task) -> Self {
        let full_text = derive_full_text(task);
        let tokens = tokenize(&full_text);
        Self {
            task,
            tokens,
            full_text,
            last_touch: last_touch(task),
            open_blockers: task.open_blockers().count(),
        }
    }

    pub fn id(&self) -> &'a str {
        &self.task.id
    }

    pub fn title(&self) -> &'a str {
        &self.task.title
    }

    pub fn details(&self) -> &'a str {
        &self.task.details
    }

    pub fn status(&self) -> &'a TaskStatus {
        &self.task.status
    }

    pub fn priority(&self) -> &'a Priority {
        &self.task.priority
    }

    pub fn progress(&self) -> i64 {
        self.task.progress
    }

    /// Non-empty next action, if any.
    pub fn next_action(&self) -> Option<&'a str> {
        self.task
            .next_action
            .as_deref()
            .filter(|action| !action.is_empty())
    }
}

fn derive_full_text(task: &Task) -> String {
    let skip = task.updates.len().saturating_sub(RECENT_UPDATE_WINDOW);
    let updates = task.updates[skip..]
        .iter()
        .map(|u| u.text())
        .collect::<Vec<_>>()
        .join("\n");
    let blockers = task
        .open_blockers()
        .map(|b| b.desc.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    let done = task.definition_of_done.join("\n");
    let subtasks = task
        .subtasks
        .iter()
        .map(|s| s.title.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    [
        task.title.as_str(),
        task.details.as_str(),
        &updates,
        &blockers,
        &done,
        &subtasks,
    ]
    .join(" ")
}

/// Latest of created, started and every update time. Unparseable or
/// missing values count as `0.0`.
fn last_touch(task: &Task) -> f64 {
    let stamps = [task.created.as_deref(), task.started.as_deref()]
        .into_iter()
        .flatten()
        .chain(task.updates.iter().filter_map(|u| u.time()));

    stamps.map(parse_timestamp).fold(0.0, f64::max)
}

/// Lower-cased set of word tokens: runs of two or more ASCII letters,
/// digits or underscores.
pub fn tokenize(text: &str) -> BTreeSet<String> {
    TOKEN_RE
        .find_iter(text)
        .map(|m| m.as_str().to_ascii_lowercase())
        .collect()
}

/// Parse an ISO-8601 style timestamp into epoch seconds.
///
/// Accepts RFC 3339, naive date-times (taken as UTC) and bare dates
/// (midnight UTC). Anything else yields `0.0`.
pub fn parse_timestamp(raw: &str) -> f64 {
    let raw = raw.trim();
    if raw.is_empty() {
        return 0.0;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return epoch_seconds(dt.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return epoch_seconds(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map_or(0.0, |naive| epoch_seconds(naive.and_utc()))
}

#[allow(clippy::cast_precision_loss)]
pub(crate) fn epoch_seconds(dt: DateTime<Utc>) -> f64 {
    dt.timestamp_millis() as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::TaskUpdate;
    use crate::test_utils::fixtures::TaskBuilder;

    #[test]
    fn tokenize_lowercases_and_drops_short_runs() {
        let tokens = tokenize("Fix the OAuth-2 flow, a b x_y");
        let expected: BTreeSet<String> = ["fix", "the", "oauth", "flow", "x_y"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(tokens, expected);
    }

    #[test]
    fn tokenize_ignores_non_ascii_letters() {
        let tokens = tokenize("café über ok");
        assert!(tokens.contains("caf"));
        assert!(tokens.contains("ber"));
        assert!(tokens.contains("ok"));
        assert!(!tokens.iter().any(|t| t.contains('é')));
    }

    #[test]
    fn full_text_joins_all_sources() {
        let task = TaskBuilder::new("T-1")
            .title("Payments")
            .details("Stripe integration")
            .update("wired webhook", None)
            .open_blocker("need API key")
            .done_when("tests green")
            .subtask("write docs")
            .build();
        let doc = ScoringDocument::project(&task);

        assert_eq!(
            doc.full_text,
            "Payments Stripe integration wired webhook need API key tests green write docs"
        );
        assert!(doc.tokens.contains("stripe"));
        assert_eq!(doc.open_blockers, 1);
    }

    #[test]
    fn resolved_blockers_contribute_no_text() {
        let task = TaskBuilder::new("T-7")
            .title("Refund")
            .blocker("legacyvendor contract", "resolved")
            .open_blocker("finance signoff")
            .build();
        let doc = ScoringDocument::project(&task);

        assert!(!doc.tokens.contains("legacyvendor"));
        assert!(!doc.tokens.contains("contract"));
        assert!(doc.tokens.contains("signoff"));
        assert!(!doc.full_text.contains("legacyvendor"));
        assert_eq!(doc.open_blockers, 1);
    }

    #[test]
    fn only_last_ten_updates_contribute_text() {
        let mut builder = TaskBuilder::new("T-2");
        for i in 0..12 {
            builder = builder.update(&format!("note{i}"), None);
        }
        let task = builder.build();
        let doc = ScoringDocument::project(&task);

        assert!(!doc.tokens.contains("note0"));
        assert!(!doc.tokens.contains("note1"));
        assert!(doc.tokens.contains("note2"));
        assert!(doc.tokens.contains("note11"));
    }

    #[test]
    fn update_text_uses_note_when_content_missing() {
        let mut task = TaskBuilder::new("T-3").build();
        task.updates = vec![serde_json::from_str::<TaskUpdate>(r#"{"note": "fallback"}"#).unwrap()];
        let doc = ScoringDocument::project(&task);
        assert!(doc.tokens.contains("fallback"));
    }

    #[test]
    fn parse_timestamp_accepts_common_forms() {
        let base = parse_timestamp("2024-01-01T00:00:00Z");
        assert!((base - 1_704_067_200.0).abs() < f64::EPSILON);
        assert!((parse_timestamp("2024-01-01T00:00:00") - base).abs() < f64::EPSILON);
        assert!((parse_timestamp("2024-01-01 00:00:00") - base).abs() < f64::EPSILON);
        assert!((parse_timestamp("2024-01-01") - base).abs() < f64::EPSILON);
        assert!((parse_timestamp("2024-01-01T02:00:00+02:00") - base).abs() < f64::EPSILON);
        assert!((parse_timestamp("2024-01-01T00:00:00.500Z") - (base + 0.5)).abs() < 1e-9);
    }

    #[test]
    fn parse_timestamp_garbage_is_zero() {
        assert!(parse_timestamp("").abs() < f64::EPSILON);
        assert!(parse_timestamp("yesterday").abs() < f64::EPSILON);
        assert!(parse_timestamp("2024-13-45").abs() < f64::EPSILON);
    }

    #[test]
    fn last_touch_is_latest_known_time() {
        let task = TaskBuilder::new("T-4")
            .created("2024-01-01T00:00:00Z")
            .started("not a date")
            .update("one", Some("2024-01-03T00:00:00Z"))
            .update("two", Some("2024-01-02T00:00:00Z"))
            .build();
        let doc = ScoringDocument::project(&task);
        assert!((doc.last_touch - parse_timestamp("2024-01-03T00:00:00Z")).abs() < f64::EPSILON);
    }

    #[test]
    fn last_touch_unknown_is_zero() {
        let task = TaskBuilder::new("T-5").build();
        assert!(ScoringDocument::project(&task).last_touch.abs() < f64::EPSILON);
    }

    #[test]
    fn next_action_ignores_empty_string() {
        let task = TaskBuilder::new("T-6").next_action("").build();
        assert!(ScoringDocument::project(&task).next_action().is_none());
    }
}
