//! Task collection types.
//!
//! These mirror the JSON task file consumed by `taskctx context`. Every field
//! except `id` is optional; absent or `null` values fall back to empty
//! defaults so a sparse task never fails to load.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Lifecycle status of a task.
///
/// Unknown strings are preserved verbatim in [`TaskStatus::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Blocked,
    Done,
    Canceled,
    Other(String),
}

impl TaskStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in-progress",
            Self::Blocked => "blocked",
            Self::Done => "done",
            Self::Canceled => "canceled",
            Self::Other(value) => value,
        }
    }

    /// Done and canceled tasks never reach the ranking pipeline.
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Done | Self::Canceled)
    }
}

impl From<&str> for TaskStatus {
    fn from(value: &str) -> Self {
        match value {
            "pending" => Self::Pending,
            "in-progress" => Self::InProgress,
            "blocked" => Self::Blocked,
            "done" => Self::Done,
            "canceled" => Self::Canceled,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for TaskStatus {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<TaskStatus> for String {
    fn from(value: TaskStatus) -> Self {
        match value {
            TaskStatus::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task priority. A missing priority is treated as `medium`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
    Other(String),
}

impl Priority {
    pub fn as_str(&self) -> &str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::Other(value) => value,
        }
    }
}

impl From<&str> for Priority {
    fn from(value: &str) -> Self {
        match value {
            "high" => Self::High,
            "medium" => Self::Medium,
            "low" => Self::Low,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for Priority {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<Priority> for String {
    fn from(value: Priority) -> Self {
        match value {
            Priority::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A progress note on a task.
///
/// Kept as the raw JSON object so recent updates can be echoed back
/// verbatim in the context output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskUpdate(Map<String, Value>);

impl TaskUpdate {
    pub fn new(content: impl Into<String>, time: Option<&str>) -> Self {
        let mut fields = Map::new();
        fields.insert("content".to_string(), Value::String(content.into()));
        if let Some(time) = time {
            fields.insert("time".to_string(), Value::String(time.to_string()));
        }
        Self(fields)
    }

    /// Update text: `content`, falling back to `note`, else empty.
    pub fn text(&self) -> &str {
        self.non_empty_str("content")
            .or_else(|| self.non_empty_str("note"))
            .unwrap_or_default()
    }

    /// Raw timestamp string, if one was recorded.
    pub fn time(&self) -> Option<&str> {
        self.non_empty_str("time")
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    fn non_empty_str(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .and_then(Value::as_str)
            .filter(|value| !value.is_empty())
    }
}

/// Something preventing progress on a task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blocker {
    #[serde(default, deserialize_with = "nullable")]
    pub desc: String,
    #[serde(default, deserialize_with = "nullable")]
    pub status: String,
}

impl Blocker {
    pub fn open(desc: impl Into<String>) -> Self {
        Self {
            desc: desc.into(),
            status: "open".to_string(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == "open"
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    #[serde(default, deserialize_with = "nullable")]
    pub title: String,
}

/// A single work item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(deserialize_with = "task_id")]
    pub id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub status: TaskStatus,
    #[serde(default, deserialize_with = "nullable")]
    pub priority: Priority,
    #[serde(default, deserialize_with = "progress")]
    pub progress: i64,
    #[serde(default, deserialize_with = "nullable")]
    pub title: String,
    #[serde(default, deserialize_with = "nullable")]
    pub details: String,
    #[serde(default, deserialize_with = "nullable")]
    pub updates: Vec<TaskUpdate>,
    #[serde(default, deserialize_with = "nullable")]
    pub blockers: Vec<Blocker>,
    #[serde(default, deserialize_with = "nullable")]
    pub definition_of_done: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub subtasks: Vec<Subtask>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub if_blocked_then: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started: Option<String>,
}

impl Task {
    pub fn open_blockers(&self) -> impl Iterator<Item = &Blocker> {
        self.blockers.iter().filter(|b| b.is_open())
    }

    pub fn has_open_blocker(&self) -> bool {
        self.open_blockers().next().is_some()
    }
}

/// A project's task file: `{ project, description, tasks }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskCollection {
    #[serde(default, deserialize_with = "nullable")]
    pub project: String,
    #[serde(default, deserialize_with = "nullable")]
    pub description: String,
    #[serde(default, deserialize_with = "nullable")]
    pub tasks: Vec<Task>,
}

/// Treat an explicit JSON `null` the same as a missing field.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Progress is an integer percentage; fractional values are truncated.
fn progress<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let number = Option::<serde_json::Number>::deserialize(deserializer)?;
    Ok(number
        .and_then(|n| n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)))
        .unwrap_or(0))
}

fn task_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(id) => Ok(id),
        Value::Number(id) => Ok(id.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "task id must be a string or number, got {other}"
        ))),
    }
}
