use std::path::PathBuf;

use chrono::{DateTime, Utc};
use tempfile::TempDir;

use crate::tasks::{Blocker, Subtask, Task, TaskCollection, TaskUpdate};

/// Reference "now" shared by recency tests: 2024-06-01T12:00:00Z.
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::from_timestamp(1_717_243_200, 0).expect("valid fixture timestamp")
}

/// Fluent builder for [`Task`] values in tests.
#[derive(Debug, Clone)]
pub struct TaskBuilder {
    task: Task,
}

impl TaskBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            task: Task {
                id: id.to_string(),
                ..Task::default()
            },
        }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.task.title = title.to_string();
        self
    }

    pub fn details(mut self, details: &str) -> Self {
        self.task.details = details.to_string();
        self
    }

    pub fn status(mut self, status: &str) -> Self {
        self.task.status = status.into();
        self
    }

    pub fn priority(mut self, priority: &str) -> Self {
        self.task.priority = priority.into();
        self
    }

    pub fn progress(mut self, progress: i64) -> Self {
        self.task.progress = progress;
        self
    }

    pub fn next_action(mut self, action: &str) -> Self {
        self.task.next_action = Some(action.to_string());
        self
    }

    pub fn if_blocked_then(mut self, fallback: &str) -> Self {
        self.task.if_blocked_then = Some(fallback.to_string());
        self
    }

    pub fn open_blocker(mut self, desc: &str) -> Self {
        self.task.blockers.push(Blocker::open(desc));
        self
    }

    pub fn blocker(mut self, desc: &str, status: &str) -> Self {
        self.task.blockers.push(Blocker {
            desc: desc.to_string(),
            status: status.to_string(),
        });
        self
    }

    pub fn update(mut self, content: &str, time: Option<&str>) -> Self {
        self.task.updates.push(TaskUpdate::new(content, time));
        self
    }

    pub fn done_when(mut self, criterion: &str) -> Self {
        self.task.definition_of_done.push(criterion.to_string());
        self
    }

    pub fn subtask(mut self, title: &str) -> Self {
        self.task.subtasks.push(Subtask {
            title: title.to_string(),
        });
        self
    }

    pub fn created(mut self, at: &str) -> Self {
        self.task.created = Some(at.to_string());
        self
    }

    pub fn started(mut self, at: &str) -> Self {
        self.task.started = Some(at.to_string());
        self
    }

    pub fn build(self) -> Task {
        self.task
    }
}

/// A small but varied project used by end-to-end tests.
pub fn sample_collection() -> TaskCollection {
    TaskCollection {
        project: "checkout".to_string(),
        description: "Checkout service rewrite".to_string(),
        tasks: vec![
            TaskBuilder::new("T-1")
                .title("Payments webhook")
                .details("Stripe signature verification")
                .status("in-progress")
                .priority("high")
                .progress(60)
                .next_action("Verify signatures against the staging secret")
                .update("wired webhook handler", Some("2024-05-30T09:00:00Z"))
                .created("2024-05-01T00:00:00Z")
                .build(),
            TaskBuilder::new("T-2")
                .title("Login page")
                .details("OAuth redirect handling")
                .priority("medium")
                .update("payments team asked for a redirect", Some("2024-05-20T10:00:00Z"))
                .created("2024-05-10T00:00:00Z")
                .build(),
            TaskBuilder::new("T-3")
                .title("Refund flow")
                .details("Partial refunds through Stripe")
                .status("blocked")
                .priority("high")
                .open_blocker("waiting on finance sign-off")
                .if_blocked_then("Draft the refund ledger schema")
                .created("2024-04-01T00:00:00Z")
                .build(),
            TaskBuilder::new("T-4")
                .title("Docs")
                .details("Write a guide for the checkout API")
                .priority("low")
                .done_when("guide published")
                .build(),
            TaskBuilder::new("T-5")
                .title("Cart totals")
                .details("Tax rounding bug")
                .status("done")
                .progress(100)
                .build(),
        ],
    }
}

/// A task collection written to an isolated temp directory.
pub struct TaskFileFixture {
    pub temp_dir: TempDir,
    pub path: PathBuf,
}

impl TaskFileFixture {
    pub fn new(collection: &TaskCollection) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("tasks.json");
        let raw = serde_json::to_string_pretty(collection).expect("serialize collection");
        std::fs::write(&path, raw).expect("Failed to write task file");

        println!("[FIXTURE] Wrote {} tasks to {:?}", collection.tasks.len(), path);

        Self { temp_dir, path }
    }

    /// Path inside the fixture directory, for index files and configs.
    pub fn sibling(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }
}
