//! Eligibility filter: which tasks are considered at all.

use crate::tasks::{Task, TaskStatus};

use super::mode::ContextMode;

/// Select the tasks eligible for ranking under `mode`.
///
/// Closed tasks (`done`, `canceled`) are always excluded. `unblock` further
/// keeps only tasks with an open blocker and `wip` only in-progress tasks.
/// Input order is preserved.
pub fn eligible_tasks(tasks: &[Task], mode: ContextMode) -> Vec<&Task> {
    tasks
        .iter()
        .filter(|task| !task.status.is_closed())
        .filter(|task| match mode {
            ContextMode::Unblock => task.has_open_blocker(),
            ContextMode::Wip => task.status == TaskStatus::InProgress,
            ContextMode::Execute | ContextMode::Plan | ContextMode::Recent => true,
        })
        .collect()
}
