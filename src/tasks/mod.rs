//! Task collection loading.
//!
//! The ranking core only sees in-memory [`TaskCollection`] snapshots; this
//! module is the thin collaborator that reads one from disk.

pub mod types;

use std::path::Path;

use tracing::debug;

use crate::error::{CtxError, Result};

pub use types::{Blocker, Priority, Subtask, Task, TaskCollection, TaskStatus, TaskUpdate};

impl TaskCollection {
    /// Load a task collection from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(CtxError::TaskFileNotFound(path.display().to_string()));
        }

        let raw = std::fs::read_to_string(path)?;
        let collection = Self::from_json(&raw).map_err(|err| CtxError::InvalidTaskFile {
            path: path.display().to_string(),
            reason: err.to_string(),
        })?;

        debug!(
            path = %path.display(),
            tasks = collection.tasks.len(),
            "loaded task collection"
        );
        Ok(collection)
    }

    /// Parse a task collection from a JSON string.
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }
}
