//! Standardized error codes for machine-parseable output.
//!
//! Error codes follow a numeric taxonomy:
//! - 1xx: Task input errors
//! - 2xx: Index errors
//! - 3xx: Config errors
//! - 4xx: Search errors
//! - 6xx: Storage errors

use serde::{Deserialize, Serialize};

/// Standardized error codes for robot mode output.
///
/// Each variant maps to a numeric code (e.g., `TaskFileNotFound` -> E101).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================
    // Task input errors (1xx)
    // ========================================
    /// E101: Task file does not exist
    TaskFileNotFound,
    /// E102: Task file is not a valid task collection
    TaskFileInvalid,

    // ========================================
    // Index errors (2xx)
    // ========================================
    /// E201: Index files are corrupted or unreadable
    IndexCorrupted,
    /// E202: Index could not be built from the document set
    IndexBuildFailed,

    // ========================================
    // Config errors (3xx)
    // ========================================
    /// E301: Config file not found
    ConfigNotFound,
    /// E302: Config file has invalid syntax or values
    ConfigInvalid,
    /// E304: Required config value is missing
    ConfigMissingRequired,

    // ========================================
    // Search errors (4xx)
    // ========================================
    /// E401: Search query could not be parsed by the backend
    SearchQueryInvalid,

    // ========================================
    // Storage errors (6xx)
    // ========================================
    /// E601: Failed to read from storage
    StorageReadError,
    /// E604: Database operation failed
    DatabaseError,
    /// E605: Serialization/deserialization failed
    SerializationError,
}

impl ErrorCode {
    /// Get the numeric error code (e.g., `TaskFileNotFound` -> 101).
    #[must_use]
    pub const fn numeric(&self) -> u16 {
        match self {
            Self::TaskFileNotFound => 101,
            Self::TaskFileInvalid => 102,

            Self::IndexCorrupted => 201,
            Self::IndexBuildFailed => 202,

            Self::ConfigNotFound => 301,
            Self::ConfigInvalid => 302,
            Self::ConfigMissingRequired => 304,

            Self::SearchQueryInvalid => 401,

            Self::StorageReadError => 601,
            Self::DatabaseError => 604,
            Self::SerializationError => 605,
        }
    }

    /// Get the error code as a formatted string (e.g., "E101").
    #[must_use]
    pub fn code_string(&self) -> String {
        format!("E{}", self.numeric())
    }

    /// Get the default suggestion for this error code.
    #[must_use]
    pub const fn suggestion(&self) -> &'static str {
        match self {
            Self::TaskFileNotFound => "Check the --task-file path. It must point to a JSON task collection",
            Self::TaskFileInvalid => "The task file must be a JSON object with a `tasks` array. Each task needs an `id`",

            Self::IndexCorrupted => "Delete the index database passed via --index-db; it is rebuilt on the next run",
            Self::IndexBuildFailed => "Retry with --backend none to rank without full-text relevance",

            Self::ConfigNotFound => "Create the config file or drop --config to use defaults",
            Self::ConfigInvalid => "Run `taskctx config` to see current values. Check TOML syntax in config file",
            Self::ConfigMissingRequired => "Set the missing value in config.toml or via a TASKCTX_* environment variable",

            Self::SearchQueryInvalid => "Use plain words in --query; punctuation is ignored",

            Self::StorageReadError => "Check file permissions and ensure the path is accessible",
            Self::DatabaseError => "Delete the index database and rerun; it is a cache and safe to remove",
            Self::SerializationError => "The data format may be corrupted. Check input data for validity",
        }
    }

    /// Check if this error is potentially recoverable by the user.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::TaskFileNotFound
            | Self::TaskFileInvalid
            | Self::IndexBuildFailed
            | Self::ConfigNotFound
            | Self::ConfigInvalid
            | Self::ConfigMissingRequired
            | Self::SearchQueryInvalid
            | Self::StorageReadError => true,

            Self::IndexCorrupted
            | Self::DatabaseError
            | Self::SerializationError => false,
        }
    }

    /// Get the error category name.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self.numeric() / 100 {
            1 => "task",
            2 => "index",
            3 => "config",
            4 => "search",
            6 => "storage",
            _ => "unknown",
        }
    }

    /// Iterate over all error codes.
    pub fn all() -> impl Iterator<Item = Self> {
        [
            Self::TaskFileNotFound,
            Self::TaskFileInvalid,
            Self::IndexCorrupted,
            Self::IndexBuildFailed,
            Self::ConfigNotFound,
            Self::ConfigInvalid,
            Self::ConfigMissingRequired,
            Self::SearchQueryInvalid,
            Self::StorageReadError,
            Self::DatabaseError,
            Self::SerializationError,
        ]
        .into_iter()
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code_string())
    }
}
