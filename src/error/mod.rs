//! Error handling for taskctx.
//!
//! This module provides:
//! - [`CtxError`]: The main error enum for all taskctx operations
//! - [`ErrorCode`]: Standardized error codes for machine parsing
//! - [`StructuredError`]: Rich error type with suggestions and context
//!
//! Only collaborator concerns (task loading, config, index IO) produce
//! errors. The ranking pipeline itself is infallible and contains every
//! relevance-provider failure.

mod codes;
mod suggestions;

use std::io;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub use codes::ErrorCode;
pub use suggestions::suggest_for_error;

/// Main error type for taskctx operations.
#[derive(Error, Debug)]
pub enum CtxError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Search index error: {0}")]
    SearchIndex(#[from] tantivy::TantivyError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Task file not found: {0}")]
    TaskFileNotFound(String),

    #[error("Invalid task file {path}: {reason}")]
    InvalidTaskFile { path: String, reason: String },

    #[error("Index build failed: {0}")]
    IndexBuild(String),

    #[error("Query parse error: {0}")]
    QueryParse(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Config file not found: {0}")]
    ConfigNotFound(String),

    #[error("Missing required config: {0}")]
    MissingConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CtxError {
    /// Get the error code for this error.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Database(_) => ErrorCode::DatabaseError,
            Self::Io(_) => ErrorCode::StorageReadError,
            Self::SearchIndex(_) => ErrorCode::IndexCorrupted,
            Self::Json(_) | Self::Serialization(_) => ErrorCode::SerializationError,
            Self::TaskFileNotFound(_) => ErrorCode::TaskFileNotFound,
            Self::InvalidTaskFile { .. } => ErrorCode::TaskFileInvalid,
            Self::IndexBuild(_) => ErrorCode::IndexBuildFailed,
            Self::QueryParse(_) => ErrorCode::SearchQueryInvalid,
            Self::Config(_) => ErrorCode::ConfigInvalid,
            Self::ConfigNotFound(_) => ErrorCode::ConfigNotFound,
            Self::MissingConfig(_) => ErrorCode::ConfigMissingRequired,
        }
    }

    /// Get context information for this error as JSON.
    #[must_use]
    pub fn context(&self) -> Option<Value> {
        match self {
            Self::TaskFileNotFound(path) | Self::ConfigNotFound(path) => {
                Some(serde_json::json!({ "path": path }))
            }
            Self::InvalidTaskFile { path, reason } => {
                Some(serde_json::json!({ "path": path, "reason": reason }))
            }
            Self::MissingConfig(key) => Some(serde_json::json!({ "config_key": key })),
            _ => None,
        }
    }

    /// Convert this error to a structured error.
    #[must_use]
    pub fn to_structured(&self) -> StructuredError {
        StructuredError::from_ctx_error(self)
    }
}

/// A structured error with machine-readable code, suggestion, and context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// The error code (e.g., "TASK_FILE_NOT_FOUND")
    pub code: ErrorCode,

    /// The numeric error code (e.g., 101)
    pub numeric_code: u16,

    /// Human-readable error message
    pub message: String,

    /// Actionable suggestion for recovery
    pub suggestion: String,

    /// Additional context for debugging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,

    /// Whether this error is potentially recoverable by the user
    pub recoverable: bool,

    /// Error category (e.g., "task", "config", "index")
    pub category: String,
}

impl StructuredError {
    /// Create a new structured error.
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            numeric_code: code.numeric(),
            suggestion: code.suggestion().to_string(),
            context: None,
            recoverable: code.is_recoverable(),
            category: code.category().to_string(),
            code,
            message: message.into(),
        }
    }

    /// Create a structured error from a [`CtxError`].
    #[must_use]
    pub fn from_ctx_error(err: &CtxError) -> Self {
        let code = err.code();
        let context = err.context();
        let suggestion = suggest_for_error(code, context.as_ref());

        Self {
            code,
            numeric_code: code.numeric(),
            message: err.to_string(),
            suggestion,
            context,
            recoverable: code.is_recoverable(),
            category: code.category().to_string(),
        }
    }
}

impl std::fmt::Display for StructuredError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl From<&CtxError> for StructuredError {
    fn from(err: &CtxError) -> Self {
        Self::from_ctx_error(err)
    }
}

/// Result type alias using [`CtxError`].
pub type Result<T> = std::result::Result<T, CtxError>;
