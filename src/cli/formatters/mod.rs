//! Output formatters for CLI commands
//!
//! Render command results for the human-facing formats (Human, Plain) and
//! supply row layouts for TSV. JSON and JSONL serialize the result types
//! directly.

mod context_results;

pub use context_results::{TSV_HEADERS, format_context, tsv_row};
