pub mod app;
pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod search;
pub mod tasks;
pub mod test_utils;

pub use error::{CtxError, Result};

/// Package version from Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
