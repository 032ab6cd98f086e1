//! CLI module - Command-line interface definitions and handlers
//!
//! Uses clap v4 with derive macros for argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use output::OutputFormat;

pub mod commands;
pub mod formatters;
pub mod output;

/// taskctx - Pick the few tasks worth an agent's attention right now
#[derive(Parser, Debug)]
#[command(name = "taskctx")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable JSON output for machine consumption (same as -O json).
    #[arg(long, global = true, hide = true)]
    pub robot: bool,

    /// Output format (human, json, jsonl, plain, tsv)
    #[arg(long, short = 'O', global = true, value_enum)]
    pub output_format: Option<OutputFormat>,

    /// Enable machine-readable JSON output (shorthand for --output-format=json)
    #[arg(long, short = 'm', global = true)]
    pub machine: bool,

    /// Force plain output (no colors)
    #[arg(long, global = true)]
    pub plain: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all logging
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file path (default: ~/.config/taskctx/config.toml + ./.taskctx/config.toml)
    #[arg(long, global = true, env = "TASKCTX_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Get the effective output format.
    ///
    /// Priority order:
    /// 1. `--plain` → Plain format
    /// 2. `--output-format` → Explicit format
    /// 3. `--machine` → JSON format (shorthand)
    /// 4. `--robot` → JSON format
    /// 5. Default → Human format
    #[must_use]
    pub fn output_format(&self) -> OutputFormat {
        if self.plain {
            return OutputFormat::Plain;
        }
        if let Some(fmt) = self.output_format {
            return fmt;
        }
        OutputFormat::from_args(self.machine || self.robot, None)
    }

    /// Whether an output format was chosen on the command line.
    #[must_use]
    pub const fn has_explicit_format(&self) -> bool {
        self.plain || self.output_format.is_some() || self.machine || self.robot
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Rank tasks and print the most useful context
    Context(commands::context::ContextArgs),

    /// Show the effective configuration
    Config(commands::config::ConfigArgs),
}
