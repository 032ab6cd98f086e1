//! Shared state handed to every command.

use std::path::PathBuf;

use tracing::debug;

use crate::cli::{Cli, OutputFormat};
use crate::config::Config;
use crate::error::Result;

pub struct AppContext {
    pub config: Config,
    pub output_format: OutputFormat,
    /// Errors are reported as JSON on stdout.
    pub robot_mode: bool,
    pub project_root: PathBuf,
}

impl AppContext {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let project_root = std::env::current_dir()?;
        let config = Config::load(cli.config.as_deref(), &project_root)?;

        let output_format = if !cli.has_explicit_format() && config.output.robot {
            OutputFormat::Json
        } else {
            cli.output_format()
        };
        debug!(format = ?output_format, root = %project_root.display(), "app context ready");

        Ok(Self {
            robot_mode: output_format.is_machine_readable(),
            config,
            output_format,
            project_root,
        })
    }

    #[cfg(test)]
    pub(crate) fn for_tests(config: Config, output_format: OutputFormat) -> Self {
        Self {
            config,
            output_format,
            robot_mode: output_format.is_machine_readable(),
            project_root: PathBuf::from("."),
        }
    }
}
