//! taskctx - Task context CLI
//!
//! Rank a project's tasks and print the handful worth acting on next.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use taskctx::Result;
use taskctx::app::AppContext;
use taskctx::cli::Cli;
use taskctx::cli::output::{emit_json, robot_error_structured};

fn main() -> ExitCode {
    let cli = Cli::parse();
    let machine = cli.output_format().is_machine_readable();
    init_tracing(&cli, machine);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if machine {
                // Robot mode: structured error to stdout
                if emit_json(&robot_error_structured(&e)).is_err() {
                    eprintln!("Error: {e}");
                }
            } else {
                eprintln!("Error: {e}");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let ctx = AppContext::from_cli(cli)?;
    taskctx::cli::commands::run(&ctx, &cli.command)
}

fn init_tracing(cli: &Cli, machine: bool) {
    if cli.quiet {
        return;
    }

    let filter = match cli.verbose {
        0 => "warn,taskctx=info",
        1 => "info,taskctx=debug",
        2 => "debug,taskctx=trace",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    if machine {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
