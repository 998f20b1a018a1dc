//! sshdeploy CLI - push build output to a remote host over SSH
//!
//! Usage: sshdeploy <COMMAND>
//!
//! Commands:
//!   push     Deploy the source directory once
//!   monitor  Redeploy whenever the source directory changes

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod ui;

use cli::{Cli, Commands};
use commands::monitor::MonitorArgs;

fn main() -> ExitCode {
    let cli = Cli::parse();
    sshdeploy::logging::init(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprint!("{}", ui::error::format_error(&err));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Commands::Push { deploy, dry_run } => {
            commands::push::cmd_push(&deploy, dry_run, cli.json, cli.verbose)
        }
        Commands::Monitor {
            deploy,
            trigger_file,
            debounce_ms,
            no_initial_deploy,
        } => commands::monitor::cmd_monitor(
            &deploy,
            MonitorArgs {
                trigger_file,
                debounce_ms,
                no_initial_deploy,
            },
            cli.json,
            cli.verbose,
        ),
    }
}
