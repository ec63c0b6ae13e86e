// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! botwork - run automation bots once or on their schedules

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod bots;
mod commands;
mod error;
mod logging;
mod output;
mod setup;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{actions, cron, run, schedule, validate};
use output::OutputFormat;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "botwork",
    version,
    about = "botwork - scheduled automation bots"
)]
struct Cli {
    /// Engine configuration file (TOML); defaults to ./botwork.toml if present
    #[arg(long, global = true, env = "BOTWORK_CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a bot once and print its execution result
    Run(run::RunArgs),
    /// Validate bot definition files
    Validate(validate::ValidateArgs),
    /// Inspect cron expressions
    Cron {
        #[command(subcommand)]
        command: cron::CronCommand,
    },
    /// List the available action types
    Actions,
    /// Run bots on their schedules until Ctrl-C
    Schedule(schedule::ScheduleArgs),
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let log_file = match &cli.command {
        Commands::Schedule(args) => args.log_file.clone(),
        _ => None,
    };
    let _log_guard = logging::init(log_file.as_deref())?;

    match cli.command {
        Commands::Run(args) => {
            let config = setup::load_config(cli.config.as_deref())?;
            run::handle(args, config).await
        }
        Commands::Validate(args) => validate::handle(args, cli.format),
        Commands::Cron { command } => cron::handle(command, cli.format),
        Commands::Actions => {
            actions::handle(cli.format)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Schedule(args) => {
            let config = setup::load_config(cli.config.as_deref())?;
            schedule::handle(args, config, cli.format).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
