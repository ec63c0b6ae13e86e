// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `botwork run`: execute one bot now

use crate::bots::{load_bot, parse_trigger_data, parse_variable};
use crate::error::CliError;
use crate::setup;
use anyhow::Result;
use botwork_core::{EngineConfig, IdGen, TriggerType, UuidIdGen};
use botwork_engine::ExecuteOptions;
use clap::Args;
use serde_json::Value;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Args)]
pub struct RunArgs {
    /// Bot definition file (JSON, or TOML by extension)
    pub bot: PathBuf,

    /// Trigger data as JSON, available as {{trigger.*}}
    #[arg(long)]
    pub data: Option<String>,

    /// Set a variable for this run (NAME=VALUE, repeatable)
    #[arg(long = "var", value_name = "NAME=VALUE", value_parser = parse_variable)]
    pub vars: Vec<(String, Value)>,

    /// Allow {{env.NAME}} lookups
    #[arg(long)]
    pub allow_env: bool,
}

/// Prints the `ExecutionResult` as JSON; fails unless the run completed
pub async fn handle(args: RunArgs, config: EngineConfig) -> Result<ExitCode> {
    let bot = load_bot(&args.bot)?;
    let trigger_data = parse_trigger_data(args.data.as_deref())?;

    let mut settings = config.executor;
    settings.allow_env |= args.allow_env;
    let executor = setup::executor(settings)?;

    let report = executor.validate_bot(&bot);
    if !report.valid {
        return Err(CliError::invalid_bot(&bot.id, &report.errors).into());
    }
    for warning in &report.warnings {
        tracing::warn!(bot_id = %bot.id, "{warning}");
    }

    let run_id = UuidIdGen.next("run");
    let mut options = ExecuteOptions::new(TriggerType::Manual)
        .trigger_data(trigger_data)
        .run_id(run_id.clone());
    for (name, value) in args.vars {
        options = options.variable(name, value);
    }

    let run = executor.execute_with(&bot, options);
    tokio::pin!(run);
    let result = tokio::select! {
        result = &mut run => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!(run_id = %run_id, "interrupted, cancelling run");
            executor.abort(&run_id);
            run.await
        }
    };

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(if result.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
