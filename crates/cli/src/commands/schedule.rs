// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `botwork schedule`: run bots on their schedules until interrupted

use crate::bots::load_bot;
use crate::error::CliError;
use crate::output::{self, OutputFormat};
use crate::setup;
use anyhow::Result;
use botwork_core::EngineConfig;
use botwork_engine::{BotScheduler, UpcomingRun};
use clap::Args;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args)]
pub struct ScheduleArgs {
    /// Bot definition files; each needs a schedule
    #[arg(required = true)]
    pub bots: Vec<PathBuf>,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Print the upcoming runs and exit without starting
    #[arg(long)]
    pub dry_run: bool,

    /// How many upcoming runs `--dry-run` lists
    #[arg(long, default_value_t = 10)]
    pub upcoming: usize,
}

#[derive(Serialize)]
#[serde(transparent)]
struct UpcomingRow(UpcomingRun);

impl fmt::Display for UpcomingRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let run = &self.0;
        write!(
            f,
            "{}  {:<16} {}",
            run.run_at.format("%Y-%m-%dT%H:%M:%SZ"),
            run.bot_id,
            run.bot_name
        )
    }
}

pub async fn handle(args: ScheduleArgs, config: EngineConfig, format: OutputFormat) -> Result<()> {
    let executor = Arc::new(setup::executor(config.executor)?);
    let scheduler = BotScheduler::new(Arc::clone(&executor), config.scheduler);

    for path in &args.bots {
        let bot = load_bot(path)?;
        let report = executor.validate_bot(&bot);
        if !report.valid {
            return Err(CliError::invalid_bot(&bot.id, &report.errors).into());
        }
        scheduler.register_bot(bot)?;
    }

    if args.dry_run {
        let rows: Vec<UpcomingRow> = scheduler
            .get_upcoming_runs(args.upcoming)
            .into_iter()
            .map(UpcomingRow)
            .collect();
        output::print_list(&rows, format);
        return Ok(());
    }

    scheduler.on_execution(|job, result| {
        tracing::info!(
            bot_id = %job.bot_id,
            run_id = %result.run_id,
            status = %result.status,
            executions = job.execution_count,
            "run recorded"
        );
    });
    scheduler.on_error(|queued, error| {
        tracing::warn!(bot_id = %queued.bot_id, attempts = queued.attempts, %error, "run not started");
    });

    let handle = scheduler.start()?;
    eprintln!(
        "Scheduling {} bot(s); press Ctrl-C to stop",
        scheduler.stats().jobs
    );

    tokio::signal::ctrl_c().await?;
    scheduler.stop();
    handle.await?;
    for run_id in executor.active_runs() {
        executor.abort(&run_id);
    }
    Ok(())
}
