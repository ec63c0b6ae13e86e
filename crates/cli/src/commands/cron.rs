// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `botwork cron`: inspect cron expressions

use crate::error::CliError;
use crate::output::{self, OutputFormat};
use anyhow::Result;
use botwork_core::CronParser;
use chrono::{DateTime, Utc};
use clap::Subcommand;
use serde::Serialize;
use std::fmt;
use std::process::ExitCode;

#[derive(Subcommand)]
pub enum CronCommand {
    /// Check an expression and report the first problem
    Validate {
        /// Five-field cron expression (quote it)
        expression: String,
    },
    /// Describe an expression in words
    Describe {
        /// Five-field cron expression (quote it)
        expression: String,
    },
    /// List the next run times (UTC)
    Next {
        /// Five-field cron expression (quote it)
        expression: String,
        /// How many run times to list
        #[arg(short = 'n', long, default_value_t = 5)]
        count: usize,
        /// Start after this instant (RFC 3339) instead of now
        #[arg(long)]
        from: Option<DateTime<Utc>>,
    },
}

#[derive(Serialize)]
struct Description {
    expression: String,
    description: String,
}

impl fmt::Display for Description {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description)
    }
}

#[derive(Serialize)]
#[serde(transparent)]
struct RunTime(DateTime<Utc>);

impl fmt::Display for RunTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%dT%H:%M:%SZ"))
    }
}

pub fn handle(command: CronCommand, format: OutputFormat) -> Result<ExitCode> {
    match command {
        CronCommand::Validate { expression } => {
            let validation = CronParser::validate(&expression);
            output::print(&ValidationView(&validation), format);
            Ok(if validation.valid {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        CronCommand::Describe { expression } => {
            let description = CronParser::describe(&expression);
            output::print(
                &Description {
                    expression,
                    description,
                },
                format,
            );
            Ok(ExitCode::SUCCESS)
        }
        CronCommand::Next {
            expression,
            count,
            from,
        } => {
            let from = from.unwrap_or_else(Utc::now);
            let runs = CronParser::upcoming(&expression, from, count)
                .map_err(|e| CliError::invalid_cron(&expression, e.to_string()))?;
            let runs: Vec<RunTime> = runs.into_iter().map(RunTime).collect();
            output::print_list(&runs, format);
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Borrowed view so the parser's result serializes without a copy
#[derive(Serialize)]
#[serde(transparent)]
struct ValidationView<'a>(&'a botwork_core::CronValidation);

impl fmt::Display for ValidationView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0.error {
            None => write!(f, "valid"),
            Some(error) => write!(f, "invalid: {error}"),
        }
    }
}
