// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `botwork validate`: check bot files without running them

use crate::bots::load_bot;
use crate::output::{self, OutputFormat};
use crate::setup;
use anyhow::Result;
use botwork_engine::validate_bot;
use clap::Args;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Args)]
pub struct ValidateArgs {
    /// Bot definition files
    #[arg(required = true)]
    pub bots: Vec<PathBuf>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BotReport {
    pub file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bot_id: Option<String>,
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl fmt::Display for BotReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = if self.valid { "valid" } else { "invalid" };
        match &self.bot_id {
            Some(id) => write!(f, "{}: {} ({})", self.file, verdict, id)?,
            None => write!(f, "{}: {}", self.file, verdict)?,
        }
        for error in &self.errors {
            write!(f, "\n  error: {}", error)?;
        }
        for warning in &self.warnings {
            write!(f, "\n  warning: {}", warning)?;
        }
        Ok(())
    }
}

/// Exit status is a failure when any file is invalid or unreadable
pub fn handle(args: ValidateArgs, format: OutputFormat) -> Result<ExitCode> {
    let registry = setup::registry()?;

    let reports: Vec<BotReport> = args
        .bots
        .iter()
        .map(|path| {
            let file = path.display().to_string();
            match load_bot(path) {
                Ok(bot) => {
                    let result = validate_bot(&registry, &bot);
                    BotReport {
                        file,
                        bot_id: Some(bot.id),
                        valid: result.valid,
                        errors: result.errors,
                        warnings: result.warnings,
                    }
                }
                Err(e) => BotReport {
                    file,
                    bot_id: None,
                    valid: false,
                    errors: std::iter::once(e.message).chain(e.context).collect(),
                    warnings: Vec::new(),
                },
            }
        })
        .collect();

    output::print_list(&reports, format);
    Ok(if reports.iter().all(|r| r.valid) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
