// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Loading bot definitions from disk

use crate::error::CliError;
use botwork_core::BotConfig;
use serde_json::Value;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotFormat {
    Json,
    Toml,
}

impl BotFormat {
    /// `.toml` files are TOML; everything else is read as JSON
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => BotFormat::Toml,
            _ => BotFormat::Json,
        }
    }
}

pub fn parse_bot(content: &str, format: BotFormat) -> Result<BotConfig, String> {
    match format {
        BotFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
        BotFormat::Toml => toml::from_str(content).map_err(|e| e.to_string()),
    }
}

pub fn load_bot(path: &Path) -> Result<BotConfig, CliError> {
    let content =
        std::fs::read_to_string(path).map_err(|e| CliError::bot_file_unreadable(path, e))?;
    let bot = parse_bot(&content, BotFormat::for_path(path))
        .map_err(|detail| CliError::bot_file_invalid(path, detail))?;
    tracing::debug!(path = %path.display(), bot_id = %bot.id, "bot loaded");
    Ok(bot)
}

/// Trigger data from `--data`; absent means `null`
pub fn parse_trigger_data(raw: Option<&str>) -> Result<Value, CliError> {
    match raw {
        None => Ok(Value::Null),
        Some(raw) => serde_json::from_str(raw).map_err(CliError::invalid_trigger_data),
    }
}

/// `NAME=VALUE` pairs from `--var`; values that parse as JSON keep their type
pub fn parse_variable(raw: &str) -> Result<(String, Value), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{raw}'"))?;
    if name.is_empty() {
        return Err(format!("missing variable name in '{raw}'"));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((name.to_string(), value))
}

#[cfg(test)]
#[path = "bots_tests.rs"]
mod tests;
