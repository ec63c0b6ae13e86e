// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User-facing errors with context and suggestions.

use std::fmt;
use std::path::Path;

/// Error with context and recovery suggestions for terminal display.
#[derive(Debug)]
pub struct CliError {
    /// What went wrong
    pub message: String,
    /// Details explaining the failure
    pub context: Vec<String>,
    /// How to fix it
    pub suggestions: Vec<String>,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: Vec::new(),
            suggestions: Vec::new(),
            source: None,
        }
    }

    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        self.context.push(ctx.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_source<E: std::error::Error + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// A bot file could not be read from disk.
    pub fn bot_file_unreadable(path: &Path, source: std::io::Error) -> Self {
        CliError::new(format!("Cannot read bot file '{}'", path.display()))
            .with_context(source.to_string())
            .with_suggestion("Check the path and file permissions")
            .with_source(source)
    }

    /// A bot file was read but does not describe a bot.
    pub fn bot_file_invalid(path: &Path, detail: impl Into<String>) -> Self {
        CliError::new(format!("Bot file '{}' is not a valid bot", path.display()))
            .with_context(detail)
            .with_suggestion("Bot files are JSON, or TOML when the extension is .toml")
            .with_suggestion("Keys are camelCase, e.g. stopOnError, cronExpression")
    }

    /// Validation found errors in a bot.
    pub fn invalid_bot(bot_id: &str, errors: &[String]) -> Self {
        let mut err = CliError::new(format!("Bot '{}' failed validation", bot_id));
        for error in errors {
            err = err.with_context(error.clone());
        }
        err.with_suggestion("See all problems with: botwork validate <bot file>")
    }

    /// A cron expression was rejected.
    pub fn invalid_cron(expression: &str, reason: impl Into<String>) -> Self {
        CliError::new(format!("Invalid cron expression '{}'", expression))
            .with_context(reason)
            .with_suggestion("Use five fields: minute hour day-of-month month day-of-week")
            .with_suggestion("Check it with: botwork cron validate \"<expression>\"")
    }

    /// Trigger data passed on the command line is not JSON.
    pub fn invalid_trigger_data(source: serde_json::Error) -> Self {
        CliError::new("Trigger data is not valid JSON")
            .with_context(source.to_string())
            .with_suggestion("Quote the value, e.g. --data '{\"user\": \"ada\"}'")
            .with_source(source)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "error: {}", self.message)?;

        if !self.context.is_empty() {
            writeln!(f)?;
            for ctx in &self.context {
                writeln!(f, "  -> {}", ctx)?;
            }
        }

        if !self.suggestions.is_empty() {
            writeln!(f)?;
            writeln!(f, "suggestions:")?;
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, suggestion)?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
