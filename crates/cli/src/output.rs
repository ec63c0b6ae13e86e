// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Output formatting for CLI commands

use clap::ValueEnum;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Render one value in the requested format
pub fn render<T: Serialize + std::fmt::Display>(value: &T, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => value.to_string(),
        OutputFormat::Json => serde_json::to_string_pretty(value).unwrap_or_default(),
    }
}

/// Render a list: one item per line as text, a single array as JSON
pub fn render_list<T: Serialize + std::fmt::Display>(items: &[T], format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => items
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n"),
        OutputFormat::Json => serde_json::to_string_pretty(items).unwrap_or_default(),
    }
}

pub fn print<T: Serialize + std::fmt::Display>(value: &T, format: OutputFormat) {
    println!("{}", render(value, format));
}

pub fn print_list<T: Serialize + std::fmt::Display>(items: &[T], format: OutputFormat) {
    if items.is_empty() && format == OutputFormat::Text {
        return;
    }
    println!("{}", render_list(items, format));
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
