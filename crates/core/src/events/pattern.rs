// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Patterns selecting execution events by name

use super::event::ExecutionEvent;

/// Which events a listener receives
///
/// Event names are `category:kind`, e.g. `action:failed`. Accepted forms:
///   - `*` or `**`: every event
///   - `execution:*` or `execution:**`: one category
///   - `*:failed`: one kind in any category
///   - `action:skipped`: one exact event
///
/// Anything else, the empty string included, matches nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventPattern {
    All,
    Category(String),
    Kind(String),
    Exact(String),
    Never,
}

impl EventPattern {
    pub fn parse(pattern: &str) -> Self {
        if pattern == "*" || pattern == "**" {
            return Self::All;
        }
        let Some((category, kind)) = pattern.split_once(':') else {
            return Self::Never;
        };
        if category.is_empty() || kind.is_empty() || kind.contains(':') {
            return Self::Never;
        }
        match (category, kind) {
            ("*", "*" | "**") => Self::All,
            (_, "*" | "**") => Self::Category(category.to_string()),
            ("*", _) => Self::Kind(kind.to_string()),
            _ => Self::Exact(pattern.to_string()),
        }
    }

    pub fn matches(&self, event: &ExecutionEvent) -> bool {
        self.matches_name(event.name())
    }

    pub fn matches_name(&self, name: &str) -> bool {
        let (category, kind) = name.split_once(':').unwrap_or((name, ""));
        match self {
            Self::All => true,
            Self::Category(c) => c == category,
            Self::Kind(k) => k == kind,
            Self::Exact(e) => e == name,
            Self::Never => false,
        }
    }
}

impl From<&str> for EventPattern {
    fn from(pattern: &str) -> Self {
        Self::parse(pattern)
    }
}

#[cfg(test)]
#[path = "pattern_tests.rs"]
mod tests;
