// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Static pre-flight check of a bot definition

use botwork_actions::{ActionRegistry, RegistryError, ValidationResult};
use botwork_core::{BotConfig, CronParser};
use std::collections::HashSet;

/// Check a bot without running it
///
/// Config is validated as authored, so `{{...}}` placeholders that only
/// resolve at run time must still satisfy each plugin's schema shape.
pub fn validate_bot(registry: &ActionRegistry, bot: &BotConfig) -> ValidationResult {
    let mut result = ValidationResult::ok();

    if bot.id.trim().is_empty() {
        result.error("Bot id is required");
    }
    if bot.name.trim().is_empty() {
        result.error("Bot name is required");
    }
    if bot.actions.is_empty() {
        result.error("Bot must have at least one action");
    }

    let mut seen = HashSet::new();
    for action in &bot.actions {
        if !seen.insert(action.id.as_str()) {
            result.error(format!("Duplicate action id: {}", action.id));
        }
        if !registry.has(&action.action_type) {
            result.error(format!(
                "Action {}: {}",
                action.id,
                RegistryError::NotRegistered(action.action_type.to_string())
            ));
            continue;
        }
        if !registry.is_enabled(&action.action_type) {
            result.warning(format!(
                "Action {}: action type '{}' is disabled",
                action.id, action.action_type
            ));
        }
        let prefix = format!("Action {}: ", action.id);
        result.absorb(&prefix, registry.validate_config(&action.action_type, &action.config));
    }

    if let Some(schedule) = &bot.schedule {
        match (&schedule.cron_expression, schedule.run_at) {
            (_, Some(_)) => {}
            (Some(expr), None) => {
                let check = CronParser::validate(expr);
                if let Some(error) = check.error {
                    result.error(format!("Schedule: {}", error));
                }
            }
            (None, None) => result.error("Schedule needs a cron expression or a run time"),
        }
    }

    if bot.execution_plan().is_empty() && !bot.actions.is_empty() {
        result.warning("Every action is disabled");
    }

    result
}

#[cfg(test)]
#[path = "validate_tests.rs"]
mod tests;
