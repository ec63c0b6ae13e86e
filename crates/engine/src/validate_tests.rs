// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use botwork_actions::{register_builtin_actions, FakeHttpClient};
use botwork_core::{ActionConfig, ActionType, ScheduleConfig};
use serde_json::json;

fn registry() -> ActionRegistry {
    let registry = ActionRegistry::new();
    register_builtin_actions(&registry, FakeHttpClient::new());
    registry
}

fn delay(id: &str) -> ActionConfig {
    ActionConfig::new(id, ActionType::Delay, "Wait", 0).with_config(json!({"duration": 1}))
}

#[test]
fn well_formed_bot_is_valid() {
    let bot = BotConfig::new("bot-1", "Waiter")
        .with_action(delay("a"))
        .with_schedule(ScheduleConfig::cron("*/5 * * * *"));
    let result = validate_bot(&registry(), &bot);
    assert!(result.valid, "{:?}", result.errors);
}

#[test]
fn missing_identity_and_actions() {
    let result = validate_bot(&registry(), &BotConfig::new("", " "));
    assert_eq!(
        result.errors,
        vec![
            "Bot id is required",
            "Bot name is required",
            "Bot must have at least one action",
        ]
    );
}

#[test]
fn duplicate_ids_and_unknown_types() {
    let bot = BotConfig::new("bot-1", "Bot")
        .with_action(delay("a"))
        .with_action(delay("a"))
        .with_action(ActionConfig::new("b", "sms", "Text", 2));
    let result = validate_bot(&registry(), &bot);
    assert!(!result.valid);
    assert!(result.errors.contains(&"Duplicate action id: a".to_string()));
    assert!(result
        .errors
        .contains(&"Action b: No handler registered for action type: sms".to_string()));
}

#[test]
fn plugin_config_errors_are_prefixed() {
    let bot = BotConfig::new("bot-1", "Bot")
        .with_action(ActionConfig::new("call", ActionType::Http, "Call", 0).with_config(json!({})));
    let result = validate_bot(&registry(), &bot);
    assert!(!result.valid);
    assert!(result.errors.iter().all(|e| e.starts_with("Action call: ")));
}

#[test]
fn bad_cron_is_reported() {
    let bot = BotConfig::new("bot-1", "Bot")
        .with_action(delay("a"))
        .with_schedule(ScheduleConfig::cron("60 * * * *"));
    let result = validate_bot(&registry(), &bot);
    assert!(!result.valid);
    assert!(result.errors[0].starts_with("Schedule: "));
    assert!(result.errors[0].contains("out of range"));
}

#[test]
fn disabled_type_is_a_warning() {
    let registry = registry();
    registry.disable(&ActionType::Delay).unwrap();
    let bot = BotConfig::new("bot-1", "Bot").with_action(delay("a"));
    let result = validate_bot(&registry, &bot);
    assert!(result.valid);
    assert_eq!(result.warnings, vec!["Action a: action type 'delay' is disabled"]);
}
