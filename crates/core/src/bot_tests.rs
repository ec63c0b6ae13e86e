// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;
use yare::parameterized;

#[parameterized(
    http = { "http", ActionType::Http },
    upper = { "SLACK", ActionType::Slack },
    transform = { "transform", ActionType::Transform },
    custom = { "sms", ActionType::Custom("sms".to_string()) },
)]
fn action_type_from_str(input: &str, expected: ActionType) {
    assert_eq!(ActionType::from(input), expected);
}

#[test]
fn action_type_round_trips_through_json() {
    let json = serde_json::to_string(&ActionType::Discord).unwrap();
    assert_eq!(json, "\"discord\"");
    let custom: ActionType = serde_json::from_str("\"pagerduty\"").unwrap();
    assert_eq!(custom.as_str(), "pagerduty");
}

#[test]
fn bot_deserializes_from_camel_case_json() {
    let bot: BotConfig = serde_json::from_value(json!({
        "id": "bot-1",
        "name": "Deploy notifier",
        "actions": [
            {
                "id": "fetch",
                "type": "http",
                "name": "Fetch status",
                "order": 0,
                "config": { "url": "https://api.example.com/status" },
                "timeoutMs": 5000,
                "retry": { "maxRetries": 1 }
            },
            {
                "id": "notify",
                "type": "slack",
                "name": "Notify",
                "order": 1,
                "continueOnError": true,
                "condition": "{{previous.status}} == 200"
            }
        ],
        "schedule": { "cron": "*/5 * * * *", "maxExecutions": 10 },
        "settings": { "stopOnError": false, "variables": { "team": "ops" } }
    }))
    .unwrap();

    assert_eq!(bot.actions.len(), 2);
    assert_eq!(bot.actions[0].action_type, ActionType::Http);
    assert_eq!(bot.actions[0].timeout_ms, Some(5000));
    assert_eq!(bot.actions[0].retry, Some(RetryOverride::max_retries(1)));
    assert!(bot.actions[0].enabled);
    assert!(bot.actions[1].continue_on_error);
    let schedule = bot.schedule.as_ref().unwrap();
    assert_eq!(schedule.cron_expression.as_deref(), Some("*/5 * * * *"));
    assert_eq!(schedule.max_executions, Some(10));
    assert!(schedule.enabled);
    assert!(!bot.stop_on_error());
    assert_eq!(bot.settings.unwrap().variables["team"], json!("ops"));
}

#[test]
fn stop_on_error_defaults_to_true() {
    let bot = BotConfig::new("b", "bot");
    assert!(bot.stop_on_error());

    let bot = bot.with_settings(BotSettings::default());
    assert!(bot.stop_on_error());
}

#[test]
fn execution_plan_filters_disabled_and_sorts_by_order() {
    let bot = BotConfig::new("b", "bot")
        .with_action(ActionConfig::new("c", "delay", "third", 20))
        .with_action(ActionConfig::new("a", "delay", "first", -5))
        .with_action(ActionConfig::new("off", "delay", "disabled", 0).disabled())
        .with_action(ActionConfig::new("b", "delay", "second", 7));

    let ids: Vec<&str> = bot.execution_plan().iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
}

#[test]
fn execution_plan_keeps_declaration_order_for_ties() {
    let bot = BotConfig::new("b", "bot")
        .with_action(ActionConfig::new("x", "delay", "x", 1))
        .with_action(ActionConfig::new("y", "delay", "y", 1));

    let ids: Vec<&str> = bot.execution_plan().iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["x", "y"]);
}

#[test]
fn with_config_ignores_non_objects() {
    let action = ActionConfig::new("a", "http", "a", 0).with_config(json!("nope"));
    assert!(action.config.is_empty());
}

#[test]
fn retry_override_rejects_unknown_fields() {
    let result: Result<RetryOverride, _> = serde_json::from_value(json!({ "retries": 3 }));
    assert!(result.is_err());
}

#[test]
fn one_time_schedule_is_detected() {
    let schedule = ScheduleConfig::once(chrono::Utc::now());
    assert!(schedule.is_one_time());
    assert!(!ScheduleConfig::cron("* * * * *").is_one_time());
}
