// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::plugins::test_support::run;
use botwork_core::{ContextOptions, ExecutionContext};
use serde_json::json;

fn ctx() -> ExecutionContext {
    let mut ctx = ExecutionContext::new(
        ContextOptions::new("c", "r", "b").trigger_data(json!({"env": "prod", "count": 3})),
    );
    ctx.set_action_output("fetch", json!({"status": 200, "body": {"items": [1, 2]}}));
    ctx
}

#[tokio::test]
async fn passing_condition_continues() {
    let output = run(
        &FilterAction::new(),
        &ctx(),
        json!({"condition": {"field": "trigger.env", "operator": "eq", "value": "prod"}}),
    )
    .await
    .unwrap();

    assert_eq!(output.data.unwrap(), json!({"passed": true, "action": "continue"}));
    assert!(output.skip_remaining.is_none());
}

#[tokio::test]
async fn failing_condition_skips_remaining() {
    let output = run(
        &FilterAction::new(),
        &ctx(),
        json!({"condition": {"field": "previous.status", "operator": "neq", "value": 200}}),
    )
    .await
    .unwrap();

    assert_eq!(output.data.unwrap(), json!({"passed": false, "action": "skip"}));
    assert_eq!(output.skip_remaining.as_deref(), Some("Filtered by act-1"));
}

#[tokio::test]
async fn on_match_skip_inverts_the_decision() {
    let output = run(
        &FilterAction::new(),
        &ctx(),
        json!({
            "condition": {"field": "action.fetch.body.items", "operator": "not_empty"},
            "onMatch": "skip"
        }),
    )
    .await
    .unwrap();
    assert_eq!(output.data.unwrap()["passed"], true);
    assert!(output.skip_remaining.is_some());
}

#[tokio::test]
async fn interpolated_values_are_compared() {
    let mut ctx = ctx();
    ctx.set_variable("threshold", json!(2));
    let output = run(
        &FilterAction::new(),
        &ctx,
        json!({"condition": {"field": "trigger.count", "operator": "gt", "value": "{{threshold}}"}}),
    )
    .await
    .unwrap();
    assert_eq!(output.data.unwrap()["passed"], true);
}

#[tokio::test]
async fn malformed_condition_is_a_config_error() {
    let err = run(
        &FilterAction::new(),
        &ctx(),
        json!({"condition": {"field": "x", "operator": "resembles"}}),
    )
    .await
    .unwrap_err();
    assert_eq!(err.code(), "CONFIG_ERROR");
}

#[test]
fn validate_reports_condition_problems() {
    let action = FilterAction::new();
    let config = json!({"condition": {"logic": "and", "conditions": []}, "onMatch": "halt"});
    let result = action.validate(config.as_object().unwrap());
    assert_eq!(
        result.errors,
        vec![
            "Field 'onMatch' must be one of: continue, skip",
            "condition: group has no conditions",
        ]
    );

    let config = json!({"condition": {"field": "x", "operator": "exists"}});
    assert!(action.validate(config.as_object().unwrap()).valid);
}
