// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn action_failure_carries_the_action_code() {
    let error = EngineError::ActionFailed {
        action_id: "notify".to_string(),
        error: ErrorInfo::new("HTTP_503", "HTTP 503: down", true),
    };
    let info = error.to_info();
    assert_eq!(info.code, "HTTP_503");
    assert!(info.retryable);
    assert_eq!(info.message, "Action notify failed: HTTP 503: down");
}

#[test]
fn timeout_message_names_the_deadline() {
    let info = EngineError::Timeout(Duration::from_millis(1500)).to_info();
    assert_eq!(info.code, "EXECUTION_TIMEOUT");
    assert_eq!(info.message, "Execution timed out after 1500ms");
    assert!(!info.retryable);
}

#[test]
fn unknown_type_message_is_stable() {
    let error = EngineError::UnknownActionType(ActionType::from("sms"));
    assert_eq!(
        error.to_string(),
        "No handler registered for action type: sms"
    );
    assert!(!error.is_retryable());
}

#[test]
fn capacity_is_worth_retrying() {
    assert!(EngineError::AtCapacity { limit: 2 }.is_retryable());
}
