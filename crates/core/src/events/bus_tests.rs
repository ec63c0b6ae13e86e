// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::Utc;

fn skipped(action_id: &str) -> ExecutionEvent {
    ExecutionEvent::ActionSkipped {
        run_id: "run-1".to_string(),
        bot_id: "bot-1".to_string(),
        action_id: action_id.to_string(),
        reason: "condition false".to_string(),
        timestamp: Utc::now(),
    }
}

fn completed() -> ExecutionEvent {
    ExecutionEvent::ExecutionCompleted {
        run_id: "run-1".to_string(),
        bot_id: "bot-1".to_string(),
        duration_ms: 12,
        timestamp: Utc::now(),
    }
}

#[test]
fn matching_listener_receives_event() {
    let bus = EventBus::new();
    let mut rx = bus.listen("action:*");

    bus.publish(skipped("notify"));

    assert_eq!(rx.try_recv().unwrap().action_id(), Some("notify"));
}

#[test]
fn other_categories_are_not_delivered() {
    let bus = EventBus::new();
    let mut rx = bus.listen("action:*");

    bus.publish(completed());

    assert!(rx.try_recv().is_err());
}

#[test]
fn wildcard_listener_receives_everything() {
    let bus = EventBus::new();
    let mut rx = bus.listen("*");

    bus.publish(skipped("a"));
    bus.publish(completed());

    assert_eq!(rx.try_recv().unwrap().name(), "action:skipped");
    assert_eq!(rx.try_recv().unwrap().name(), "execution:completed");
}

#[test]
fn clones_share_listeners() {
    let bus = EventBus::new();
    let publisher = bus.clone();
    let mut rx = bus.listen("execution:*");

    publisher.publish(completed());

    assert!(rx.try_recv().is_ok());
    assert_eq!(publisher.listener_count(), 1);
}

#[test]
fn dropped_listeners_are_pruned_on_publish() {
    let bus = EventBus::new();
    let rx = bus.listen("execution:*");
    let _kept = bus.listen("**");
    assert_eq!(bus.listener_count(), 2);

    drop(rx);
    bus.publish(skipped("a"));
    assert_eq!(bus.listener_count(), 1);
}
