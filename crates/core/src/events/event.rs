// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lifecycle events emitted while a bot runs

use crate::bot::{ActionType, TriggerType};
use crate::result::{ErrorInfo, ExecutionStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ExecutionEvent {
    ExecutionStarted {
        run_id: String,
        bot_id: String,
        bot_name: String,
        trigger_type: TriggerType,
        timestamp: DateTime<Utc>,
    },
    ActionStarted {
        run_id: String,
        bot_id: String,
        action_id: String,
        action_type: ActionType,
        action_name: String,
        /// 1-based attempt number
        attempt: u32,
        timestamp: DateTime<Utc>,
    },
    ActionCompleted {
        run_id: String,
        bot_id: String,
        action_id: String,
        action_type: ActionType,
        duration_ms: u64,
        retry_count: u32,
        timestamp: DateTime<Utc>,
    },
    ActionFailed {
        run_id: String,
        bot_id: String,
        action_id: String,
        action_type: ActionType,
        attempt: u32,
        error: ErrorInfo,
        will_retry: bool,
        timestamp: DateTime<Utc>,
    },
    ActionSkipped {
        run_id: String,
        bot_id: String,
        action_id: String,
        reason: String,
        timestamp: DateTime<Utc>,
    },
    ExecutionCompleted {
        run_id: String,
        bot_id: String,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },
    ExecutionFailed {
        run_id: String,
        bot_id: String,
        status: ExecutionStatus,
        error: ErrorInfo,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },
}

impl ExecutionEvent {
    /// `category:action` name used for pattern subscriptions
    pub fn name(&self) -> &'static str {
        match self {
            ExecutionEvent::ExecutionStarted { .. } => "execution:started",
            ExecutionEvent::ActionStarted { .. } => "action:started",
            ExecutionEvent::ActionCompleted { .. } => "action:completed",
            ExecutionEvent::ActionFailed { .. } => "action:failed",
            ExecutionEvent::ActionSkipped { .. } => "action:skipped",
            ExecutionEvent::ExecutionCompleted { .. } => "execution:completed",
            ExecutionEvent::ExecutionFailed { .. } => "execution:failed",
        }
    }

    pub fn run_id(&self) -> &str {
        match self {
            ExecutionEvent::ExecutionStarted { run_id, .. }
            | ExecutionEvent::ActionStarted { run_id, .. }
            | ExecutionEvent::ActionCompleted { run_id, .. }
            | ExecutionEvent::ActionFailed { run_id, .. }
            | ExecutionEvent::ActionSkipped { run_id, .. }
            | ExecutionEvent::ExecutionCompleted { run_id, .. }
            | ExecutionEvent::ExecutionFailed { run_id, .. } => run_id,
        }
    }

    pub fn action_id(&self) -> Option<&str> {
        match self {
            ExecutionEvent::ActionStarted { action_id, .. }
            | ExecutionEvent::ActionCompleted { action_id, .. }
            | ExecutionEvent::ActionFailed { action_id, .. }
            | ExecutionEvent::ActionSkipped { action_id, .. } => Some(action_id),
            _ => None,
        }
    }
}
