// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the executor and scheduler

use botwork_core::{ActionType, CronError, ErrorInfo};
use std::time::Duration;
use thiserror::Error;

/// Run-level failures
///
/// Action failures never escape `execute`; they end up here only when they
/// stop the run, and are then folded into `ExecutionResult.error`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    #[error("executor is at capacity ({limit} concurrent runs)")]
    AtCapacity { limit: usize },
    #[error("run {0} is already active")]
    DuplicateRun(String),
    #[error("No handler registered for action type: {0}")]
    UnknownActionType(ActionType),
    #[error("Action {action_id} failed: {error}")]
    ActionFailed { action_id: String, error: ErrorInfo },
    #[error("Execution timed out after {}ms", .0.as_millis())]
    Timeout(Duration),
    #[error("Execution was cancelled")]
    Cancelled,
}

impl EngineError {
    pub fn code(&self) -> &str {
        match self {
            EngineError::AtCapacity { .. } => "AT_CAPACITY",
            EngineError::DuplicateRun(_) => "DUPLICATE_RUN",
            EngineError::UnknownActionType(_) => "UNKNOWN_ACTION_TYPE",
            EngineError::ActionFailed { error, .. } => &error.code,
            EngineError::Timeout(_) => "EXECUTION_TIMEOUT",
            EngineError::Cancelled => "EXECUTION_CANCELLED",
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            EngineError::AtCapacity { .. } => true,
            EngineError::ActionFailed { error, .. } => error.retryable,
            _ => false,
        }
    }

    pub fn to_info(&self) -> ErrorInfo {
        ErrorInfo::new(self.code(), self.to_string(), self.is_retryable())
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SchedulerError {
    #[error("bot {0} has no schedule")]
    NoSchedule(String),
    #[error("bot {0} needs either a cron expression or a run time")]
    EmptySchedule(String),
    #[error("invalid schedule for bot {bot_id}: {source}")]
    InvalidCron {
        bot_id: String,
        #[source]
        source: CronError,
    },
    #[error("no job registered for bot {0}")]
    UnknownBot(String),
    #[error("scheduler is already running")]
    AlreadyRunning,
    #[error(transparent)]
    Engine(#[from] EngineError),
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
