// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Classified action failures
//!
//! Every plugin failure is one of a small set of kinds so that retry
//! policy can be decided without parsing messages where possible.

use botwork_core::{ActionType, ErrorInfo};
use thiserror::Error;

/// OS-level error codes that indicate a transient network problem
pub const TRANSIENT_CODES: [&str; 7] = [
    "ETIMEDOUT",
    "ECONNRESET",
    "ECONNREFUSED",
    "ENOTFOUND",
    "EAI_AGAIN",
    "EPIPE",
    "EHOSTUNREACH",
];

/// HTTP statuses worth retrying
pub const RETRYABLE_STATUSES: [u16; 6] = [408, 429, 500, 502, 503, 504];

/// Message fragments that mark an otherwise unclassified error as transient
pub const TRANSIENT_MESSAGES: [&str; 6] = [
    "timeout",
    "timed out",
    "rate limit",
    "too many requests",
    "temporary",
    "unavailable",
];

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ActionError {
    /// Bad or missing configuration; detected before any side effect
    #[error("{0}")]
    Config(String),
    /// Remote answered with a non-success status
    #[error("{message}")]
    Http { status: u16, message: String },
    /// Connection-level failure
    #[error("{message}")]
    Transport {
        code: Option<String>,
        message: String,
    },
    #[error("Action timed out after {ms}ms")]
    Timeout { ms: u64 },
    #[error("Action was aborted")]
    Aborted,
    /// Remote accepted the request but refused it at the API level
    #[error("{0}")]
    Rejected(String),
    #[error("{0}")]
    Failed(String),
}

impl ActionError {
    pub fn config(message: impl Into<String>) -> Self {
        ActionError::Config(message.into())
    }

    pub fn failed(message: impl Into<String>) -> Self {
        ActionError::Failed(message.into())
    }

    pub fn http(status: u16, message: impl Into<String>) -> Self {
        ActionError::Http {
            status,
            message: message.into(),
        }
    }

    pub fn transport(code: &str, message: impl Into<String>) -> Self {
        ActionError::Transport {
            code: Some(code.to_string()),
            message: message.into(),
        }
    }

    /// Stable, machine-readable code
    pub fn code(&self) -> String {
        match self {
            ActionError::Config(_) => "CONFIG_ERROR".to_string(),
            ActionError::Http { status, .. } => format!("HTTP_{}", status),
            ActionError::Transport { code, .. } => {
                code.clone().unwrap_or_else(|| "NETWORK_ERROR".to_string())
            }
            ActionError::Timeout { .. } => "TIMEOUT".to_string(),
            ActionError::Aborted => "ABORTED".to_string(),
            ActionError::Rejected(_) => "REJECTED".to_string(),
            ActionError::Failed(_) => "ACTION_FAILED".to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ActionError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The default retry classification shared by all plugins
    ///
    /// Timeouts are always transient; aborts and config errors never are.
    pub fn is_transient(&self) -> bool {
        match self {
            ActionError::Timeout { .. } => true,
            ActionError::Aborted | ActionError::Config(_) | ActionError::Rejected(_) => false,
            ActionError::Http { status, message } => {
                RETRYABLE_STATUSES.contains(status) || has_transient_message(message)
            }
            ActionError::Transport { code, message } => {
                code.as_deref().is_some_and(|c| TRANSIENT_CODES.contains(&c))
                    || has_transient_message(message)
            }
            ActionError::Failed(message) => has_transient_message(message),
        }
    }

    pub fn to_info(&self, retryable: bool) -> ErrorInfo {
        ErrorInfo::new(self.code(), self.to_string(), retryable)
    }
}

fn has_transient_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    TRANSIENT_MESSAGES.iter().any(|m| lower.contains(m))
}

impl From<botwork_core::ContextError> for ActionError {
    fn from(e: botwork_core::ContextError) -> Self {
        ActionError::Config(e.to_string())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("action type '{0}' is already registered")]
    AlreadyRegistered(ActionType),
    #[error("No handler registered for action type: {0}")]
    NotRegistered(String),
    #[error("alias '{0}' conflicts with a registered action type")]
    AliasConflict(String),
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
