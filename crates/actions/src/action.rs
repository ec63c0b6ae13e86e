// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The plugin contract every action type implements

use crate::error::ActionError;
use crate::schema::{ConfigSchema, ValidationResult};
use async_trait::async_trait;
use botwork_core::{ActionConfig, ActionType, ExecutionContext};
use serde_json::{Map, Value};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Timeout applied when neither the action nor the engine config sets one
pub const DEFAULT_ACTION_TIMEOUT: Duration = Duration::from_secs(30);

/// Everything a plugin sees for one attempt
pub struct ActionInput<'a> {
    /// The action as authored, before interpolation
    pub action: &'a ActionConfig,
    /// `action.config` with every `{{path}}` resolved against the context
    pub config: &'a Map<String, Value>,
    pub context: &'a ExecutionContext,
    /// Fires on run cancellation or the overall execution deadline
    pub cancel: CancellationToken,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionOutput {
    pub data: Option<Value>,
    pub metadata: Option<Value>,
    /// Ask the executor to skip every remaining action, with a reason
    pub skip_remaining: Option<String>,
}

impl ActionOutput {
    pub fn data(data: Value) -> Self {
        Self {
            data: Some(data),
            ..Self::default()
        }
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn skip_remaining(mut self, reason: impl Into<String>) -> Self {
        self.skip_remaining = Some(reason.into());
        self
    }
}

#[async_trait]
pub trait Action: Send + Sync {
    fn action_type(&self) -> ActionType;

    /// Human-readable plugin name
    fn name(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    fn schema(&self) -> &ConfigSchema;

    fn validate(&self, config: &Map<String, Value>) -> ValidationResult {
        self.schema().validate(config)
    }

    /// Perform the side effect
    ///
    /// Anything that can block must also watch `input.cancel`.
    async fn execute(&self, input: ActionInput<'_>) -> Result<ActionOutput, ActionError>;

    fn is_retryable(&self, error: &ActionError) -> bool {
        error.is_transient()
    }

    fn default_timeout(&self) -> Duration {
        DEFAULT_ACTION_TIMEOUT
    }
}
