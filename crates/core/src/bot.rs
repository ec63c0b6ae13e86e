// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bot definitions as handed to the engine by the authoring surface
//!
//! A bot is a named, ordered chain of actions with an optional recurring
//! schedule. The engine only ever reads these structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Identifier of an action plugin
///
/// The built-in types are enumerated; anything else is carried as `Custom`
/// so third-party plugins can be registered without touching this enum.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActionType {
    Http,
    Webhook,
    Slack,
    Discord,
    Email,
    Delay,
    Filter,
    Transform,
    Custom(String),
}

impl ActionType {
    /// All built-in action types
    pub const BUILTIN: [ActionType; 8] = [
        ActionType::Http,
        ActionType::Webhook,
        ActionType::Slack,
        ActionType::Discord,
        ActionType::Email,
        ActionType::Delay,
        ActionType::Filter,
        ActionType::Transform,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            ActionType::Http => "http",
            ActionType::Webhook => "webhook",
            ActionType::Slack => "slack",
            ActionType::Discord => "discord",
            ActionType::Email => "email",
            ActionType::Delay => "delay",
            ActionType::Filter => "filter",
            ActionType::Transform => "transform",
            ActionType::Custom(name) => name,
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for ActionType {
    fn from(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "http" => ActionType::Http,
            "webhook" => ActionType::Webhook,
            "slack" => ActionType::Slack,
            "discord" => ActionType::Discord,
            "email" => ActionType::Email,
            "delay" => ActionType::Delay,
            "filter" => ActionType::Filter,
            "transform" => ActionType::Transform,
            _ => ActionType::Custom(s.to_string()),
        }
    }
}

impl From<String> for ActionType {
    fn from(s: String) -> Self {
        ActionType::from(s.as_str())
    }
}

impl From<ActionType> for String {
    fn from(t: ActionType) -> Self {
        t.as_str().to_string()
    }
}

/// What started a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerType {
    Manual,
    Schedule,
    Webhook,
}

impl fmt::Display for TriggerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerType::Manual => write!(f, "manual"),
            TriggerType::Schedule => write!(f, "schedule"),
            TriggerType::Webhook => write!(f, "webhook"),
        }
    }
}

/// Partial retry settings layered over the engine defaults
///
/// Precedence when merging: action > execution > bot > engine default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RetryOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_delay_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backoff_multiplier: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_delay_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jitter: Option<bool>,
}

impl RetryOverride {
    pub fn max_retries(max_retries: u32) -> Self {
        Self {
            max_retries: Some(max_retries),
            ..Self::default()
        }
    }
}

/// One configured unit of work within a bot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionConfig {
    pub id: String,
    #[serde(rename = "type")]
    pub action_type: ActionType,
    pub name: String,
    #[serde(default)]
    pub order: i64,
    /// Opaque map interpreted by the matching plugin
    #[serde(default)]
    pub config: Map<String, Value>,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default)]
    pub continue_on_error: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry: Option<RetryOverride>,
}

impl ActionConfig {
    pub fn new(
        id: impl Into<String>,
        action_type: impl Into<ActionType>,
        name: impl Into<String>,
        order: i64,
    ) -> Self {
        Self {
            id: id.into(),
            action_type: action_type.into(),
            name: name.into(),
            order,
            config: Map::new(),
            enabled: true,
            condition: None,
            continue_on_error: false,
            timeout_ms: None,
            retry: None,
        }
    }

    /// Replace the plugin config; non-object values leave it empty
    pub fn with_config(mut self, config: Value) -> Self {
        self.config = match config {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        self
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    pub fn with_retry(mut self, retry: RetryOverride) -> Self {
        self.retry = Some(retry);
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    pub fn continue_on_error(mut self) -> Self {
        self.continue_on_error = true;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// Recurrence settings for a bot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleConfig {
    #[serde(default, alias = "cron", skip_serializing_if = "Option::is_none")]
    pub cron_expression: Option<String>,
    /// One-time firing; takes precedence over the cron expression
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_at: Option<DateTime<Utc>>,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_executions: Option<u64>,
    #[serde(default)]
    pub priority: i32,
}

impl ScheduleConfig {
    pub fn cron(expression: impl Into<String>) -> Self {
        Self {
            cron_expression: Some(expression.into()),
            run_at: None,
            enabled: true,
            max_executions: None,
            priority: 0,
        }
    }

    pub fn once(run_at: DateTime<Utc>) -> Self {
        Self {
            cron_expression: None,
            run_at: Some(run_at),
            enabled: true,
            max_executions: None,
            priority: 0,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_max_executions(mut self, max: u64) -> Self {
        self.max_executions = Some(max);
        self
    }

    pub fn is_one_time(&self) -> bool {
        self.run_at.is_some()
    }
}

/// Bot-wide execution settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotSettings {
    #[serde(default = "default_true")]
    pub stop_on_error: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry: Option<RetryOverride>,
    #[serde(default)]
    pub variables: Map<String, Value>,
    /// Overall run deadline; overrides the engine default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            stop_on_error: true,
            retry: None,
            variables: Map::new(),
            timeout_ms: None,
        }
    }
}

/// A user-defined, named sequence of actions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotConfig {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub actions: Vec<ActionConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<ScheduleConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<BotSettings>,
}

impl BotConfig {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            actions: Vec::new(),
            schedule: None,
            settings: None,
        }
    }

    pub fn with_action(mut self, action: ActionConfig) -> Self {
        self.actions.push(action);
        self
    }

    pub fn with_schedule(mut self, schedule: ScheduleConfig) -> Self {
        self.schedule = Some(schedule);
        self
    }

    pub fn with_settings(mut self, settings: BotSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Whether a failed action aborts the rest of the run (defaults to true)
    pub fn stop_on_error(&self) -> bool {
        self.settings.as_ref().map_or(true, |s| s.stop_on_error)
    }

    /// Enabled actions sorted by `order`; ties keep declaration order
    pub fn execution_plan(&self) -> Vec<&ActionConfig> {
        let mut actions: Vec<&ActionConfig> = self.actions.iter().filter(|a| a.enabled).collect();
        actions.sort_by_key(|a| a.order);
        actions
    }
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
#[path = "bot_tests.rs"]
mod tests;
