// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-run variable store and `{{path}}` interpolation
//!
//! One `ExecutionContext` lives for exactly one run. The executor writes
//! each completed action's output into it; later actions read those outputs
//! back through interpolated config strings and condition expressions.

mod condition;
mod interpolate;
mod secrets;

pub use secrets::{EnvSecretSource, MapSecretSource, SecretSource};

use crate::clock::{Clock, SharedClock};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock};
use thiserror::Error;

/// Marker shown in place of any sensitive value
pub const REDACTED: &str = "[REDACTED]";

// Constant pattern, compile-time verified
#[allow(clippy::expect_used)]
static SENSITIVE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)password|secret|token|api[_-]?key|credential|auth|private[_-]?key")
        .expect("constant regex pattern is valid")
});

/// Whether a variable name looks like it holds a credential
pub fn is_sensitive_name(name: &str) -> bool {
    SENSITIVE_NAME.is_match(name)
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContextError {
    #[error("secret '{0}' is not configured")]
    MissingSecret(String),
    #[error("environment access is disabled (requested '{0}')")]
    EnvDisabled(String),
    #[error("environment variable '{0}' is not set")]
    MissingEnv(String),
}

/// Where a variable's value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableSource {
    Bot,
    Trigger,
    Runtime,
    Secret,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub value: Value,
    pub sensitive: bool,
    pub source: VariableSource,
    pub set_at: DateTime<Utc>,
}

/// Construction parameters for [`ExecutionContext`]
#[derive(Clone)]
pub struct ContextOptions {
    pub context_id: String,
    pub run_id: String,
    pub bot_id: String,
    pub trigger_data: Value,
    /// Defaults to the clock's reading when the context is built
    pub started_at: Option<DateTime<Utc>>,
    pub variables: Map<String, Value>,
    pub allow_env: bool,
    pub secret_source: Option<Arc<dyn SecretSource>>,
    pub clock: SharedClock,
}

impl ContextOptions {
    pub fn new(
        context_id: impl Into<String>,
        run_id: impl Into<String>,
        bot_id: impl Into<String>,
    ) -> Self {
        Self {
            context_id: context_id.into(),
            run_id: run_id.into(),
            bot_id: bot_id.into(),
            trigger_data: Value::Null,
            started_at: None,
            variables: Map::new(),
            allow_env: false,
            secret_source: None,
            clock: SharedClock::default(),
        }
    }

    pub fn trigger_data(mut self, data: Value) -> Self {
        self.trigger_data = data;
        self
    }

    pub fn started_at(mut self, started_at: DateTime<Utc>) -> Self {
        self.started_at = Some(started_at);
        self
    }

    pub fn variables(mut self, variables: Map<String, Value>) -> Self {
        self.variables = variables;
        self
    }

    pub fn allow_env(mut self, allow: bool) -> Self {
        self.allow_env = allow;
        self
    }

    pub fn secret_source(mut self, source: Arc<dyn SecretSource>) -> Self {
        self.secret_source = Some(source);
        self
    }

    /// Time source for `started_at` and variable timestamps
    pub fn clock(mut self, clock: impl Clock) -> Self {
        self.clock = SharedClock::new(clock);
        self
    }
}

/// Plain, serializable view of a context with sensitive values masked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextSnapshot {
    pub context_id: String,
    pub run_id: String,
    pub bot_id: String,
    pub variables: Map<String, Value>,
    pub action_outputs: Map<String, Value>,
    pub trigger_data: Value,
    pub started_at: DateTime<Utc>,
    pub current_action_index: usize,
    pub total_actions: usize,
}

pub struct ExecutionContext {
    context_id: String,
    run_id: String,
    bot_id: String,
    trigger_data: Value,
    started_at: DateTime<Utc>,
    allow_env: bool,
    variables: HashMap<String, Variable>,
    secrets: HashMap<String, String>,
    secret_source: Option<Arc<dyn SecretSource>>,
    outputs: HashMap<String, Value>,
    /// Insertion order of `outputs`; the last entry is `previous`
    output_order: Vec<String>,
    current_action_index: usize,
    total_actions: usize,
    clock: SharedClock,
}

impl ExecutionContext {
    pub fn new(options: ContextOptions) -> Self {
        let mut ctx = Self {
            context_id: options.context_id,
            run_id: options.run_id,
            bot_id: options.bot_id,
            trigger_data: options.trigger_data,
            started_at: options
                .started_at
                .unwrap_or_else(|| options.clock.now()),
            allow_env: options.allow_env,
            variables: HashMap::new(),
            secrets: HashMap::new(),
            secret_source: options.secret_source,
            outputs: HashMap::new(),
            output_order: Vec::new(),
            current_action_index: 0,
            total_actions: 0,
            clock: options.clock,
        };
        for (name, value) in options.variables {
            ctx.set_variable_with(&name, value, None, VariableSource::Bot);
        }
        ctx
    }

    pub fn context_id(&self) -> &str {
        &self.context_id
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn bot_id(&self) -> &str {
        &self.bot_id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Current time from the context's clock
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn trigger_data(&self) -> &Value {
        &self.trigger_data
    }

    pub fn allows_env(&self) -> bool {
        self.allow_env
    }

    // -- variables --

    /// Set a runtime variable, inferring sensitivity from its name
    pub fn set_variable(&mut self, name: &str, value: Value) {
        self.set_variable_with(name, value, None, VariableSource::Runtime);
    }

    /// Set a variable with an explicit sensitivity override
    pub fn set_variable_with(
        &mut self,
        name: &str,
        value: Value,
        sensitive: Option<bool>,
        source: VariableSource,
    ) {
        let sensitive = sensitive.unwrap_or_else(|| is_sensitive_name(name));
        self.variables.insert(
            name.to_string(),
            Variable {
                value,
                sensitive,
                source,
                set_at: self.clock.now(),
            },
        );
    }

    pub fn get_variable(&self, name: &str) -> Option<&Value> {
        self.variables.get(name).map(|v| &v.value)
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }

    pub fn has_variable(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    // -- secrets --

    /// Store a secret; the same-named variable only ever shows [`REDACTED`]
    pub fn set_secret(&mut self, name: &str, value: impl Into<String>) {
        self.secrets.insert(name.to_string(), value.into());
        self.set_variable_with(
            name,
            Value::String(REDACTED.to_string()),
            Some(true),
            VariableSource::Secret,
        );
    }

    /// Real secret value, from the side map first and then the source
    pub fn get_secret(&self, name: &str) -> Option<String> {
        self.secrets
            .get(name)
            .cloned()
            .or_else(|| self.secret_source.as_ref()?.get(name))
    }

    pub fn require_secret(&self, name: &str) -> Result<String, ContextError> {
        self.get_secret(name)
            .ok_or_else(|| ContextError::MissingSecret(name.to_string()))
    }

    /// Environment lookup, gated by `allow_env`
    pub fn env_var(&self, name: &str) -> Result<String, ContextError> {
        if !self.allow_env {
            return Err(ContextError::EnvDisabled(name.to_string()));
        }
        std::env::var(name).map_err(|_| ContextError::MissingEnv(name.to_string()))
    }

    // -- action outputs --

    pub fn set_action_output(&mut self, action_id: &str, output: Value) {
        if self.outputs.insert(action_id.to_string(), output).is_none() {
            self.output_order.push(action_id.to_string());
        }
    }

    pub fn get_action_output(&self, action_id: &str) -> Option<&Value> {
        self.outputs.get(action_id)
    }

    /// Output of the most recently inserted action id
    pub fn previous_output(&self) -> Option<&Value> {
        self.output_order.last().and_then(|id| self.outputs.get(id))
    }

    /// Outputs in insertion order
    pub fn action_outputs(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.output_order
            .iter()
            .filter_map(|id| self.outputs.get(id).map(|v| (id.as_str(), v)))
    }

    // -- progress --

    pub fn set_current_action_index(&mut self, index: usize) {
        self.current_action_index = index;
    }

    pub fn current_action_index(&self) -> usize {
        self.current_action_index
    }

    pub fn set_total_actions(&mut self, total: usize) {
        self.total_actions = total;
    }

    pub fn total_actions(&self) -> usize {
        self.total_actions
    }

    // -- snapshots and branching --

    pub fn snapshot(&self) -> ContextSnapshot {
        let variables = self
            .variables
            .iter()
            .map(|(name, var)| {
                let value = if var.sensitive {
                    Value::String(REDACTED.to_string())
                } else {
                    var.value.clone()
                };
                (name.clone(), value)
            })
            .collect();
        let action_outputs = self
            .action_outputs()
            .map(|(id, v)| (id.to_string(), v.clone()))
            .collect();

        ContextSnapshot {
            context_id: self.context_id.clone(),
            run_id: self.run_id.clone(),
            bot_id: self.bot_id.clone(),
            variables,
            action_outputs,
            trigger_data: self.trigger_data.clone(),
            started_at: self.started_at,
            current_action_index: self.current_action_index,
            total_actions: self.total_actions,
        }
    }

    /// Independent copy under a new context id, for parallel branches
    pub fn fork(&self, context_id: impl Into<String>) -> Self {
        Self {
            context_id: context_id.into(),
            run_id: self.run_id.clone(),
            bot_id: self.bot_id.clone(),
            trigger_data: self.trigger_data.clone(),
            started_at: self.started_at,
            allow_env: self.allow_env,
            variables: self.variables.clone(),
            secrets: self.secrets.clone(),
            secret_source: self.secret_source.clone(),
            outputs: self.outputs.clone(),
            output_order: self.output_order.clone(),
            current_action_index: self.current_action_index,
            total_actions: self.total_actions,
            clock: self.clock.clone(),
        }
    }

    /// Fold another context's variables, secrets and outputs into this one
    ///
    /// Entries from `other` win on conflict.
    pub fn merge(&mut self, other: &ExecutionContext) {
        for (name, var) in &other.variables {
            self.variables.insert(name.clone(), var.clone());
        }
        for (name, secret) in &other.secrets {
            self.secrets.insert(name.clone(), secret.clone());
        }
        for (id, output) in other.action_outputs() {
            self.set_action_output(id, output.clone());
        }
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("context_id", &self.context_id)
            .field("run_id", &self.run_id)
            .field("bot_id", &self.bot_id)
            .field("variables", &self.variables.len())
            .field("outputs", &self.output_order)
            .field("current_action_index", &self.current_action_index)
            .finish_non_exhaustive()
    }
}
