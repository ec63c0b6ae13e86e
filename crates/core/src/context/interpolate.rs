// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Path resolution and `{{path}}` template expansion

use super::ExecutionContext;
use crate::value::{lookup, to_display_string};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

// Constant pattern, compile-time verified
#[allow(clippy::expect_used)]
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([^{}]+?)\s*\}\}").expect("constant regex pattern is valid")
});

impl ExecutionContext {
    /// Resolve a dotted path against the run state
    ///
    /// Reserved first segments: `env`, `secrets`, `previous`, `trigger`,
    /// `context` and `action`. Anything else names a variable.
    pub fn resolve_path(&self, path: &str) -> Option<Value> {
        let segments: Vec<&str> = path.trim().split('.').map(str::trim).collect();
        let (head, rest) = segments.split_first()?;

        match *head {
            "env" => {
                let (name, rest) = rest.split_first()?;
                let value = Value::String(self.env_var(name).ok()?);
                lookup(&value, rest).cloned()
            }
            "secrets" => {
                let (name, rest) = rest.split_first()?;
                let value = Value::String(self.get_secret(name)?);
                lookup(&value, rest).cloned()
            }
            "previous" => lookup(self.previous_output()?, rest).cloned(),
            "trigger" => lookup(&self.trigger_data, rest).cloned(),
            "context" => match rest {
                ["runId"] => Some(Value::String(self.run_id.clone())),
                ["botId"] => Some(Value::String(self.bot_id.clone())),
                ["contextId"] => Some(Value::String(self.context_id.clone())),
                ["startedAt"] => Some(Value::String(self.started_at.to_rfc3339())),
                ["currentAction"] => Some(Value::from(self.current_action_index)),
                ["totalActions"] => Some(Value::from(self.total_actions)),
                _ => None,
            },
            "action" => {
                let (id, rest) = rest.split_first()?;
                lookup(self.get_action_output(id)?, rest).cloned()
            }
            name => lookup(self.get_variable(name)?, rest).cloned(),
        }
    }

    /// Replace every `{{path}}`; unresolved placeholders stay as written
    pub fn interpolate(&self, template: &str) -> String {
        if !template.contains("{{") {
            return template.to_string();
        }
        PLACEHOLDER
            .replace_all(template, |caps: &regex::Captures| {
                match self.resolve_path(&caps[1]) {
                    Some(value) => to_display_string(&value),
                    None => {
                        tracing::trace!(path = &caps[1], "unresolved placeholder");
                        caps[0].to_string()
                    }
                }
            })
            .into_owned()
    }

    /// Interpolate every string nested inside a value
    pub fn interpolate_value(&self, value: &Value) -> Value {
        match value {
            Value::String(s) => Value::String(self.interpolate(s)),
            Value::Array(items) => {
                Value::Array(items.iter().map(|v| self.interpolate_value(v)).collect())
            }
            Value::Object(map) => Value::Object(self.interpolate_map(map)),
            other => other.clone(),
        }
    }

    pub fn interpolate_map(&self, map: &Map<String, Value>) -> Map<String, Value> {
        map.iter()
            .map(|(k, v)| (k.clone(), self.interpolate_value(v)))
            .collect()
    }
}
