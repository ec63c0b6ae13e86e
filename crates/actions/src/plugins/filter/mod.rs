// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Conditional flow control
//!
//! `onMatch: "continue"` (the default) lets the run proceed only when the
//! condition holds. `onMatch: "skip"` inverts that: a match skips every
//! remaining action.

mod condition;

pub use condition::{
    and, apply, contains, equals, exists, greater_than, is_in, less_than, matches, not_equals,
    not_exists, or, FilterCondition, Group, Logic, Operator, Rule,
};

use crate::action::{Action, ActionInput, ActionOutput};
use crate::config::ConfigExt;
use crate::error::ActionError;
use crate::schema::{ConfigSchema, FieldSpec, FieldType, ValidationResult};
use async_trait::async_trait;
use botwork_core::ActionType;
use serde_json::{json, Map, Value};

const ON_MATCH: &[&str] = &["continue", "skip"];

pub struct FilterAction {
    schema: ConfigSchema,
}

impl Default for FilterAction {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterAction {
    pub fn new() -> Self {
        let schema = ConfigSchema::new()
            .field(
                FieldSpec::required("condition", FieldType::Object)
                    .describe("A rule or an and/or group of rules"),
            )
            .field(FieldSpec::optional("onMatch", FieldType::String).one_of(ON_MATCH));
        Self { schema }
    }
}

fn parse_condition(config: &Map<String, Value>) -> Result<FilterCondition, ActionError> {
    let raw = config
        .get("condition")
        .ok_or_else(|| ActionError::config("Missing required field: condition"))?;
    FilterCondition::from_value(raw).map_err(ActionError::Config)
}

#[async_trait]
impl Action for FilterAction {
    fn action_type(&self) -> ActionType {
        ActionType::Filter
    }

    fn name(&self) -> &str {
        "Filter"
    }

    fn description(&self) -> &str {
        "Continue or stop the run based on a condition"
    }

    fn schema(&self) -> &ConfigSchema {
        &self.schema
    }

    fn validate(&self, config: &Map<String, Value>) -> ValidationResult {
        let mut result = self.schema.validate(config);
        if let Some(raw) = config.get("condition").filter(|v| v.is_object()) {
            match FilterCondition::from_value(raw) {
                Ok(condition) => {
                    for problem in condition.problems() {
                        result.error(problem);
                    }
                }
                Err(e) => result.error(e),
            }
        }
        result
    }

    async fn execute(&self, input: ActionInput<'_>) -> Result<ActionOutput, ActionError> {
        let condition = parse_condition(input.config)?;
        let on_match = input.config.str_or("onMatch", "continue");
        if !ON_MATCH.contains(&on_match) {
            return Err(ActionError::config(format!(
                "Field 'onMatch' must be one of: {}",
                ON_MATCH.join(", ")
            )));
        }

        let passed = condition.evaluate(input.context);
        let proceed = match on_match {
            "skip" => !passed,
            _ => passed,
        };
        tracing::debug!(passed, on_match, proceed, "filter evaluated");

        let output = ActionOutput::data(json!({
            "passed": passed,
            "action": if proceed { "continue" } else { "skip" },
        }));
        if proceed {
            Ok(output)
        } else {
            let reason = format!("Filtered by {}", input.action.id);
            Ok(output.skip_remaining(reason))
        }
    }
}

#[cfg(test)]
mod tests;
