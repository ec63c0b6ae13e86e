// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Abortable pause between actions

use crate::action::{Action, ActionInput, ActionOutput};
use crate::config::ConfigExt;
use crate::error::ActionError;
use crate::schema::{ConfigSchema, FieldSpec, FieldType};
use async_trait::async_trait;
use botwork_core::ActionType;
use rand::Rng;
use serde_json::json;
use std::time::Duration;

/// Cap applied when the action sets no `maxDuration`
pub const DEFAULT_MAX_DELAY_MS: u64 = 5 * 60 * 1000;
/// Hard ceiling no configuration can exceed
pub const HARD_MAX_DELAY_MS: u64 = 60 * 60 * 1000;

const UNITS: &[&str] = &["ms", "s", "min", "hr"];

pub struct DelayAction {
    schema: ConfigSchema,
}

impl Default for DelayAction {
    fn default() -> Self {
        Self::new()
    }
}

impl DelayAction {
    pub fn new() -> Self {
        let schema = ConfigSchema::new()
            .field(FieldSpec::required("duration", FieldType::Number).min(0.0))
            .field(FieldSpec::optional("unit", FieldType::String).one_of(UNITS))
            .field(
                FieldSpec::optional("maxDuration", FieldType::Number)
                    .min(0.0)
                    .describe("Upper bound in milliseconds"),
            )
            .field(
                FieldSpec::optional("jitter", FieldType::Number)
                    .min(0.0)
                    .max(100.0)
                    .describe("Random spread as a percentage of the delay"),
            );
        Self { schema }
    }
}

pub fn unit_factor(unit: &str) -> Option<u64> {
    match unit {
        "ms" => Some(1),
        "s" => Some(1000),
        "min" => Some(60 * 1000),
        "hr" => Some(60 * 60 * 1000),
        _ => None,
    }
}

/// Effective cap for a configured `maxDuration`
pub fn ceiling(max_duration: Option<u64>) -> u64 {
    max_duration
        .unwrap_or(DEFAULT_MAX_DELAY_MS)
        .min(HARD_MAX_DELAY_MS)
}

/// Spread `ms` uniformly by up to `percent` in either direction
pub fn apply_jitter(ms: u64, percent: f64, rng: &mut impl Rng) -> u64 {
    if percent <= 0.0 || ms == 0 {
        return ms;
    }
    let spread = ms as f64 * percent.min(100.0) / 100.0;
    let offset = rng.gen_range(-spread..=spread);
    (ms as f64 + offset).max(0.0).round() as u64
}

#[async_trait]
impl Action for DelayAction {
    fn action_type(&self) -> ActionType {
        ActionType::Delay
    }

    fn name(&self) -> &str {
        "Delay"
    }

    fn description(&self) -> &str {
        "Wait before running the next action"
    }

    fn schema(&self) -> &ConfigSchema {
        &self.schema
    }

    async fn execute(&self, input: ActionInput<'_>) -> Result<ActionOutput, ActionError> {
        let config = input.config;
        let duration = config
            .f64("duration")
            .filter(|d| d.is_finite() && *d >= 0.0)
            .ok_or_else(|| ActionError::config("Field 'duration' must be a non-negative number"))?;
        let unit = config.str_or("unit", "ms");
        let factor =
            unit_factor(unit).ok_or_else(|| ActionError::config(format!("Unknown unit: {}", unit)))?;

        let requested_ms = (duration * factor as f64).round() as u64;
        let cap = ceiling(config.u64("maxDuration"));
        let clamped = requested_ms > cap;
        let base_ms = requested_ms.min(cap);
        let delay_ms = match config.f64("jitter") {
            Some(percent) => apply_jitter(base_ms, percent, &mut rand::thread_rng()),
            None => base_ms,
        }
        .min(HARD_MAX_DELAY_MS);

        if clamped {
            tracing::warn!(requested_ms, cap_ms = cap, "delay clamped");
        }
        tracing::debug!(delay_ms, "sleeping");

        tokio::select! {
            biased;
            _ = input.cancel.cancelled() => return Err(ActionError::Aborted),
            _ = tokio::time::sleep(Duration::from_millis(delay_ms)) => {}
        }

        Ok(ActionOutput::data(json!({
            "delayedMs": delay_ms,
            "requestedMs": requested_ms,
            "clamped": clamped,
        })))
    }

    fn default_timeout(&self) -> Duration {
        Duration::from_millis(HARD_MAX_DELAY_MS) + Duration::from_secs(60)
    }
}

#[cfg(test)]
#[path = "delay_tests.rs"]
mod tests;
