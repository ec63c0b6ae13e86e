// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Slack incoming-webhook messages

use crate::action::{Action, ActionInput, ActionOutput};
use crate::config::ConfigExt;
use crate::error::ActionError;
use crate::http::{send_with_cancel, HttpClient, HttpRequest};
use crate::schema::{ConfigSchema, FieldSpec, FieldType, ValidationResult};
use async_trait::async_trait;
use botwork_core::ActionType;
use serde_json::{json, Map, Value};

const PASSTHROUGH: &[&str] = &[
    "text",
    "blocks",
    "attachments",
    "channel",
    "username",
    "icon_emoji",
    "icon_url",
    "thread_ts",
    "unfurl_links",
    "mrkdwn",
];

pub struct SlackAction<C> {
    client: C,
    schema: ConfigSchema,
}

impl<C: HttpClient> SlackAction<C> {
    pub fn new(client: C) -> Self {
        let schema = ConfigSchema::new()
            .field(
                FieldSpec::required("webhookUrl", FieldType::String)
                    .pattern(r"^https://hooks\.slack\.com/services/")
                    .sensitive(),
            )
            .field(FieldSpec::optional("text", FieldType::String))
            .field(FieldSpec::optional("blocks", FieldType::Array))
            .field(FieldSpec::optional("attachments", FieldType::Array))
            .field(FieldSpec::optional("channel", FieldType::String))
            .field(FieldSpec::optional("username", FieldType::String))
            .field(FieldSpec::optional("icon_emoji", FieldType::String))
            .field(FieldSpec::optional("icon_url", FieldType::String))
            .field(FieldSpec::optional("thread_ts", FieldType::String))
            .field(FieldSpec::optional("unfurl_links", FieldType::Boolean))
            .field(FieldSpec::optional("mrkdwn", FieldType::Boolean));
        Self { client, schema }
    }
}

fn has_content(config: &Map<String, Value>) -> bool {
    config.str("text").is_some()
        || config.array("blocks").is_some_and(|b| !b.is_empty())
        || config.array("attachments").is_some_and(|a| !a.is_empty())
}

#[async_trait]
impl<C: HttpClient> Action for SlackAction<C> {
    fn action_type(&self) -> ActionType {
        ActionType::Slack
    }

    fn name(&self) -> &str {
        "Slack Message"
    }

    fn description(&self) -> &str {
        "Post a message to Slack through an incoming webhook"
    }

    fn schema(&self) -> &ConfigSchema {
        &self.schema
    }

    fn validate(&self, config: &Map<String, Value>) -> ValidationResult {
        let mut result = self.schema.validate(config);
        if !has_content(config) {
            result.error("One of text, blocks or attachments is required");
        }
        result
    }

    async fn execute(&self, input: ActionInput<'_>) -> Result<ActionOutput, ActionError> {
        let config = input.config;
        let url = config.require_str("webhookUrl")?;
        if !has_content(config) {
            return Err(ActionError::config(
                "One of text, blocks or attachments is required",
            ));
        }

        let message: Map<String, Value> = PASSTHROUGH
            .iter()
            .filter_map(|k| {
                config
                    .get(*k)
                    .filter(|v| !v.is_null())
                    .map(|v| (k.to_string(), v.clone()))
            })
            .collect();
        let message = Value::Object(message);

        let request = HttpRequest::post(url).json(&message);
        let response = send_with_cancel(&self.client, request, &input.cancel).await?;

        if !response.is_success() {
            return Err(ActionError::http(
                response.status,
                format!("Slack API error {}: {}", response.status, response.snippet()),
            ));
        }

        // Slack answers 200 with a plain "ok", or JSON carrying ok:false
        match response.json_body() {
            Some(Value::Object(body)) => {
                if body.get("ok") == Some(&Value::Bool(false)) {
                    let reason = body.str_or("error", "unknown_error");
                    return Err(ActionError::Rejected(format!(
                        "Slack rejected message: {}",
                        reason
                    )));
                }
            }
            _ => {
                let text = response.text();
                if text.trim() != "ok" {
                    return Err(ActionError::Rejected(format!(
                        "Slack rejected message: {}",
                        response.snippet()
                    )));
                }
            }
        }

        Ok(ActionOutput::data(json!({
            "ok": true,
            "status": response.status,
            "message": message,
        })))
    }
}

#[cfg(test)]
#[path = "slack_tests.rs"]
mod tests;
