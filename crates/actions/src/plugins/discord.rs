// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Discord webhook messages

use crate::action::{Action, ActionInput, ActionOutput};
use crate::config::ConfigExt;
use crate::error::ActionError;
use crate::http::{send_with_cancel, HttpClient, HttpRequest};
use crate::schema::{ConfigSchema, FieldSpec, FieldType, ValidationResult};
use async_trait::async_trait;
use botwork_core::value::to_display_string;
use botwork_core::ActionType;
use serde_json::{json, Map, Value};

/// Discord caps message content at this many characters
pub const MAX_CONTENT_LEN: usize = 2000;
pub const MAX_EMBEDS: usize = 10;

pub struct DiscordAction<C> {
    client: C,
    schema: ConfigSchema,
}

impl<C: HttpClient> DiscordAction<C> {
    pub fn new(client: C) -> Self {
        let schema = ConfigSchema::new()
            .field(
                FieldSpec::required("webhookUrl", FieldType::String)
                    .pattern(r"^https://(discord|discordapp)\.com/api/webhooks/")
                    .sensitive(),
            )
            .field(FieldSpec::optional("content", FieldType::String))
            .field(FieldSpec::optional("embeds", FieldType::Array))
            .field(FieldSpec::optional("username", FieldType::String))
            .field(FieldSpec::optional("avatarUrl", FieldType::String))
            .field(FieldSpec::optional("tts", FieldType::Boolean))
            .field(FieldSpec::optional("threadId", FieldType::String));
        Self { client, schema }
    }
}

fn has_content(config: &Map<String, Value>) -> bool {
    config.str("content").is_some() || config.array("embeds").is_some_and(|e| !e.is_empty())
}

fn webhook_url(base: &str, thread_id: Option<&str>) -> String {
    let separator = if base.contains('?') { '&' } else { '?' };
    let mut url = format!("{}{}wait=true", base, separator);
    if let Some(thread) = thread_id {
        url.push_str("&thread_id=");
        url.push_str(&urlencoding::encode(thread));
    }
    url
}

#[async_trait]
impl<C: HttpClient> Action for DiscordAction<C> {
    fn action_type(&self) -> ActionType {
        ActionType::Discord
    }

    fn name(&self) -> &str {
        "Discord Message"
    }

    fn description(&self) -> &str {
        "Post a message to a Discord channel webhook"
    }

    fn schema(&self) -> &ConfigSchema {
        &self.schema
    }

    fn validate(&self, config: &Map<String, Value>) -> ValidationResult {
        let mut result = self.schema.validate(config);
        if !has_content(config) {
            result.error("One of content or embeds is required");
        }
        if config
            .str("content")
            .is_some_and(|c| c.chars().count() > MAX_CONTENT_LEN)
        {
            result.error(format!(
                "Field 'content' must be at most {} characters",
                MAX_CONTENT_LEN
            ));
        }
        if config.array("embeds").is_some_and(|e| e.len() > MAX_EMBEDS) {
            result.error(format!("Field 'embeds' must have at most {} items", MAX_EMBEDS));
        }
        result
    }

    async fn execute(&self, input: ActionInput<'_>) -> Result<ActionOutput, ActionError> {
        let config = input.config;
        let base = config.require_str("webhookUrl")?;
        if !has_content(config) {
            return Err(ActionError::config("One of content or embeds is required"));
        }

        let mut message = Map::new();
        if let Some(content) = config.str("content") {
            message.insert("content".into(), json!(content));
        }
        if let Some(embeds) = config.array("embeds") {
            message.insert("embeds".into(), Value::Array(embeds.clone()));
        }
        if let Some(username) = config.str("username") {
            message.insert("username".into(), json!(username));
        }
        if let Some(avatar) = config.str("avatarUrl") {
            message.insert("avatar_url".into(), json!(avatar));
        }
        if config.bool_or("tts", false) {
            message.insert("tts".into(), json!(true));
        }

        let url = webhook_url(base, config.str("threadId"));
        let request = HttpRequest::post(url).json(&Value::Object(message));
        let response = send_with_cancel(&self.client, request, &input.cancel).await?;
        let body = response.json_body().unwrap_or(Value::Null);

        if !response.is_success() {
            let code = body
                .get("code")
                .map(to_display_string)
                .unwrap_or_else(|| response.status.to_string());
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| response.snippet());
            return Err(ActionError::http(
                response.status,
                format!("Discord API error {}: {}", code, message),
            ));
        }

        Ok(ActionOutput::data(json!({
            "messageId": body.get("id").cloned().unwrap_or(Value::Null),
            "channelId": body.get("channel_id").cloned().unwrap_or(Value::Null),
            "status": response.status,
        })))
    }
}

#[cfg(test)]
#[path = "discord_tests.rs"]
mod tests;
