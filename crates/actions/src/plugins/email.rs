// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Email delivery through the Resend API

use crate::action::{Action, ActionInput, ActionOutput};
use crate::config::ConfigExt;
use crate::error::ActionError;
use crate::http::{send_with_cancel, HttpClient, HttpRequest};
use crate::schema::{ConfigSchema, FieldSpec, FieldType, ValidationResult};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use botwork_core::{ActionType, ExecutionContext};
use regex::Regex;
use serde_json::{json, Map, Value};
use std::sync::LazyLock;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub const DEFAULT_API_URL: &str = "https://api.resend.com/emails";
pub const DEFAULT_API_KEY_SECRET: &str = "RESEND_API_KEY";
pub const DEFAULT_FROM: &str = "Botwork <noreply@botwork.dev>";

// Constant pattern, compile-time verified
#[allow(clippy::expect_used)]
static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@<>]+@[^\s@<>]+\.[^\s@<>]+$").expect("constant regex pattern is valid")
});

pub struct EmailAction<C> {
    client: C,
    schema: ConfigSchema,
}

impl<C: HttpClient> EmailAction<C> {
    pub fn new(client: C) -> Self {
        let schema = ConfigSchema::new()
            .field(
                FieldSpec::required("to", FieldType::String)
                    .or(FieldType::Array)
                    .or(FieldType::Object),
            )
            .field(FieldSpec::required("subject", FieldType::String))
            .field(FieldSpec::optional("html", FieldType::String))
            .field(FieldSpec::optional("text", FieldType::String))
            .field(FieldSpec::optional("from", FieldType::String))
            .field(
                FieldSpec::optional("cc", FieldType::String)
                    .or(FieldType::Array)
                    .or(FieldType::Object),
            )
            .field(
                FieldSpec::optional("bcc", FieldType::String)
                    .or(FieldType::Array)
                    .or(FieldType::Object),
            )
            .field(FieldSpec::optional("replyTo", FieldType::String))
            .field(FieldSpec::optional("attachments", FieldType::Array))
            .field(
                FieldSpec::optional("apiKeySecret", FieldType::String)
                    .describe("Name of the secret holding the Resend API key"),
            )
            .field(FieldSpec::optional("apiUrl", FieldType::String).pattern(r"^https?://"));
        Self { client, schema }
    }

    async fn fetch_attachment(
        &self,
        url: &str,
        filename: &str,
        cancel: &CancellationToken,
    ) -> Result<String, ActionError> {
        let response = send_with_cancel(&self.client, HttpRequest::get(url), cancel).await?;
        if !response.is_success() {
            return Err(ActionError::http(
                response.status,
                format!(
                    "Failed to fetch attachment {}: HTTP {}",
                    filename, response.status
                ),
            ));
        }
        Ok(STANDARD.encode(&response.body))
    }

    async fn attachments(
        &self,
        list: &[Value],
        cancel: &CancellationToken,
    ) -> Result<Vec<Value>, ActionError> {
        let mut out = Vec::with_capacity(list.len());
        for (i, item) in list.iter().enumerate() {
            let item = item.as_object().ok_or_else(|| {
                ActionError::config(format!("Attachment {} must be an object", i))
            })?;
            let filename = item.require_str("filename")?;
            let content = match (item.str("content"), item.str("url")) {
                (Some(content), _) => content.to_string(),
                (None, Some(url)) => self.fetch_attachment(url, filename, cancel).await?,
                (None, None) => {
                    return Err(ActionError::config(format!(
                        "Attachment {} needs content or url",
                        filename
                    )))
                }
            };
            let mut attachment = json!({ "filename": filename, "content": content });
            if let Some(content_type) = item.str("contentType") {
                attachment["content_type"] = json!(content_type);
            }
            out.push(attachment);
        }
        Ok(out)
    }
}

/// Flatten the accepted recipient shapes into address strings
///
/// Accepts `"a@x.com"`, `"a@x.com, b@x.com"`, `{email, name}` and arrays
/// of either.
pub fn normalize_recipients(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Value::Array(items) => items.iter().flat_map(normalize_recipients).collect(),
        Value::Object(map) => match (map.str("email"), map.str("name")) {
            (Some(email), Some(name)) => vec![format!("{} <{}>", name, email)],
            (Some(email), None) => vec![email.to_string()],
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// Bare address of a recipient, stripping any `Name <...>` wrapper
fn address(recipient: &str) -> &str {
    match (recipient.rfind('<'), recipient.rfind('>')) {
        (Some(start), Some(end)) if start < end => &recipient[start + 1..end],
        _ => recipient,
    }
}

fn invalid_recipients(recipients: &[String]) -> Vec<&str> {
    recipients
        .iter()
        .map(|r| address(r))
        .filter(|a| !a.contains("{{") && !EMAIL.is_match(a))
        .collect()
}

fn resolve_api_key(ctx: &ExecutionContext, name: &str) -> Result<String, ActionError> {
    ctx.get_secret(name)
        .or_else(|| std::env::var(name).ok())
        .filter(|k| !k.is_empty())
        .ok_or_else(|| {
            ActionError::config(format!("Missing email API key: secret '{}' is not set", name))
        })
}

#[async_trait]
impl<C: HttpClient> Action for EmailAction<C> {
    fn action_type(&self) -> ActionType {
        ActionType::Email
    }

    fn name(&self) -> &str {
        "Send Email"
    }

    fn description(&self) -> &str {
        "Send an email through Resend"
    }

    fn schema(&self) -> &ConfigSchema {
        &self.schema
    }

    fn validate(&self, config: &Map<String, Value>) -> ValidationResult {
        let mut result = self.schema.validate(config);
        if config.str("html").is_none() && config.str("text").is_none() {
            result.error("One of html or text is required");
        }
        for field in ["to", "cc", "bcc"] {
            if let Some(value) = config.get(field) {
                let recipients = normalize_recipients(value);
                if field == "to" && recipients.is_empty() && !value.is_null() {
                    result.error("Field 'to' has no recipients");
                }
                for bad in invalid_recipients(&recipients) {
                    result.error(format!("Invalid email address in '{}': {}", field, bad));
                }
            }
        }
        result
    }

    async fn execute(&self, input: ActionInput<'_>) -> Result<ActionOutput, ActionError> {
        let config = input.config;
        let to = config.get("to").map(normalize_recipients).unwrap_or_default();
        if to.is_empty() {
            return Err(ActionError::config("Missing required field: to"));
        }
        if let Some(bad) = invalid_recipients(&to).first() {
            return Err(ActionError::config(format!("Invalid email address: {}", bad)));
        }
        let subject = config.require_str("subject")?;
        let api_key = resolve_api_key(
            input.context,
            config.str_or("apiKeySecret", DEFAULT_API_KEY_SECRET),
        )?;

        let mut email = json!({
            "from": config.str_or("from", DEFAULT_FROM),
            "to": to,
            "subject": subject,
        });
        for (key, field) in [("html", "html"), ("text", "text"), ("replyTo", "reply_to")] {
            if let Some(value) = config.str(key) {
                email[field] = json!(value);
            }
        }
        for field in ["cc", "bcc"] {
            let list = config.get(field).map(normalize_recipients).unwrap_or_default();
            if !list.is_empty() {
                email[field] = json!(list);
            }
        }
        if let Some(list) = config.array("attachments").filter(|l| !l.is_empty()) {
            email["attachments"] = Value::Array(self.attachments(list, &input.cancel).await?);
        }

        let request = HttpRequest::post(config.str_or("apiUrl", DEFAULT_API_URL))
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&email);
        let response = send_with_cancel(&self.client, request, &input.cancel).await?;
        let body = response.json_body().unwrap_or(Value::Null);

        if !response.is_success() {
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| response.snippet());
            return Err(ActionError::http(
                response.status,
                format!("Email API error {}: {}", response.status, message),
            ));
        }

        Ok(ActionOutput::data(json!({
            "id": body.get("id").cloned().unwrap_or(Value::Null),
            "to": email["to"],
            "subject": subject,
        })))
    }

    fn default_timeout(&self) -> Duration {
        Duration::from_secs(60)
    }
}

#[cfg(test)]
#[path = "email_tests.rs"]
mod tests;
