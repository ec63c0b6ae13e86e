// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Outbound webhook with optional HMAC signing
//!
//! The signature covers the exact bytes sent. With `includeTimestamp`,
//! the signed string is `"{timestamp}.{body}"` and the timestamp travels
//! in `X-Webhook-Timestamp` so receivers can reject replays.

use super::header_pairs;
use crate::action::{Action, ActionInput, ActionOutput};
use crate::config::ConfigExt;
use crate::error::ActionError;
use crate::http::{form_encode, send_with_cancel, HttpClient, HttpMethod, HttpRequest};
use crate::schema::{ConfigSchema, FieldSpec, FieldType};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use botwork_core::value::to_display_string;
use botwork_core::ActionType;
use hmac::{Hmac, Mac};
use serde_json::{json, Map, Value};
use sha1::Sha1;
use sha2::{Sha256, Sha512};

pub const DEFAULT_SIGNATURE_HEADER: &str = "X-Webhook-Signature";
pub const TIMESTAMP_HEADER: &str = "X-Webhook-Timestamp";

const METHODS: &[&str] = &["POST", "PUT", "PATCH"];
const FORMATS: &[&str] = &["json", "form", "raw"];
const ALGORITHMS: &[&str] = &["sha256", "sha1", "sha512"];
const ENCODINGS: &[&str] = &["hex", "base64"];

pub struct WebhookAction<C> {
    client: C,
    schema: ConfigSchema,
}

impl<C: HttpClient> WebhookAction<C> {
    pub fn new(client: C) -> Self {
        let schema = ConfigSchema::new()
            .field(FieldSpec::required("url", FieldType::String).pattern(r"^https?://"))
            .field(FieldSpec::optional("method", FieldType::String).one_of(METHODS))
            .field(FieldSpec::optional("headers", FieldType::Object))
            .field(
                FieldSpec::optional("payload", FieldType::Any)
                    .describe("Custom data merged into the payload"),
            )
            .field(FieldSpec::optional("includeTrigger", FieldType::Boolean))
            .field(FieldSpec::optional("includeMetadata", FieldType::Boolean))
            .field(FieldSpec::optional("format", FieldType::String).one_of(FORMATS))
            .field(FieldSpec::optional("secret", FieldType::String).sensitive())
            .field(FieldSpec::optional("algorithm", FieldType::String).one_of(ALGORITHMS))
            .field(FieldSpec::optional("encoding", FieldType::String).one_of(ENCODINGS))
            .field(FieldSpec::optional("signatureHeader", FieldType::String))
            .field(FieldSpec::optional("signaturePrefix", FieldType::String))
            .field(FieldSpec::optional("includeTimestamp", FieldType::Boolean));
        Self { client, schema }
    }
}

fn hmac_bytes(algorithm: &str, secret: &[u8], message: &[u8]) -> Result<Vec<u8>, ActionError> {
    fn digest<M: Mac + hmac::digest::KeyInit>(
        secret: &[u8],
        message: &[u8],
    ) -> Result<Vec<u8>, ActionError> {
        let mut mac = <M as hmac::digest::KeyInit>::new_from_slice(secret)
            .map_err(|e| ActionError::config(format!("Invalid webhook secret: {}", e)))?;
        mac.update(message);
        Ok(mac.finalize().into_bytes().to_vec())
    }

    match algorithm {
        "sha256" => digest::<Hmac<Sha256>>(secret, message),
        "sha1" => digest::<Hmac<Sha1>>(secret, message),
        "sha512" => digest::<Hmac<Sha512>>(secret, message),
        other => Err(ActionError::config(format!(
            "Unsupported signature algorithm: {}",
            other
        ))),
    }
}

/// Signature over `message`, encoded as configured
pub fn sign(
    algorithm: &str,
    encoding: &str,
    secret: &str,
    message: &[u8],
) -> Result<String, ActionError> {
    let bytes = hmac_bytes(algorithm, secret.as_bytes(), message)?;
    match encoding {
        "hex" => Ok(hex::encode(bytes)),
        "base64" => Ok(STANDARD.encode(bytes)),
        other => Err(ActionError::config(format!(
            "Unsupported signature encoding: {}",
            other
        ))),
    }
}

fn build_payload(input: &ActionInput<'_>) -> Value {
    let config = input.config;
    let mut payload = Map::new();

    match config.get("payload") {
        Some(Value::Object(custom)) => payload.insert("data".into(), Value::Object(custom.clone())),
        Some(other) if !other.is_null() => payload.insert("data".into(), other.clone()),
        _ => None,
    };
    if config.bool_or("includeTrigger", true) && !input.context.trigger_data().is_null() {
        payload.insert("trigger".into(), input.context.trigger_data().clone());
    }
    if config.bool_or("includeMetadata", true) {
        payload.insert(
            "metadata".into(),
            json!({
                "runId": input.context.run_id(),
                "botId": input.context.bot_id(),
                "actionId": input.action.id,
                "timestamp": input.context.now().to_rfc3339(),
            }),
        );
    }
    Value::Object(payload)
}

fn encode_payload(payload: &Value, format: &str) -> Result<(&'static str, String), ActionError> {
    match format {
        "json" => Ok(("application/json", payload.to_string())),
        "form" => {
            let pairs: Vec<(String, String)> = payload
                .as_object()
                .into_iter()
                .flatten()
                .map(|(k, v)| (k.clone(), to_display_string(v)))
                .collect();
            Ok(("application/x-www-form-urlencoded", form_encode(&pairs)))
        }
        "raw" => {
            let body = payload
                .get("data")
                .map(to_display_string)
                .unwrap_or_default();
            Ok(("text/plain", body))
        }
        other => Err(ActionError::config(format!("Unsupported payload format: {}", other))),
    }
}

#[async_trait]
impl<C: HttpClient> Action for WebhookAction<C> {
    fn action_type(&self) -> ActionType {
        ActionType::Webhook
    }

    fn name(&self) -> &str {
        "Webhook"
    }

    fn description(&self) -> &str {
        "Send a signed payload to a webhook endpoint"
    }

    fn schema(&self) -> &ConfigSchema {
        &self.schema
    }

    async fn execute(&self, input: ActionInput<'_>) -> Result<ActionOutput, ActionError> {
        let config = input.config;
        let url = config.require_str("url")?;
        let method = HttpMethod::parse(config.str_or("method", "POST"))
            .filter(|m| METHODS.contains(&m.as_str()))
            .ok_or_else(|| ActionError::config("Webhook method must be POST, PUT or PATCH"))?;

        let payload = build_payload(&input);
        let (content_type, body) = encode_payload(&payload, config.str_or("format", "json"))?;

        let mut request = HttpRequest::new(method, url);
        for (name, value) in header_pairs(config.object("headers")) {
            request.set_header(name, value);
        }
        if !request.has_header("content-type") {
            request.set_header("Content-Type", content_type);
        }

        let mut signed = false;
        if let Some(secret) = config.str("secret") {
            let algorithm = config.str_or("algorithm", "sha256");
            let encoding = config.str_or("encoding", "hex");
            let message = if config.bool_or("includeTimestamp", false) {
                let timestamp = input.context.now().timestamp().to_string();
                request.set_header(TIMESTAMP_HEADER, timestamp.clone());
                format!("{}.{}", timestamp, body)
            } else {
                body.clone()
            };
            let signature = sign(algorithm, encoding, secret, message.as_bytes())?;
            let prefix = config.str_or("signaturePrefix", "");
            request.set_header(
                config.str_or("signatureHeader", DEFAULT_SIGNATURE_HEADER),
                format!("{}{}", prefix, signature),
            );
            signed = true;
        }
        request.body = Some(body.into_bytes());

        let response = send_with_cancel(&self.client, request, &input.cancel).await?;
        if !response.is_success() {
            return Err(ActionError::http(
                response.status,
                format!("Webhook failed with HTTP {}: {}", response.status, response.snippet()),
            ));
        }

        Ok(ActionOutput::data(json!({
            "status": response.status,
            "response": response.body_value(),
            "signed": signed,
        })))
    }
}

#[cfg(test)]
#[path = "webhook_tests.rs"]
mod tests;
