// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Generic HTTP request action

use super::header_pairs;
use crate::action::{Action, ActionInput, ActionOutput};
use crate::config::ConfigExt;
use crate::error::ActionError;
use crate::http::{
    append_query, form_encode, send_with_cancel, HttpClient, HttpMethod, HttpRequest,
};
use crate::schema::{ConfigSchema, FieldSpec, FieldType, ValidationResult};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use botwork_core::value::to_display_string;
use botwork_core::ActionType;
use serde_json::{json, Map, Value};

const BODY_TYPES: &[&str] = &["json", "form", "text", "none"];
const AUTH_TYPES: &[&str] = &["basic", "bearer", "api_key"];

pub struct HttpAction<C> {
    client: C,
    schema: ConfigSchema,
}

impl<C: HttpClient> HttpAction<C> {
    pub fn new(client: C) -> Self {
        let schema = ConfigSchema::new()
            .field(
                FieldSpec::required("url", FieldType::String)
                    .pattern(r"^https?://")
                    .describe("Request URL"),
            )
            .field(FieldSpec::optional("method", FieldType::String).one_of(&HttpMethod::NAMES))
            .field(FieldSpec::optional("headers", FieldType::Object))
            .field(FieldSpec::optional("query", FieldType::Object))
            .field(FieldSpec::optional("body", FieldType::Any))
            .field(FieldSpec::optional("bodyType", FieldType::String).one_of(BODY_TYPES))
            .field(FieldSpec::optional("auth", FieldType::Object).sensitive())
            .field(FieldSpec::optional("successCodes", FieldType::Array));
        Self { client, schema }
    }

    fn build_request(&self, config: &Map<String, Value>) -> Result<HttpRequest, ActionError> {
        let url = config.require_str("url")?;
        let method = match config.str("method") {
            Some(m) => HttpMethod::parse(m)
                .ok_or_else(|| ActionError::config(format!("Unsupported HTTP method: {}", m)))?,
            None => HttpMethod::Get,
        };

        let query: Vec<(String, String)> = header_pairs(config.object("query"));
        let mut request = HttpRequest::new(method, append_query(url, &query));
        for (name, value) in header_pairs(config.object("headers")) {
            request.set_header(name, value);
        }

        if let Some(auth) = config.object("auth") {
            apply_auth(&mut request, auth)?;
        }

        if method.allows_body() {
            if let Some(body) = config.get("body").filter(|b| !b.is_null()) {
                apply_body(&mut request, body, config.str_or("bodyType", "json"))?;
            }
        }

        Ok(request)
    }
}

fn apply_auth(request: &mut HttpRequest, auth: &Map<String, Value>) -> Result<(), ActionError> {
    match auth.str_or("type", "") {
        "basic" => {
            let user = auth.str_or("username", "");
            let pass = auth.str_or("password", "");
            let encoded = STANDARD.encode(format!("{}:{}", user, pass));
            request.set_header("Authorization", format!("Basic {}", encoded));
        }
        "bearer" => {
            let token = auth.require_str("token")?;
            request.set_header("Authorization", format!("Bearer {}", token));
        }
        "api_key" => {
            let key = auth.require_str("key")?;
            request.set_header(auth.str_or("headerName", "X-API-Key"), key);
        }
        other => {
            return Err(ActionError::config(format!(
                "Unsupported auth type: {}",
                other
            )))
        }
    }
    Ok(())
}

fn apply_body(request: &mut HttpRequest, body: &Value, body_type: &str) -> Result<(), ActionError> {
    let (content_type, bytes) = match body_type {
        "json" => ("application/json", body.to_string()),
        "form" => {
            let fields = body.as_object().ok_or_else(|| {
                ActionError::config("Form body must be an object of fields")
            })?;
            (
                "application/x-www-form-urlencoded",
                form_encode(&header_pairs(Some(fields))),
            )
        }
        "text" => ("text/plain", to_display_string(body)),
        "none" => return Ok(()),
        other => return Err(ActionError::config(format!("Unsupported body type: {}", other))),
    };
    if !request.has_header("content-type") {
        request.set_header("Content-Type", content_type);
    }
    request.body = Some(bytes.into_bytes());
    Ok(())
}

fn success_codes(config: &Map<String, Value>) -> Option<Vec<u16>> {
    config.array("successCodes").map(|codes| {
        codes
            .iter()
            .filter_map(Value::as_u64)
            .filter_map(|c| u16::try_from(c).ok())
            .collect()
    })
}

#[async_trait]
impl<C: HttpClient> Action for HttpAction<C> {
    fn action_type(&self) -> ActionType {
        ActionType::Http
    }

    fn name(&self) -> &str {
        "HTTP Request"
    }

    fn description(&self) -> &str {
        "Make an HTTP request to any URL"
    }

    fn schema(&self) -> &ConfigSchema {
        &self.schema
    }

    fn validate(&self, config: &Map<String, Value>) -> ValidationResult {
        let mut result = self.schema.validate(config);
        if let Some(auth) = config.object("auth") {
            match auth.str("type") {
                Some(t) if AUTH_TYPES.contains(&t) || t.contains("{{") => {}
                Some(_) => result.error(format!(
                    "Field 'auth.type' must be one of: {}",
                    AUTH_TYPES.join(", ")
                )),
                None => result.error("Missing required field: auth.type"),
            }
        }
        result
    }

    async fn execute(&self, input: ActionInput<'_>) -> Result<ActionOutput, ActionError> {
        let request = self.build_request(input.config)?;
        let method = request.method;
        let response = send_with_cancel(&self.client, request, &input.cancel).await?;

        let ok = match success_codes(input.config) {
            Some(codes) if !codes.is_empty() => codes.contains(&response.status),
            _ => response.is_success(),
        };
        if !ok {
            return Err(ActionError::http(
                response.status,
                format!("HTTP {}: {}", response.status, response.snippet()),
            ));
        }

        let data = json!({
            "status": response.status,
            "headers": response.headers_object(),
            "body": response.body_value(),
            "ok": true,
        });
        Ok(ActionOutput::data(data).with_metadata(json!({ "method": method.as_str() })))
    }
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
