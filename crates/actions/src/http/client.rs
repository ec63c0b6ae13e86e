// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! reqwest-backed HTTP client

use super::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use crate::error::ActionError;
use async_trait::async_trait;

#[derive(Clone)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    pub fn new() -> Result<Self, ActionError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("botwork/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ActionError::failed(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Patch => reqwest::Method::PATCH,
        HttpMethod::Delete => reqwest::Method::DELETE,
        HttpMethod::Head => reqwest::Method::HEAD,
        HttpMethod::Options => reqwest::Method::OPTIONS,
    }
}

/// Map a reqwest failure onto the transient error codes retry policy knows
fn classify(e: reqwest::Error) -> ActionError {
    let message = e.to_string();
    if e.is_timeout() {
        return ActionError::transport("ETIMEDOUT", message);
    }
    let lower = format!("{:?}", e).to_lowercase();
    if lower.contains("dns") || lower.contains("failed to lookup address") {
        return ActionError::transport("ENOTFOUND", message);
    }
    if e.is_connect() {
        if lower.contains("reset") {
            return ActionError::transport("ECONNRESET", message);
        }
        return ActionError::transport("ECONNREFUSED", message);
    }
    if e.is_builder() {
        return ActionError::config(format!("invalid request: {}", message));
    }
    ActionError::Transport {
        code: None,
        message,
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ActionError> {
        let mut builder = self.client.request(method(request.method), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(classify)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(k, v)| {
                (
                    k.as_str().to_string(),
                    String::from_utf8_lossy(v.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response.bytes().await.map_err(classify)?.to_vec();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
