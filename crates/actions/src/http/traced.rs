// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced HTTP wrapper for consistent observability

use super::{HttpClient, HttpRequest, HttpResponse};
use crate::error::ActionError;
use async_trait::async_trait;
use tracing::Instrument;

/// Wrapper that adds tracing to any HttpClient
///
/// Headers and bodies are never logged; they routinely carry credentials.
#[derive(Clone)]
pub struct TracedHttpClient<C> {
    inner: C,
}

impl<C> TracedHttpClient<C> {
    pub fn new(inner: C) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }
}

/// URL with the query string removed, since it may contain tokens
fn loggable_url(url: &str) -> &str {
    url.split(['?', '#']).next().unwrap_or(url)
}

#[async_trait]
impl<C: HttpClient> HttpClient for TracedHttpClient<C> {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ActionError> {
        let span = tracing::info_span!(
            "http.send",
            method = %request.method,
            url = loggable_url(&request.url)
        );

        async {
            tracing::debug!(
                header_count = request.headers.len(),
                body_len = request.body.as_ref().map_or(0, Vec::len),
                "sending"
            );

            let start = std::time::Instant::now();
            let result = self.inner.send(request).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match &result {
                Ok(response) if response.is_success() => {
                    tracing::info!(status = response.status, elapsed_ms, "response")
                }
                Ok(response) => {
                    tracing::warn!(status = response.status, elapsed_ms, "error response")
                }
                Err(e) => tracing::error!(elapsed_ms, code = %e.code(), error = %e, "request failed"),
            }

            result
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
