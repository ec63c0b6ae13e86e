// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake HTTP client for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{HttpClient, HttpRequest, HttpResponse};
use crate::error::ActionError;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Scripted reply for a route
#[derive(Debug, Clone)]
pub enum FakeReply {
    Response(HttpResponse),
    Error(ActionError),
    /// Never completes; only cancellation or a timeout ends the request
    Hang,
    Delayed(Duration, Box<FakeReply>),
}

struct Route {
    pattern: String,
    replies: VecDeque<FakeReply>,
}

#[derive(Default)]
struct State {
    routes: Vec<Route>,
    calls: Vec<HttpRequest>,
}

/// Fake HTTP client for testing
///
/// Routes match when their pattern is a substring of the request URL;
/// the first matching route wins. Replies are consumed in order and the
/// last one repeats. Unrouted requests get a 404.
#[derive(Clone, Default)]
pub struct FakeHttpClient {
    state: Arc<Mutex<State>>,
}

impl FakeHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for URLs containing `pattern`
    pub fn on(&self, pattern: &str, reply: FakeReply) -> &Self {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        match state.routes.iter_mut().find(|r| r.pattern == pattern) {
            Some(route) => route.replies.push_back(reply),
            None => state.routes.push(Route {
                pattern: pattern.to_string(),
                replies: VecDeque::from([reply]),
            }),
        }
        self
    }

    pub fn respond(&self, pattern: &str, response: HttpResponse) -> &Self {
        self.on(pattern, FakeReply::Response(response))
    }

    pub fn json(&self, pattern: &str, status: u16, body: Value) -> &Self {
        self.respond(pattern, HttpResponse::json(status, &body))
    }

    pub fn text(&self, pattern: &str, status: u16, body: &str) -> &Self {
        self.respond(pattern, HttpResponse::new(status, body))
    }

    pub fn fail(&self, pattern: &str, error: ActionError) -> &Self {
        self.on(pattern, FakeReply::Error(error))
    }

    pub fn hang(&self, pattern: &str) -> &Self {
        self.on(pattern, FakeReply::Hang)
    }

    pub fn delayed(&self, pattern: &str, delay: Duration, reply: FakeReply) -> &Self {
        self.on(pattern, FakeReply::Delayed(delay, Box::new(reply)))
    }

    /// Get all recorded requests
    pub fn calls(&self) -> Vec<HttpRequest> {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .calls
            .clone()
    }

    pub fn calls_to(&self, pattern: &str) -> Vec<HttpRequest> {
        self.calls()
            .into_iter()
            .filter(|c| c.url.contains(pattern))
            .collect()
    }

    pub fn last_call(&self) -> Option<HttpRequest> {
        self.calls().pop()
    }

    fn next_reply(&self, request: HttpRequest) -> FakeReply {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let reply = state
            .routes
            .iter_mut()
            .find(|r| request.url.contains(&r.pattern))
            .and_then(|route| {
                if route.replies.len() > 1 {
                    route.replies.pop_front()
                } else {
                    route.replies.front().cloned()
                }
            });
        state.calls.push(request);
        reply.unwrap_or_else(|| FakeReply::Response(HttpResponse::new(404, "not found")))
    }
}

#[async_trait]
impl HttpClient for FakeHttpClient {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ActionError> {
        let timeout = request.timeout;
        let mut reply = self.next_reply(request);
        let resolve = async move {
            loop {
                match reply {
                    FakeReply::Response(response) => return Ok(response),
                    FakeReply::Error(error) => return Err(error),
                    FakeReply::Hang => return std::future::pending().await,
                    FakeReply::Delayed(delay, inner) => {
                        tokio::time::sleep(delay).await;
                        reply = *inner;
                    }
                }
            }
        };
        match timeout {
            Some(limit) => tokio::time::timeout(limit, resolve)
                .await
                .unwrap_or_else(|_| Err(ActionError::transport("ETIMEDOUT", "request timed out"))),
            None => resolve.await,
        }
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
