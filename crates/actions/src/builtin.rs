// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Startup registration of the built-in action set

use crate::action::Action;
use crate::http::HttpClient;
use crate::plugins::{
    DelayAction, DiscordAction, EmailAction, FilterAction, HttpAction, SlackAction,
    TransformAction, WebhookAction,
};
use crate::registry::{ActionRegistry, BulkRegistration, RegisterOptions};
use std::sync::Arc;

/// One instance of every built-in plugin, sharing `client`
pub fn builtin_actions<C: HttpClient>(client: C) -> Vec<Arc<dyn Action>> {
    vec![
        Arc::new(HttpAction::new(client.clone())),
        Arc::new(WebhookAction::new(client.clone())),
        Arc::new(SlackAction::new(client.clone())),
        Arc::new(DiscordAction::new(client.clone())),
        Arc::new(EmailAction::new(client)),
        Arc::new(DelayAction::new()),
        Arc::new(FilterAction::new()),
        Arc::new(TransformAction::new()),
    ]
}

pub fn register_builtin_actions<C: HttpClient>(
    registry: &ActionRegistry,
    client: C,
) -> BulkRegistration {
    let outcome = registry.register_bulk(builtin_actions(client), RegisterOptions::default());
    tracing::info!(
        registered = outcome.registered.len(),
        failed = outcome.failed.len(),
        "built-in actions registered"
    );
    outcome
}

#[cfg(test)]
#[path = "builtin_tests.rs"]
mod tests;
