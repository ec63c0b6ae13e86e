// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Built-in action plugins

mod delay;
mod discord;
mod email;
pub mod filter;
mod http;
mod slack;
mod transform;
mod webhook;

pub use delay::DelayAction;
pub use discord::DiscordAction;
pub use email::EmailAction;
pub use filter::FilterAction;
pub use http::HttpAction;
pub use slack::SlackAction;
pub use transform::TransformAction;
pub use webhook::WebhookAction;

use botwork_core::value::to_display_string;
use serde_json::{Map, Value};

/// Header pairs from a `{name: value}` object; non-string values are rendered
pub(crate) fn header_pairs(headers: Option<&Map<String, Value>>) -> Vec<(String, String)> {
    headers
        .into_iter()
        .flatten()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| (k.clone(), to_display_string(v)))
        .collect()
}
