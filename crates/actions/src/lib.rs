// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Action plugins and the registry that dispatches to them

pub mod action;
pub mod builtin;
pub mod config;
pub mod error;
pub mod http;
pub mod plugins;
pub mod registry;
pub mod schema;

pub use action::{Action, ActionInput, ActionOutput, DEFAULT_ACTION_TIMEOUT};
pub use builtin::{builtin_actions, register_builtin_actions};
pub use error::{ActionError, RegistryError};
pub use http::{
    HttpClient, HttpMethod, HttpRequest, HttpResponse, ReqwestHttpClient, TracedHttpClient,
};
pub use plugins::filter;
pub use plugins::{
    DelayAction, DiscordAction, EmailAction, FilterAction, HttpAction, SlackAction,
    TransformAction, WebhookAction,
};
pub use registry::{ActionRegistry, BulkRegistration, RegisterOptions, RegisteredAction};
pub use schema::{ConfigSchema, FieldSpec, FieldType, ValidationResult};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use http::{FakeHttpClient, FakeReply};
