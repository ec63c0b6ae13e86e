// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! botwork-core: data model and pure building blocks for the bot engine
//!
//! This crate provides:
//! - Clock and id abstractions for deterministic tests
//! - Bot, action, and result types shared by every other crate
//! - The five-field cron parser used by the scheduler
//! - The per-run execution context with `{{path}}` interpolation
//! - Execution events and the event bus they are published on
//! - Engine configuration loaded from TOML

pub mod clock;
pub mod id;

pub mod bot;
pub mod config;
pub mod context;
pub mod cron;
pub mod events;
pub mod result;
pub mod value;

// Re-exports
pub use bot::{
    ActionConfig, ActionType, BotConfig, BotSettings, RetryOverride, ScheduleConfig, TriggerType,
};
pub use clock::{Clock, FakeClock, SharedClock, SystemClock};
pub use config::{ConfigError, EngineConfig, ExecutorSettings, RetryConfig, SchedulerSettings};
pub use context::{
    ContextError, ContextOptions, ContextSnapshot, EnvSecretSource, ExecutionContext,
    MapSecretSource, SecretSource, Variable, VariableSource, REDACTED,
};
pub use cron::{CronError, CronParser, CronSchedule, CronValidation};
pub use events::{EventBus, EventPattern, EventReceiver, ExecutionEvent};
pub use id::{IdGen, SequentialIdGen, UuidIdGen};
pub use result::{ActionResult, ActionStatus, ErrorInfo, ExecutionResult, ExecutionStatus};
