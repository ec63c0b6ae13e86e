// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration modules

mod engine;

pub use engine::{ConfigError, EngineConfig, ExecutorSettings, RetryConfig, SchedulerSettings};
