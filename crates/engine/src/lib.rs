// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! botwork-engine: runs bots and fires them on their schedules
//!
//! - [`BotExecutor`] runs one bot's actions in order with retries,
//!   timeouts, conditions, and cancellation
//! - [`BotScheduler`] turns cron schedules into queued runs and admits
//!   them under a concurrency bound

mod error;
mod executor;
mod output;
mod queue;
mod retry;
mod runner;
mod scheduler;
mod validate;

pub use error::{EngineError, SchedulerError};
pub use executor::{BotExecutor, ExecuteOptions};
pub use output::build_final_output;
pub use queue::{FailOutcome, QueueStatus, QueuedJob, RunQueue};
pub use retry::{calculate_retry_delay, merged_retry_config, JITTER_FRACTION};
pub use runner::BotRunner;
pub use scheduler::{
    BotScheduler, ErrorHook, ExecutionHook, RunSummary, ScheduledJob, SchedulerStats, UpcomingRun,
};
pub use validate::validate_bot;
