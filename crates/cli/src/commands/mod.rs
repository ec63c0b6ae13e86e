// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations

pub mod actions;
pub mod cron;
pub mod run;
pub mod schedule;
pub mod validate;
