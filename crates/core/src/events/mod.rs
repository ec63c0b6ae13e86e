// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Execution events and pattern-routed delivery
//!
//! This module provides:
//! - `ExecutionEvent` - What happened during a run
//! - `EventBus` - Fan events out to listeners by pattern
//! - `EventPattern` - Which event names a listener wants

mod bus;
mod event;
mod pattern;

pub use bus::{EventBus, EventReceiver};
pub use event::ExecutionEvent;
pub use pattern::EventPattern;
