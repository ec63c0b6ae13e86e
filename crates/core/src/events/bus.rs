// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fan-out of execution events to pattern listeners

use super::event::ExecutionEvent;
use super::pattern::EventPattern;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Receiving end of [`EventBus::listen`]
pub type EventReceiver = mpsc::UnboundedReceiver<ExecutionEvent>;

struct Listener {
    pattern: EventPattern,
    tx: mpsc::UnboundedSender<ExecutionEvent>,
}

/// Shared by clones; publishing never blocks
#[derive(Clone, Default)]
pub struct EventBus {
    listeners: Arc<Mutex<Vec<Listener>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Receive every later event matching `pattern`
    ///
    /// Dropping the receiver ends delivery; the listener is pruned on the
    /// next publish.
    pub fn listen(&self, pattern: &str) -> EventReceiver {
        let (tx, rx) = mpsc::unbounded_channel();
        let pattern = EventPattern::parse(pattern);
        if pattern == EventPattern::Never {
            tracing::debug!("event pattern matches nothing");
        }
        self.lock().push(Listener { pattern, tx });
        rx
    }

    pub fn publish(&self, event: ExecutionEvent) {
        self.lock().retain(|listener| {
            if listener.tx.is_closed() {
                return false;
            }
            !listener.pattern.matches(&event) || listener.tx.send(event.clone()).is_ok()
        });
    }

    pub fn listener_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Listener>> {
        self.listeners.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
#[path = "bus_tests.rs"]
mod tests;
