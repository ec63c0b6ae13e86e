// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ID generation for runs, contexts, jobs and queue entries
//!
//! Every id carries a short kind prefix (`run`, `ctx`, `job`, `queue`) so that
//! ids in logs and result documents are self-describing.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Generates unique identifiers
pub trait IdGen: Clone + Send + Sync + 'static {
    /// Next id of the given kind, e.g. `next("run")`
    fn next(&self, kind: &str) -> String;
}

/// UUID-based ID generator for production use
#[derive(Clone, Default)]
pub struct UuidIdGen;

impl IdGen for UuidIdGen {
    fn next(&self, kind: &str) -> String {
        format!("{}_{}", kind, uuid::Uuid::new_v4().simple())
    }
}

/// Sequential ID generator for testing
///
/// The counter is shared across kinds and clones, so ids are unique within
/// one generator regardless of prefix.
#[derive(Clone, Default)]
pub struct SequentialIdGen {
    counter: Arc<AtomicU64>,
}

impl SequentialIdGen {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGen for SequentialIdGen {
    fn next(&self, kind: &str) -> String {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        format!("{}-{}", kind, n)
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
