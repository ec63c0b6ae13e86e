// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Due scheduled runs waiting for an execution slot
//!
//! Entries are ordered by priority (highest first), then by the time they
//! were due (oldest first). Ties keep insertion order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueStatus {
    Queued,
    Processing,
    Completed,
    Failed,
}

impl fmt::Display for QueueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            QueueStatus::Queued => "queued",
            QueueStatus::Processing => "processing",
            QueueStatus::Completed => "completed",
            QueueStatus::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueuedJob {
    pub queue_id: String,
    pub job_id: String,
    pub bot_id: String,
    pub scheduled_for: DateTime<Utc>,
    pub queued_at: DateTime<Utc>,
    pub priority: i32,
    /// Attempts started so far
    pub attempts: u32,
    pub max_attempts: u32,
    pub status: QueueStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

/// What [`RunQueue::fail`] did with the entry
#[derive(Debug, Clone, PartialEq)]
pub enum FailOutcome {
    /// Back in the queue for another attempt
    Requeued(QueuedJob),
    /// Out of attempts and removed
    Exhausted(QueuedJob),
}

#[derive(Debug, Clone, Default)]
pub struct RunQueue {
    items: Vec<QueuedJob>,
}

impl RunQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, job: QueuedJob) {
        self.items.push(job);
        Self::sort_items(&mut self.items);
    }

    fn sort_items(items: &mut [QueuedJob]) {
        // Stable sort keeps insertion order among equals
        items.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then(a.scheduled_for.cmp(&b.scheduled_for))
        });
    }

    /// Move up to `limit` waiting entries to processing, in queue order
    pub fn claim(&mut self, limit: usize) -> Vec<QueuedJob> {
        self.items
            .iter_mut()
            .filter(|job| job.status == QueueStatus::Queued)
            .take(limit)
            .map(|job| {
                job.status = QueueStatus::Processing;
                job.attempts += 1;
                job.clone()
            })
            .collect()
    }

    /// Remove a finished entry
    pub fn complete(&mut self, queue_id: &str) -> Option<QueuedJob> {
        let index = self.items.iter().position(|j| j.queue_id == queue_id)?;
        let mut job = self.items.remove(index);
        job.status = QueueStatus::Completed;
        Some(job)
    }

    /// Record a failed attempt, requeueing until `max_attempts` is spent
    pub fn fail(&mut self, queue_id: &str, error: impl Into<String>) -> Option<FailOutcome> {
        let index = self.items.iter().position(|j| j.queue_id == queue_id)?;
        let job = &mut self.items[index];
        job.last_error = Some(error.into());
        if job.attempts >= job.max_attempts {
            let mut job = self.items.remove(index);
            job.status = QueueStatus::Failed;
            return Some(FailOutcome::Exhausted(job));
        }
        job.status = QueueStatus::Queued;
        Some(FailOutcome::Requeued(job.clone()))
    }

    /// Drop every waiting entry for a bot; in-flight entries are left alone
    pub fn remove_bot(&mut self, bot_id: &str) -> usize {
        let before = self.items.len();
        self.items
            .retain(|j| j.bot_id != bot_id || j.status == QueueStatus::Processing);
        before - self.items.len()
    }

    /// Entries (waiting or in flight) for one scheduled job
    pub fn pending_for(&self, job_id: &str) -> usize {
        self.items.iter().filter(|j| j.job_id == job_id).count()
    }

    pub fn count(&self, status: QueueStatus) -> usize {
        self.items.iter().filter(|j| j.status == status).count()
    }

    pub fn snapshot(&self) -> Vec<QueuedJob> {
        self.items.clone()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
