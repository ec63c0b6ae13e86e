// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::{Duration, TimeZone};
use proptest::prelude::*;

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
}

fn job(id: &str, priority: i32, due_offset_min: i64) -> QueuedJob {
    QueuedJob {
        queue_id: id.to_string(),
        job_id: format!("job-{}", id),
        bot_id: format!("bot-{}", id),
        scheduled_for: base() + Duration::minutes(due_offset_min),
        queued_at: base(),
        priority,
        attempts: 0,
        max_attempts: 2,
        status: QueueStatus::Queued,
        last_error: None,
    }
}

fn ids(jobs: &[QueuedJob]) -> Vec<&str> {
    jobs.iter().map(|j| j.queue_id.as_str()).collect()
}

#[test]
fn claim_orders_by_priority_then_due_time() {
    let mut queue = RunQueue::new();
    queue.push(job("late-low", 0, 5));
    queue.push(job("early-low", 0, 1));
    queue.push(job("high", 10, 9));

    let claimed = queue.claim(2);
    assert_eq!(ids(&claimed), vec!["high", "early-low"]);
    assert!(claimed.iter().all(|j| j.status == QueueStatus::Processing && j.attempts == 1));
    assert_eq!(queue.count(QueueStatus::Queued), 1);
    assert_eq!(queue.count(QueueStatus::Processing), 2);

    // Processing entries are not claimed twice
    assert_eq!(ids(&queue.claim(5)), vec!["late-low"]);
    assert!(queue.claim(5).is_empty());
}

#[test]
fn failures_requeue_until_attempts_run_out() {
    let mut queue = RunQueue::new();
    queue.push(job("a", 0, 0));

    queue.claim(1);
    let outcome = queue.fail("a", "busy").unwrap();
    assert!(matches!(outcome, FailOutcome::Requeued(ref j) if j.attempts == 1));
    assert_eq!(queue.count(QueueStatus::Queued), 1);

    queue.claim(1);
    let FailOutcome::Exhausted(job) = queue.fail("a", "still busy").unwrap() else {
        panic!("expected exhaustion");
    };
    assert_eq!(job.status, QueueStatus::Failed);
    assert_eq!(job.last_error.as_deref(), Some("still busy"));
    assert!(queue.is_empty());
}

#[test]
fn complete_removes_entry() {
    let mut queue = RunQueue::new();
    queue.push(job("a", 0, 0));
    queue.claim(1);
    let done = queue.complete("a").unwrap();
    assert_eq!(done.status, QueueStatus::Completed);
    assert!(queue.complete("a").is_none());
    assert!(queue.fail("a", "x").is_none());
}

#[test]
fn remove_bot_spares_in_flight_entries() {
    let mut queue = RunQueue::new();
    let mut first = job("a", 0, 0);
    first.bot_id = "shared".to_string();
    let mut second = job("b", 0, 1);
    second.bot_id = "shared".to_string();
    queue.push(first);
    queue.push(second);
    queue.claim(1);

    assert_eq!(queue.remove_bot("shared"), 1);
    assert_eq!(ids(&queue.snapshot()), vec!["a"]);
}

proptest! {
    #[test]
    fn claim_order_is_sorted(entries in proptest::collection::vec((-5i32..5, 0i64..120), 1..30)) {
        let mut queue = RunQueue::new();
        for (i, (priority, offset)) in entries.iter().enumerate() {
            queue.push(job(&i.to_string(), *priority, *offset));
        }
        let claimed = queue.claim(entries.len());
        prop_assert_eq!(claimed.len(), entries.len());
        for pair in claimed.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            prop_assert!(
                a.priority > b.priority
                    || (a.priority == b.priority && a.scheduled_for <= b.scheduled_for)
            );
        }
    }
}
