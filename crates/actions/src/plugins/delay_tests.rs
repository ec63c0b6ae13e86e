// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::plugins::test_support::{context, run, run_with_cancel};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use yare::parameterized;

#[parameterized(
    default_cap = { None, DEFAULT_MAX_DELAY_MS },
    custom_cap = { Some(10_000), 10_000 },
    capped_by_hard_ceiling = { Some(24 * 60 * 60 * 1000), HARD_MAX_DELAY_MS },
)]
fn ceiling_cases(max: Option<u64>, expected: u64) {
    assert_eq!(ceiling(max), expected);
}

#[test]
fn jitter_stays_within_percentage() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..200 {
        let ms = apply_jitter(1000, 20.0, &mut rng);
        assert!((800..=1200).contains(&ms), "{} out of range", ms);
    }
    assert_eq!(apply_jitter(1000, 0.0, &mut rng), 1000);
}

#[tokio::test(start_paused = true)]
async fn sleeps_for_converted_duration() {
    let action = DelayAction::new();
    let start = tokio::time::Instant::now();

    let output = run(&action, &context(), json!({"duration": 2, "unit": "s"}))
        .await
        .unwrap();

    assert_eq!(start.elapsed(), Duration::from_secs(2));
    assert_eq!(
        output.data.unwrap(),
        json!({"delayedMs": 2000, "requestedMs": 2000, "clamped": false})
    );
}

#[tokio::test(start_paused = true)]
async fn long_delays_are_clamped() {
    let action = DelayAction::new();
    let output = run(&action, &context(), json!({"duration": 2, "unit": "hr"}))
        .await
        .unwrap();
    let data = output.data.unwrap();
    assert_eq!(data["delayedMs"], DEFAULT_MAX_DELAY_MS);
    assert_eq!(data["requestedMs"], 7_200_000);
    assert_eq!(data["clamped"], true);
}

#[tokio::test(start_paused = true)]
async fn cancellation_interrupts_sleep() {
    let action = DelayAction::new();
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        trigger.cancel();
    });

    let start = tokio::time::Instant::now();
    let err = run_with_cancel(&action, &context(), json!({"duration": 60, "unit": "s"}), cancel)
        .await
        .unwrap_err();
    assert_eq!(err, ActionError::Aborted);
    assert!(start.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn rejects_negative_duration() {
    let err = run(&DelayAction::new(), &context(), json!({"duration": -5}))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "CONFIG_ERROR");
}

#[test]
fn default_timeout_exceeds_hard_ceiling() {
    assert!(DelayAction::new().default_timeout() > Duration::from_millis(HARD_MAX_DELAY_MS));
}
