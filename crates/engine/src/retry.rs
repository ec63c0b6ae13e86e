// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Exponential backoff between action attempts

use botwork_core::{BotConfig, RetryConfig, RetryOverride};
use rand::Rng;
use std::time::Duration;

/// Largest relative perturbation applied when jitter is on
pub const JITTER_FRACTION: f64 = 0.125;

/// Delay before retry number `attempt` (1-based)
///
/// `min(initial * multiplier^(attempt-1), max)`, then perturbed uniformly by
/// up to ±12.5% when jitter is enabled. Never negative.
pub fn calculate_retry_delay(attempt: u32, config: &RetryConfig, rng: &mut impl Rng) -> Duration {
    let exponent = i32::try_from(attempt.saturating_sub(1)).unwrap_or(i32::MAX);
    let initial = config.initial_delay.as_millis() as f64;
    let ceiling = config.max_delay.as_millis() as f64;
    let delay = (initial * config.backoff_multiplier.powi(exponent)).min(ceiling);

    let delay = if config.jitter && delay > 0.0 {
        let spread = delay * JITTER_FRACTION;
        delay + rng.gen_range(-spread..=spread)
    } else {
        delay
    };

    if delay.is_finite() {
        Duration::from_millis(delay.max(0.0).round() as u64)
    } else {
        config.max_delay
    }
}

/// Merge retry layers: action > execution > bot > engine default
pub fn merged_retry_config(
    defaults: &RetryConfig,
    bot: &BotConfig,
    execution: Option<&RetryOverride>,
    action: Option<&RetryOverride>,
) -> RetryConfig {
    let bot_layer = bot.settings.as_ref().and_then(|s| s.retry.as_ref());
    defaults.apply(bot_layer).apply(execution).apply(action)
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
