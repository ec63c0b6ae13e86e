// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine configuration file
//!
//! ```toml
//! [executor]
//! execution_timeout = "5m"
//! allow_env = false
//!
//! [executor.retry]
//! max_retries = 3
//! initial_delay = "1s"
//!
//! [scheduler]
//! check_interval = "1m"
//! max_concurrent = 5
//! ```

use crate::bot::RetryOverride;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Retry policy for failed actions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetryConfig {
    pub max_retries: u32,
    #[serde(with = "humantime_serde")]
    pub initial_delay: Duration,
    pub backoff_multiplier: f64,
    #[serde(with = "humantime_serde")]
    pub max_delay: Duration,
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(1),
            backoff_multiplier: 2.0,
            max_delay: Duration::from_secs(30),
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// Never retry
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Layer a partial override on top of this config
    pub fn apply(&self, patch: Option<&RetryOverride>) -> Self {
        let Some(patch) = patch else {
            return self.clone();
        };
        Self {
            max_retries: patch.max_retries.unwrap_or(self.max_retries),
            initial_delay: patch
                .initial_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(self.initial_delay),
            backoff_multiplier: patch.backoff_multiplier.unwrap_or(self.backoff_multiplier),
            max_delay: patch
                .max_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(self.max_delay),
            jitter: patch.jitter.unwrap_or(self.jitter),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExecutorSettings {
    /// Deadline for a whole run
    #[serde(with = "humantime_serde")]
    pub execution_timeout: Duration,
    /// Overrides every plugin's own default timeout when set
    #[serde(with = "humantime_serde", skip_serializing_if = "Option::is_none")]
    pub default_action_timeout: Option<Duration>,
    /// Capacity guard for `try_execute`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_concurrent_runs: Option<usize>,
    /// Whether `{{env.NAME}}` may read the process environment
    pub allow_env: bool,
    /// Attach a redacted context snapshot to each result
    pub include_snapshot: bool,
    pub retry: RetryConfig,
}

impl Default for ExecutorSettings {
    fn default() -> Self {
        Self {
            execution_timeout: Duration::from_secs(5 * 60),
            default_action_timeout: None,
            max_concurrent_runs: None,
            allow_env: false,
            include_snapshot: true,
            retry: RetryConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchedulerSettings {
    #[serde(with = "humantime_serde")]
    pub check_interval: Duration,
    /// Upper bound on concurrently executing scheduled runs
    pub max_concurrent: usize,
    /// Attempts per queued job before it is dropped as failed
    pub max_attempts: u32,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            check_interval: Duration::from_secs(60),
            max_concurrent: 5,
            max_attempts: 3,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub executor: ExecutorSettings,
    pub scheduler: SchedulerSettings,
}

impl EngineConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let retry = &self.executor.retry;
        if !retry.backoff_multiplier.is_finite() || retry.backoff_multiplier < 1.0 {
            return Err(ConfigError::Invalid {
                field: "executor.retry.backoff_multiplier",
                reason: format!("must be >= 1.0, got {}", retry.backoff_multiplier),
            });
        }
        if retry.max_delay < retry.initial_delay {
            return Err(ConfigError::Invalid {
                field: "executor.retry.max_delay",
                reason: "must not be shorter than initial_delay".to_string(),
            });
        }
        if self.executor.execution_timeout.is_zero() {
            return Err(ConfigError::Invalid {
                field: "executor.execution_timeout",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.executor.max_concurrent_runs == Some(0) {
            return Err(ConfigError::Invalid {
                field: "executor.max_concurrent_runs",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.scheduler.max_concurrent == 0 {
            return Err(ConfigError::Invalid {
                field: "scheduler.max_concurrent",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.scheduler.max_attempts == 0 {
            return Err(ConfigError::Invalid {
                field: "scheduler.max_attempts",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.scheduler.check_interval.is_zero() {
            return Err(ConfigError::Invalid {
                field: "scheduler.check_interval",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
