// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine configuration and executor wiring shared by the commands

use anyhow::{Context, Result};
use botwork_actions::{register_builtin_actions, ActionRegistry, ReqwestHttpClient, TracedHttpClient};
use botwork_core::{EngineConfig, EnvSecretSource, ExecutorSettings};
use botwork_engine::BotExecutor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Picked up from the working directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "botwork.toml";

/// Explicit path, else `./botwork.toml` when present, else defaults
pub fn load_config(explicit: Option<&Path>) -> Result<EngineConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let local = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !local.is_file() {
                tracing::debug!("no engine config file, using defaults");
                return Ok(EngineConfig::default());
            }
            local
        }
    };
    let config = EngineConfig::load(&path)
        .with_context(|| format!("loading engine config from {}", path.display()))?;
    tracing::debug!(path = %path.display(), "engine config loaded");
    Ok(config)
}

/// Registry with every built-in action, talking HTTP through a traced client
pub fn registry() -> Result<ActionRegistry> {
    let client = TracedHttpClient::new(ReqwestHttpClient::new()?);
    let registry = ActionRegistry::new();
    let outcome = register_builtin_actions(&registry, client);
    for (action_type, error) in &outcome.failed {
        tracing::warn!(%action_type, %error, "built-in action not registered");
    }
    Ok(registry)
}

/// Executor resolving `{{secrets.NAME}}` from `BOTWORK_SECRET_NAME`
pub fn executor(settings: ExecutorSettings) -> Result<BotExecutor> {
    Ok(BotExecutor::new(Arc::new(registry()?), settings)
        .with_secret_source(Arc::new(EnvSecretSource::new())))
}
