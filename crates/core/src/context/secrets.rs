// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Where secret values come from
//!
//! The engine never decides how secrets are stored; it only asks a
//! `SecretSource` by name when a plugin or a `{{secrets.NAME}}` needs one.

use std::collections::HashMap;

pub trait SecretSource: Send + Sync {
    fn get(&self, name: &str) -> Option<String>;
}

/// Reads `BOTWORK_SECRET_<NAME>` from the process environment
#[derive(Debug, Clone)]
pub struct EnvSecretSource {
    prefix: String,
}

impl EnvSecretSource {
    pub const DEFAULT_PREFIX: &'static str = "BOTWORK_SECRET_";

    pub fn new() -> Self {
        Self::with_prefix(Self::DEFAULT_PREFIX)
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    fn var_name(&self, name: &str) -> String {
        let normalized: String = name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
            .collect();
        format!("{}{}", self.prefix, normalized)
    }
}

impl Default for EnvSecretSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretSource for EnvSecretSource {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(self.var_name(name)).ok()
    }
}

/// In-memory source, mostly for tests and embedding
#[derive(Debug, Clone, Default)]
pub struct MapSecretSource {
    secrets: HashMap<String, String>,
}

impl MapSecretSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.secrets.insert(name.into(), value.into());
        self
    }
}

impl SecretSource for MapSecretSource {
    fn get(&self, name: &str) -> Option<String> {
        self.secrets.get(name).cloned()
    }
}

#[cfg(test)]
#[path = "secrets_tests.rs"]
mod tests;
