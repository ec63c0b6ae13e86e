// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Registry mapping action types to plugin instances
//!
//! Registration happens at startup; lookups happen on every action. A
//! disabled plugin stays registered but `get` stops returning it.

use crate::action::Action;
use crate::error::RegistryError;
use crate::schema::ValidationResult;
use botwork_core::ActionType;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone)]
pub struct RegisterOptions {
    /// Replace an existing registration instead of failing
    pub override_existing: bool,
    pub enabled: bool,
    pub metadata: Map<String, Value>,
}

impl Default for RegisterOptions {
    fn default() -> Self {
        Self {
            override_existing: false,
            enabled: true,
            metadata: Map::new(),
        }
    }
}

impl RegisterOptions {
    pub fn override_existing() -> Self {
        Self {
            override_existing: true,
            ..Self::default()
        }
    }
}

/// Outcome of [`ActionRegistry::register_bulk`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkRegistration {
    pub registered: Vec<ActionType>,
    pub failed: Vec<(ActionType, String)>,
}

impl BulkRegistration {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Listing entry for administrative views
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredAction {
    pub action_type: ActionType,
    pub name: String,
    pub description: String,
    pub enabled: bool,
    pub metadata: Map<String, Value>,
    pub aliases: Vec<String>,
}

struct Entry {
    action: Arc<dyn Action>,
    enabled: bool,
    metadata: Map<String, Value>,
}

#[derive(Default)]
struct Inner {
    entries: HashMap<ActionType, Entry>,
    aliases: HashMap<String, ActionType>,
}

impl Inner {
    fn resolve(&self, action_type: &ActionType) -> Option<&Entry> {
        self.entries.get(action_type).or_else(|| {
            let target = self.aliases.get(action_type.as_str())?;
            self.entries.get(target)
        })
    }

    fn resolve_key(&self, action_type: &ActionType) -> Option<ActionType> {
        if self.entries.contains_key(action_type) {
            return Some(action_type.clone());
        }
        self.aliases.get(action_type.as_str()).cloned()
    }
}

#[derive(Default)]
pub struct ActionRegistry {
    inner: RwLock<Inner>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &self,
        action: Arc<dyn Action>,
        options: RegisterOptions,
    ) -> Result<(), RegistryError> {
        let action_type = action.action_type();
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        if inner.entries.contains_key(&action_type) && !options.override_existing {
            return Err(RegistryError::AlreadyRegistered(action_type));
        }
        if inner.aliases.contains_key(action_type.as_str()) {
            return Err(RegistryError::AliasConflict(action_type.to_string()));
        }
        tracing::debug!(action_type = %action_type, name = action.name(), "registered action");
        inner.entries.insert(
            action_type,
            Entry {
                action,
                enabled: options.enabled,
                metadata: options.metadata,
            },
        );
        Ok(())
    }

    /// Register many plugins, collecting failures instead of stopping
    pub fn register_bulk(
        &self,
        actions: Vec<Arc<dyn Action>>,
        options: RegisterOptions,
    ) -> BulkRegistration {
        let mut outcome = BulkRegistration::default();
        for action in actions {
            let action_type = action.action_type();
            match self.register(action, options.clone()) {
                Ok(()) => outcome.registered.push(action_type),
                Err(e) => {
                    tracing::warn!(action_type = %action_type, error = %e, "registration failed");
                    outcome.failed.push((action_type, e.to_string()));
                }
            }
        }
        outcome
    }

    pub fn unregister(&self, action_type: &ActionType) -> Result<Arc<dyn Action>, RegistryError> {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        let entry = inner
            .entries
            .remove(action_type)
            .ok_or_else(|| RegistryError::NotRegistered(action_type.to_string()))?;
        inner.aliases.retain(|_, target| target != action_type);
        Ok(entry.action)
    }

    /// Make `alias` resolve to an already registered type
    pub fn alias(&self, alias: &str, target: &ActionType) -> Result<(), RegistryError> {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        if !inner.entries.contains_key(target) {
            return Err(RegistryError::NotRegistered(target.to_string()));
        }
        if inner.entries.contains_key(&ActionType::from(alias)) {
            return Err(RegistryError::AliasConflict(alias.to_string()));
        }
        inner.aliases.insert(alias.to_string(), target.clone());
        Ok(())
    }

    /// The plugin, only if enabled
    pub fn get(&self, action_type: &ActionType) -> Option<Arc<dyn Action>> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner
            .resolve(action_type)
            .filter(|e| e.enabled)
            .map(|e| Arc::clone(&e.action))
    }

    /// The plugin regardless of enabled state
    pub fn get_any(&self, action_type: &ActionType) -> Option<Arc<dyn Action>> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner.resolve(action_type).map(|e| Arc::clone(&e.action))
    }

    pub fn has(&self, action_type: &ActionType) -> bool {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner.resolve(action_type).is_some()
    }

    pub fn is_enabled(&self, action_type: &ActionType) -> bool {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner.resolve(action_type).is_some_and(|e| e.enabled)
    }

    pub fn enable(&self, action_type: &ActionType) -> Result<(), RegistryError> {
        self.set_enabled(action_type, true)
    }

    pub fn disable(&self, action_type: &ActionType) -> Result<(), RegistryError> {
        self.set_enabled(action_type, false)
    }

    fn set_enabled(&self, action_type: &ActionType, enabled: bool) -> Result<(), RegistryError> {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        let key = inner
            .resolve_key(action_type)
            .ok_or_else(|| RegistryError::NotRegistered(action_type.to_string()))?;
        if let Some(entry) = inner.entries.get_mut(&key) {
            entry.enabled = enabled;
        }
        tracing::info!(action_type = %key, enabled, "action availability changed");
        Ok(())
    }

    /// Delegate to the plugin's own validation; never fails
    pub fn validate_config(
        &self,
        action_type: &ActionType,
        config: &Map<String, Value>,
    ) -> ValidationResult {
        match self.get_any(action_type) {
            Some(action) => action.validate(config),
            None => ValidationResult::invalid(
                RegistryError::NotRegistered(action_type.to_string()).to_string(),
            ),
        }
    }

    /// Registered types, sorted by name
    pub fn registered_types(&self) -> Vec<ActionType> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        let mut types: Vec<ActionType> = inner.entries.keys().cloned().collect();
        types.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        types
    }

    pub fn list(&self) -> Vec<RegisteredAction> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        let mut listed: Vec<RegisteredAction> = inner
            .entries
            .iter()
            .map(|(action_type, entry)| {
                let mut aliases: Vec<String> = inner
                    .aliases
                    .iter()
                    .filter(|(_, target)| *target == action_type)
                    .map(|(alias, _)| alias.clone())
                    .collect();
                aliases.sort();
                RegisteredAction {
                    action_type: action_type.clone(),
                    name: entry.action.name().to_string(),
                    description: entry.action.description().to_string(),
                    enabled: entry.enabled,
                    metadata: entry.metadata.clone(),
                    aliases,
                }
            })
            .collect();
        listed.sort_by(|a, b| a.action_type.as_str().cmp(b.action_type.as_str()));
        listed
    }

    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .entries
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
