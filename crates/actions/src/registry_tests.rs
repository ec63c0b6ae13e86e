// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::action::{ActionInput, ActionOutput};
use crate::error::ActionError;
use crate::schema::{ConfigSchema, FieldSpec, FieldType};
use async_trait::async_trait;
use serde_json::json;

struct EchoAction {
    action_type: ActionType,
    schema: ConfigSchema,
}

impl EchoAction {
    fn new(action_type: &str) -> Arc<dyn Action> {
        Arc::new(Self {
            action_type: ActionType::from(action_type),
            schema: ConfigSchema::new().field(FieldSpec::required("message", FieldType::String)),
        })
    }
}

#[async_trait]
impl Action for EchoAction {
    fn action_type(&self) -> ActionType {
        self.action_type.clone()
    }

    fn name(&self) -> &str {
        "Echo"
    }

    fn schema(&self) -> &ConfigSchema {
        &self.schema
    }

    async fn execute(&self, input: ActionInput<'_>) -> Result<ActionOutput, ActionError> {
        Ok(ActionOutput::data(json!(input.config.get("message"))))
    }
}

fn echo() -> ActionType {
    ActionType::from("echo")
}

#[test]
fn register_and_get() {
    let registry = ActionRegistry::new();
    registry.register(EchoAction::new("echo"), RegisterOptions::default()).unwrap();

    assert!(registry.has(&echo()));
    assert!(registry.is_enabled(&echo()));
    assert_eq!(registry.get(&echo()).unwrap().name(), "Echo");
    assert_eq!(registry.len(), 1);
}

#[test]
fn duplicate_registration_fails_without_override() {
    let registry = ActionRegistry::new();
    registry.register(EchoAction::new("echo"), RegisterOptions::default()).unwrap();

    let err = registry
        .register(EchoAction::new("echo"), RegisterOptions::default())
        .unwrap_err();
    assert_eq!(err, RegistryError::AlreadyRegistered(echo()));

    registry
        .register(EchoAction::new("echo"), RegisterOptions::override_existing())
        .unwrap();
    assert_eq!(registry.len(), 1);
}

#[test]
fn disabled_plugins_are_hidden_from_get_only() {
    let registry = ActionRegistry::new();
    registry.register(EchoAction::new("echo"), RegisterOptions::default()).unwrap();

    registry.disable(&echo()).unwrap();
    assert!(registry.get(&echo()).is_none());
    assert!(registry.get_any(&echo()).is_some());
    assert!(registry.has(&echo()));
    assert!(!registry.is_enabled(&echo()));

    registry.enable(&echo()).unwrap();
    assert!(registry.get(&echo()).is_some());
}

#[test]
fn register_disabled_from_options() {
    let registry = ActionRegistry::new();
    let options = RegisterOptions {
        enabled: false,
        ..RegisterOptions::default()
    };
    registry.register(EchoAction::new("echo"), options).unwrap();
    assert!(registry.get(&echo()).is_none());
}

#[test]
fn toggling_unknown_type_fails() {
    let registry = ActionRegistry::new();
    assert_eq!(
        registry.disable(&echo()),
        Err(RegistryError::NotRegistered("echo".to_string()))
    );
}

#[test]
fn validate_config_delegates_and_reports_unknown_types() {
    let registry = ActionRegistry::new();
    registry.register(EchoAction::new("echo"), RegisterOptions::default()).unwrap();

    let mut config = Map::new();
    assert!(!registry.validate_config(&echo(), &config).valid);
    config.insert("message".into(), json!("hi"));
    assert!(registry.validate_config(&echo(), &config).valid);

    let result = registry.validate_config(&ActionType::from("nope"), &config);
    assert_eq!(
        result.errors,
        vec!["No handler registered for action type: nope"]
    );
}

#[test]
fn bulk_registration_collects_failures() {
    let registry = ActionRegistry::new();
    let outcome = registry.register_bulk(
        vec![
            EchoAction::new("echo"),
            EchoAction::new("ping"),
            EchoAction::new("echo"),
        ],
        RegisterOptions::default(),
    );
    assert_eq!(outcome.registered, vec![echo(), ActionType::from("ping")]);
    assert_eq!(outcome.failed.len(), 1);
    assert_eq!(outcome.failed[0].0, echo());
    assert!(!outcome.is_complete());
    assert_eq!(registry.len(), 2);
}

#[test]
fn aliases_resolve_to_targets() {
    let registry = ActionRegistry::new();
    registry.register(EchoAction::new("echo"), RegisterOptions::default()).unwrap();
    registry.alias("say", &echo()).unwrap();

    let say = ActionType::from("say");
    assert!(registry.has(&say));
    assert_eq!(registry.get(&say).unwrap().action_type(), echo());

    // Disabling through the alias disables the target
    registry.disable(&say).unwrap();
    assert!(!registry.is_enabled(&echo()));

    assert_eq!(
        registry.alias("x", &ActionType::from("missing")),
        Err(RegistryError::NotRegistered("missing".to_string()))
    );
}

#[test]
fn alias_cannot_shadow_registered_type() {
    let registry = ActionRegistry::new();
    registry.register(EchoAction::new("echo"), RegisterOptions::default()).unwrap();
    registry.register(EchoAction::new("ping"), RegisterOptions::default()).unwrap();
    assert_eq!(
        registry.alias("ping", &echo()),
        Err(RegistryError::AliasConflict("ping".to_string()))
    );
}

#[test]
fn unregister_removes_entry_and_aliases() {
    let registry = ActionRegistry::new();
    registry.register(EchoAction::new("echo"), RegisterOptions::default()).unwrap();
    registry.alias("say", &echo()).unwrap();

    registry.unregister(&echo()).unwrap();
    assert!(!registry.has(&echo()));
    assert!(!registry.has(&ActionType::from("say")));
    assert!(registry.unregister(&echo()).is_err());
}

#[test]
fn list_is_sorted_and_carries_metadata() {
    let registry = ActionRegistry::new();
    let mut metadata = Map::new();
    metadata.insert("version".into(), json!("1.2"));
    registry
        .register(
            EchoAction::new("ping"),
            RegisterOptions {
                metadata,
                ..RegisterOptions::default()
            },
        )
        .unwrap();
    registry.register(EchoAction::new("echo"), RegisterOptions::default()).unwrap();
    registry.alias("say", &echo()).unwrap();

    let listed = registry.list();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].action_type, echo());
    assert_eq!(listed[0].aliases, vec!["say"]);
    assert_eq!(listed[1].metadata["version"], json!("1.2"));
    assert_eq!(
        registry.registered_types(),
        vec![echo(), ActionType::from("ping")]
    );
}
