//! Actions listing specs
//!
//! Verify every built-in action type is available.

use crate::prelude::*;

#[test]
fn lists_builtin_actions_in_type_order() {
    let run = cli().args(&["actions"]).passes();
    let types: Vec<&str> = run
        .stdout
        .lines()
        .skip(1)
        .filter_map(|line| line.split_whitespace().next())
        .collect();
    assert_eq!(
        types,
        vec!["delay", "discord", "email", "filter", "http", "slack", "transform", "webhook"]
    );
}

#[test]
fn lists_actions_as_json() {
    let run = cli().args(&["actions", "--format", "json"]).passes();
    let json = run.json();
    let entries = json.as_array().unwrap();
    assert_eq!(entries.len(), 8);
    let http = entries
        .iter()
        .find(|e| e["actionType"] == "http")
        .unwrap();
    assert_eq!(http["name"], "HTTP Request");
    assert_eq!(http["enabled"], true);
}
