//! Bot validation specs
//!
//! Verify `botwork validate` reports problems without running anything.

use crate::prelude::*;

#[test]
fn valid_bot_passes() {
    let project = Project::empty();
    project.file("waiter.json", WAIT_BOT);
    project
        .botwork()
        .args(&["validate", "waiter.json"])
        .passes()
        .stdout_eq("waiter.json: valid (waiter)\n");
}

#[test]
fn toml_bot_passes() {
    let project = Project::empty();
    project.file("bots/new-year.toml", NEW_YEAR_BOT);
    project
        .botwork()
        .args(&["validate", "bots/new-year.toml"])
        .passes()
        .stdout_has("valid (new-year)");
}

#[test]
fn every_problem_is_listed() {
    let project = Project::empty();
    project.file("broken.json", BROKEN_BOT);
    project
        .botwork()
        .args(&["validate", "broken.json"])
        .fails()
        .code_is(1)
        .stdout_has("broken.json: invalid (broken)")
        .stdout_has("  error: Duplicate action id: a")
        .stdout_has("  error: Action a: No handler registered for action type: sms");
}

#[test]
fn one_bad_file_fails_the_batch() {
    let project = Project::empty();
    project.file("waiter.json", WAIT_BOT);
    let run = project
        .botwork()
        .args(&["validate", "waiter.json", "missing.json", "--format", "json"])
        .fails();
    let json = run.json();
    assert_eq!(json[0]["valid"], true);
    assert_eq!(json[1]["valid"], false);
    assert!(json[1].get("botId").is_none());
}
