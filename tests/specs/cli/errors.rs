//! CLI error specs
//!
//! Verify failures are reported on stderr with a non-zero exit.

use crate::prelude::*;

#[test]
fn unknown_command_fails() {
    cli().args(&["launch"]).fails().code_is(2);
}

#[test]
fn missing_bot_file_is_explained() {
    let project = Project::empty();
    project
        .botwork()
        .args(&["run", "nope.json"])
        .fails()
        .stderr_has("Cannot read bot file 'nope.json'");
}

#[test]
fn malformed_bot_file_is_explained() {
    let project = Project::empty();
    project.file("bad.json", "{ \"id\": ");
    project
        .botwork()
        .args(&["run", "bad.json"])
        .fails()
        .stderr_has("is not a valid bot")
        .stderr_has("suggestions:");
}

#[test]
fn invalid_engine_config_is_reported() {
    let project = Project::empty();
    project.file("bot.json", WAIT_BOT);
    project.file("botwork.toml", "[executor]\nno_such_key = 1\n");
    project
        .botwork()
        .args(&["run", "bot.json"])
        .fails()
        .stderr_has("botwork.toml");
}
