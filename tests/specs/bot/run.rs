//! Bot run specs
//!
//! Verify `botwork run` executes a bot and reports the result as JSON.

use crate::prelude::*;

#[test]
fn completed_run_prints_result() {
    let project = Project::empty();
    project.file("waiter.json", WAIT_BOT);

    let run = project.botwork().args(&["run", "waiter.json"]).passes();
    let json = run.json();
    assert_eq!(json["status"], "COMPLETED");
    assert_eq!(json["botId"], "waiter");
    assert_eq!(json["triggerType"], "manual");
    assert_eq!(json["actionResults"][0]["actionId"], "wait");
    assert_eq!(json["output"]["successCount"], 1);
}

#[test]
fn trigger_data_reaches_the_actions() {
    let project = Project::empty();
    project.file("greeter.json", GREETER_BOT);

    let run = project
        .botwork()
        .args(&["run", "greeter.json", "--data", r#"{"user":"ada"}"#])
        .passes();
    assert_eq!(run.json()["output"]["result"], "Hello ada");
}

#[test]
fn variables_are_set_from_the_command_line() {
    let project = Project::empty();
    project.file(
        "vars.json",
        r#"{
          "id": "vars",
          "name": "Vars",
          "actions": [
            {
              "id": "say",
              "type": "transform",
              "name": "Say",
              "config": { "transformType": "template", "template": "{{greeting}}" }
            }
          ]
        }"#,
    );

    let run = project
        .botwork()
        .args(&["run", "vars.json", "--var", "greeting=hi"])
        .passes();
    assert_eq!(run.json()["output"]["result"], "hi");
}

#[test]
fn failed_run_exits_non_zero_with_result() {
    let project = Project::empty();
    project.file(
        "fail.json",
        r#"{
          "id": "fail",
          "name": "Fail",
          "actions": [
            {
              "id": "parse",
              "type": "transform",
              "name": "Parse",
              "config": { "transformType": "template", "template": "oops", "parseJson": true }
            }
          ]
        }"#,
    );

    let run = project.botwork().args(&["run", "fail.json"]).fails().code_is(1);
    let json = run.json();
    assert_eq!(json["status"], "FAILED");
    assert_eq!(json["actionResults"][0]["status"], "FAILED");
}

#[test]
fn invalid_bot_is_not_run() {
    let project = Project::empty();
    project.file("broken.json", BROKEN_BOT);
    project
        .botwork()
        .args(&["run", "broken.json"])
        .fails()
        .stderr_has("Bot 'broken' failed validation");
}
