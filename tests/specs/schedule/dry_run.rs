//! Schedule dry-run specs
//!
//! Verify bots are registered and their upcoming runs listed.

use crate::prelude::*;

#[test]
fn dry_run_lists_upcoming_runs() {
    let project = Project::empty();
    project.file("new-year.toml", NEW_YEAR_BOT);
    project
        .botwork()
        .args(&["schedule", "new-year.toml", "--dry-run"])
        .passes()
        .stdout_eq("2099-01-01T00:00:00Z  new-year         New Year\n");
}

#[test]
fn dry_run_as_json() {
    let project = Project::empty();
    project.file("new-year.toml", NEW_YEAR_BOT);
    let run = project
        .botwork()
        .args(&["schedule", "new-year.toml", "--dry-run", "--format", "json"])
        .passes();
    let json = run.json();
    assert_eq!(json[0]["botId"], "new-year");
    assert_eq!(json[0]["runAt"], "2099-01-01T00:00:00Z");
}

#[test]
fn bot_without_schedule_is_rejected() {
    let project = Project::empty();
    project.file("waiter.json", WAIT_BOT);
    project
        .botwork()
        .args(&["schedule", "waiter.json", "--dry-run"])
        .fails()
        .stderr_has("bot waiter has no schedule");
}
