//! Cron command specs
//!
//! Verify validation, descriptions, and run-time listings.

use crate::prelude::*;

#[test]
fn valid_expression_passes() {
    cli()
        .args(&["cron", "validate", "*/15 9-17 * * 1-5"])
        .passes()
        .stdout_eq("valid\n");
}

#[test]
fn out_of_range_expression_fails_with_reason() {
    cli()
        .args(&["cron", "validate", "61 * * * *"])
        .fails()
        .code_is(1)
        .stdout_has("invalid: ")
        .stdout_has("minute");
}

#[test]
fn validate_as_json() {
    let run = cli()
        .args(&["cron", "validate", "* * *", "--format", "json"])
        .fails();
    let json = run.json();
    assert_eq!(json["valid"], false);
    assert!(json["error"].as_str().unwrap().contains("expected 5 fields"));
}

#[test]
fn describe_common_idioms() {
    cli()
        .args(&["cron", "describe", "*/5 * * * *"])
        .passes()
        .stdout_eq("Every 5 minutes\n");
    cli()
        .args(&["cron", "describe", "0 9 * * 1-5"])
        .passes()
        .stdout_eq("Weekdays at 9:00\n");
    cli()
        .args(&["cron", "describe", "7 7 7 7 *"])
        .passes()
        .stdout_eq("7 7 7 7 *\n");
}

#[test]
fn next_lists_run_times_from_a_given_instant() {
    cli()
        .args(&[
            "cron",
            "next",
            "*/15 * * * *",
            "-n",
            "3",
            "--from",
            "2026-03-01T10:03:00Z",
        ])
        .passes()
        .stdout_eq("2026-03-01T10:15:00Z\n2026-03-01T10:30:00Z\n2026-03-01T10:45:00Z\n");
}

#[test]
fn next_rejects_invalid_expression() {
    cli()
        .args(&["cron", "next", "banana"])
        .fails()
        .stderr_has("Invalid cron expression 'banana'");
}
