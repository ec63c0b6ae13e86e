//! CLI help specs
//!
//! Verify the top-level command surface.

use crate::prelude::*;

#[test]
fn help_lists_every_command() {
    let run = cli().args(&["--help"]).passes();
    for command in ["run", "validate", "cron", "actions", "schedule"] {
        assert!(run.stdout.contains(command), "missing {command}");
    }
}

#[test]
fn version_prints_the_binary_name() {
    cli().args(&["--version"]).passes().stdout_has("botwork ");
}

#[test]
fn cron_help_lists_subcommands() {
    cli()
        .args(&["cron", "--help"])
        .passes()
        .stdout_has("validate")
        .stdout_has("describe")
        .stdout_has("next");
}
