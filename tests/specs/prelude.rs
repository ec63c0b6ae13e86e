//! Shared helpers for the CLI specs

#![allow(dead_code)]

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A bot that only waits; runs offline and always completes
pub const WAIT_BOT: &str = r#"{
  "id": "waiter",
  "name": "Waiter",
  "actions": [
    { "id": "wait", "type": "delay", "name": "Wait", "order": 0, "config": { "duration": 5 } }
  ]
}"#;

/// Greets the user named in the trigger data
pub const GREETER_BOT: &str = r#"{
  "id": "greeter",
  "name": "Greeter",
  "actions": [
    {
      "id": "greet",
      "type": "transform",
      "name": "Greet",
      "order": 0,
      "config": { "transformType": "template", "template": "Hello {{trigger.user}}" }
    }
  ]
}"#;

/// Fails on its first action because the transform type does not exist
pub const BROKEN_BOT: &str = r#"{
  "id": "broken",
  "name": "Broken",
  "actions": [
    { "id": "a", "type": "transform", "name": "A", "order": 0, "config": { "transformType": "reverse" } },
    { "id": "a", "type": "sms", "name": "B", "order": 1 }
  ]
}"#;

/// Scheduled once, far in the future, so listings are stable
pub const NEW_YEAR_BOT: &str = r#"
id = "new-year"
name = "New Year"

[schedule]
runAt = "2099-01-01T00:00:00Z"

[[actions]]
id = "wait"
type = "delay"
name = "Wait"
config = { duration = 5 }
"#;

/// Temporary working directory for one spec
pub struct Project {
    dir: TempDir,
}

impl Project {
    pub fn empty() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file relative to the project root, creating directories
    pub fn file(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
        path
    }

    pub fn botwork(&self) -> CliBuilder {
        CliBuilder::new(Some(self.dir.path()))
    }
}

/// Run the CLI outside any project
pub fn cli() -> CliBuilder {
    CliBuilder::new(None)
}

pub struct CliBuilder {
    cmd: Command,
}

impl CliBuilder {
    fn new(dir: Option<&Path>) -> Self {
        let mut cmd = Command::cargo_bin("botwork").unwrap();
        cmd.env_remove("BOTWORK_CONFIG").env("RUST_LOG", "warn");
        if let Some(dir) = dir {
            cmd.current_dir(dir);
        }
        Self { cmd }
    }

    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.cmd.env(key, value);
        self
    }

    pub fn passes(mut self) -> RunAssert {
        let output = self.cmd.output().unwrap();
        let run = RunAssert::from(output);
        assert!(
            run.code == Some(0),
            "expected success, got {:?}\nstdout:\n{}\nstderr:\n{}",
            run.code,
            run.stdout,
            run.stderr
        );
        run
    }

    pub fn fails(mut self) -> RunAssert {
        let output = self.cmd.output().unwrap();
        let run = RunAssert::from(output);
        assert!(
            run.code != Some(0),
            "expected failure\nstdout:\n{}\nstderr:\n{}",
            run.stdout,
            run.stderr
        );
        run
    }
}

pub struct RunAssert {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl From<std::process::Output> for RunAssert {
    fn from(output: std::process::Output) -> Self {
        Self {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

impl RunAssert {
    pub fn code_is(self, code: i32) -> Self {
        assert_eq!(self.code, Some(code), "stderr:\n{}", self.stderr);
        self
    }

    pub fn stdout_eq(self, expected: &str) -> Self {
        similar_asserts::assert_eq!(self.stdout, expected);
        self
    }

    pub fn stdout_has(self, needle: &str) -> Self {
        assert!(
            self.stdout.contains(needle),
            "stdout missing {needle:?}:\n{}",
            self.stdout
        );
        self
    }

    pub fn stderr_has(self, needle: &str) -> Self {
        assert!(
            self.stderr.contains(needle),
            "stderr missing {needle:?}:\n{}",
            self.stderr
        );
        self
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.stdout).unwrap()
    }
}
