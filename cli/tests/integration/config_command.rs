//! Integration tests for `lambda-efs config`.
//!
//! Every test points `LAMBDA_EFS_CONFIG` at a file inside a temp dir so the
//! working directory is never touched.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

struct Project {
    dir: TempDir,
}

impl Project {
    fn new() -> Self {
        Self {
            dir: TempDir::new().expect("temp dir"),
        }
    }

    fn config_path(&self) -> PathBuf {
        self.dir.path().join("lambda-efs.yaml")
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("lambda-efs"));
        cmd.current_dir(self.dir.path())
            .env("NO_COLOR", "1")
            .env("LAMBDA_EFS_CONFIG", self.config_path());
        cmd
    }
}

#[test]
fn test_config_show_displays_defaults() {
    let project = Project::new();
    project
        .cmd()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("stack.name:"))
        .stdout(predicate::str::contains("LambdaEfsStack"))
        .stdout(predicate::str::contains("stack.variant:"))
        .stdout(predicate::str::contains("mounted"))
        .stdout(predicate::str::contains("LAMBDA_EFS_CONFIG"));
}

#[test]
fn test_config_show_does_not_create_file() {
    let project = Project::new();
    project.cmd().args(["config", "show"]).assert().success();
    assert!(!project.config_path().exists());
}

#[test]
fn test_config_show_json_reports_path_and_values() {
    let project = Project::new();
    let output = project
        .cmd()
        .args(["config", "show", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let v: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(v["config"]["stack"]["name"], "LambdaEfsStack");
    assert_eq!(v["config"]["stack"]["variant"], "mounted");
    assert!(
        v["path"]
            .as_str()
            .unwrap()
            .ends_with("lambda-efs.yaml")
    );
}

#[test]
fn test_config_set_persists_value() {
    let project = Project::new();
    project
        .cmd()
        .args(["config", "set", "stack.variant", "compute-only"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Set stack.variant = compute-only"));

    let saved = std::fs::read_to_string(project.config_path()).expect("config written");
    assert!(saved.contains("compute-only"), "{saved}");

    project
        .cmd()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("compute-only"));
}

#[test]
fn test_config_set_variant_changes_graph() {
    let project = Project::new();
    project
        .cmd()
        .args(["config", "set", "stack.variant", "compute-only"])
        .assert()
        .success();

    project
        .cmd()
        .arg("graph")
        .assert()
        .success()
        .stdout(predicate::str::contains("(compute-only)"))
        .stdout(predicate::str::contains("no mount"));
}

#[test]
fn test_config_set_unknown_key_fails() {
    let project = Project::new();
    project
        .cmd()
        .args(["config", "set", "security.level", "strict"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unknown setting: security.level"));
    assert!(!project.config_path().exists());
}

#[test]
fn test_config_set_invalid_value_fails() {
    let project = Project::new();
    project
        .cmd()
        .args(["config", "set", "stack.variant", "sideways"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid value for stack.variant"));
}

#[test]
fn test_config_set_error_json_has_code() {
    let project = Project::new();
    let output = project
        .cmd()
        .args(["config", "set", "security.level", "strict", "--json"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let v: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(v["error"], true);
    assert_eq!(v["code"], "INVALID_CONFIG");
}

#[test]
fn test_malformed_config_file_is_reported() {
    let project = Project::new();
    std::fs::write(project.config_path(), "stack: [not, a, map").unwrap();
    project
        .cmd()
        .args(["config", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("lambda-efs.yaml"));
}
