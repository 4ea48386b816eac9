//! CLI argument validation tests.
//!
//! These tests verify that the CLI properly validates arguments and provides
//! helpful error messages.

use predicates::prelude::*;

use super::helpers::{fixture_path, lendpool_cmd};

#[test]
fn test_help_output() {
    lendpool_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("lendpool"))
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("--log-level"));
}

#[test]
fn test_run_help_output() {
    lendpool_cmd()
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--fail-fast"))
        .stdout(predicate::str::contains("SCENARIO"));
}

#[test]
fn test_invalid_command() {
    lendpool_cmd()
        .arg("invalid_command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_check_missing_config() {
    lendpool_cmd()
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}

#[test]
fn test_run_missing_scenario() {
    lendpool_cmd()
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}

#[test]
fn test_invalid_output_format() {
    lendpool_cmd()
        .args([
            "run",
            &fixture_path("lifecycle.toml"),
            "--format",
            "invalid_format",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}
