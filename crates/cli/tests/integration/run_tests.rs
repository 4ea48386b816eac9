//! Tests for the `run` command.

use predicates::prelude::*;

use super::helpers::{fixture_path, json_output, lendpool_cmd};

#[test]
fn test_run_lifecycle_table() {
    lendpool_cmd()
        .args(["run", &fixture_path("lifecycle.toml")])
        .assert()
        .success()
        .stdout(predicate::str::contains("bob borrowed 700 posting 10 collateral"))
        .stdout(predicate::str::contains("bob repaid 770"))
        .stdout(predicate::str::contains("alice withdrew 10000 plus 70 yield"))
        .stdout(predicate::str::contains("Total Borrows:    0"))
        .stdout(predicate::str::contains("rejected").not());
}

#[test]
fn test_run_lifecycle_json() {
    let json = json_output(lendpool_cmd().args([
        "run",
        &fixture_path("lifecycle.toml"),
        "--format",
        "json",
    ]));

    let steps = json["steps"].as_array().unwrap();
    assert_eq!(steps.len(), 5);
    assert!(steps.iter().all(|s| s["ok"] == true));
    assert_eq!(steps[2]["action"], "advance_time");

    let positions = json["positions"].as_array().unwrap();
    assert_eq!(positions.len(), 2);
    assert_eq!(positions[0]["label"], "alice");
    assert_eq!(positions[1]["label"], "bob");
    assert_eq!(positions[1]["liquidatable"], false);
}

#[test]
fn test_run_liquidation() {
    lendpool_cmd()
        .args(["run", &fixture_path("liquidation.toml")])
        .assert()
        .success()
        .stdout(predicate::str::contains("cannot be liquidated"))
        .stdout(predicate::str::contains(
            "carol cleared 700 of bob's debt for 665, seized 10 collateral",
        ))
        .stdout(predicate::str::contains("1 of 5 steps rejected"));
}

#[test]
fn test_run_rejected_step_without_fail_fast() {
    lendpool_cmd()
        .args(["run", &fixture_path("paused.toml")])
        .assert()
        .success()
        .stdout(predicate::str::contains("Pool is paused"))
        .stdout(predicate::str::contains("ltv 6000"));
}

#[test]
fn test_run_fail_fast() {
    lendpool_cmd()
        .args(["run", &fixture_path("paused.toml"), "--fail-fast"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Step 2 (deposit) failed: Pool is paused"))
        .stdout(predicate::str::contains("ltv 6000").not());
}

#[test]
fn test_run_malformed_scenario() {
    lendpool_cmd()
        .args(["run", &fixture_path("malformed.toml")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load scenario"));
}

#[test]
fn test_run_logs_to_stderr() {
    lendpool_cmd()
        .args([
            "run",
            &fixture_path("lifecycle.toml"),
            "--format",
            "json",
            "--log-level",
            "info",
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("deposit"))
        .stdout(predicate::str::starts_with("{"));
}
