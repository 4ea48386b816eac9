//! Tests for the `check` command.

use predicates::prelude::*;

use super::helpers::{fixture_path, json_output, lendpool_cmd};

#[test]
fn test_check_valid_config_table() {
    lendpool_cmd()
        .args(["check", &fixture_path("valid_config.toml")])
        .assert()
        .success()
        .stdout(predicate::str::contains("Risk Parameters"))
        .stdout(predicate::str::contains("70.00%"))
        .stdout(predicate::str::contains("10.00% per year"))
        .stdout(predicate::str::contains("Config is valid"));
}

#[test]
fn test_check_valid_config_json() {
    let json = json_output(lendpool_cmd().args([
        "check",
        &fixture_path("valid_config.toml"),
        "--format",
        "json",
    ]));

    assert_eq!(json["config"]["risk"]["ltv_bps"], 7000);
    assert_eq!(json["config"]["single_deposit_slot"], true);
    assert_eq!(json["config"]["paused"], false);
    assert_eq!(json["ltv_percent"], "70.00");
    assert_eq!(json["liquidation_penalty_percent"], "5.00");
}

#[test]
fn test_check_rejects_out_of_bounds_ltv() {
    lendpool_cmd()
        .args(["check", &fixture_path("invalid_config.toml")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid pool config"))
        .stderr(predicate::str::contains("ltv_bps"));
}

#[test]
fn test_check_missing_file() {
    lendpool_cmd()
        .args(["check", &fixture_path("does_not_exist.toml")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does_not_exist.toml"));
}

#[test]
fn test_check_rejects_scenario_file() {
    lendpool_cmd()
        .args(["check", &fixture_path("lifecycle.toml")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid pool config"));
}
