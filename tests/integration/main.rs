//! Integration tests for the preflight CLI
//!
//! These run the built binary in a temporary working directory and check
//! what lands on stdout, stderr and in the artifacts directory.

use assert_cmd::cargo;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper function to create a preflight command running inside `dir`
fn preflight(dir: &TempDir) -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::new(cargo::cargo_bin!("preflight"));
    cmd.current_dir(dir.path())
        .env_remove("PFLT_LOGFILE")
        .env_remove("PFLT_LOGLEVEL")
        .env_remove("PFLT_ARTIFACTS")
        .env_remove("PFLT_SUBMIT")
        .env_remove("PFLT_ALLOW_LATEST");
    cmd
}

// =============================================================================
// INFORMATIONAL COMMANDS
// =============================================================================

#[test]
fn test_version_command() {
    let temp = TempDir::new().unwrap();
    preflight(&temp)
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("preflight v"));
}

#[test]
fn test_no_command_prints_hints() {
    let temp = TempDir::new().unwrap();
    preflight(&temp)
        .assert()
        .success()
        .stdout(predicate::str::contains("preflight list"));
}

#[test]
fn test_list_shows_builtin_plugin() {
    let temp = TempDir::new().unwrap();
    preflight(&temp)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("check-container"));
}

#[test]
fn test_list_json() {
    let temp = TempDir::new().unwrap();
    let output = preflight(&temp).args(["list", "--json"]).output().unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["plugins"][0]["name"], "check-container");
}

#[test]
fn test_run_unknown_plugin_fails() {
    let temp = TempDir::new().unwrap();
    preflight(&temp).args(["run", "does-not-exist"]).assert().failure();
    assert!(!temp.path().join("artifacts").exists());
}

// =============================================================================
// RUN COMMAND
// =============================================================================

#[test]
fn test_run_container_writes_report_and_log() {
    let temp = TempDir::new().unwrap();
    preflight(&temp)
        .args(["run", "check-container", "quay.io/org/app:1.0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("PASSED  ValidImageReference in"))
        .stdout(predicate::str::contains("PASSED  NoLatestTag in"))
        .stderr(predicate::str::contains("Calling plugin"));

    let report = fs::read_to_string(temp.path().join("artifacts/results.txt")).unwrap();
    assert_eq!(report.lines().count(), 3);
    let log = fs::read_to_string(temp.path().join("preflight.log")).unwrap();
    assert!(log.contains("name=check-container"));
}

#[test]
fn test_run_with_custom_locations() {
    let temp = TempDir::new().unwrap();
    preflight(&temp)
        .args([
            "run",
            "check-container",
            "--artifacts",
            "out",
            "--logfile",
            "run.log",
            "quay.io/org/app:1.0",
        ])
        .assert()
        .success();

    assert!(temp.path().join("out/results.txt").exists());
    assert!(temp.path().join("run.log").exists());
    assert!(!temp.path().join("artifacts").exists());
}

#[test]
fn test_artifacts_from_environment() {
    let temp = TempDir::new().unwrap();
    preflight(&temp)
        .env("PFLT_ARTIFACTS", "env-out")
        .args(["run", "check-container", "quay.io/org/app:1.0"])
        .assert()
        .success();

    assert!(temp.path().join("env-out/results.txt").exists());
}

#[test]
fn test_failed_checks_do_not_fail_the_run() {
    let temp = TempDir::new().unwrap();
    preflight(&temp)
        .args(["run", "check-container", "nginx"])
        .assert()
        .success()
        .stdout(predicate::str::contains("FAILED  PinnedReference in"))
        .stdout(predicate::str::contains("FAILED  NoLatestTag in"));
}

#[test]
fn test_allow_latest_flag() {
    let temp = TempDir::new().unwrap();
    preflight(&temp)
        .args(["run", "check-container", "--allow-latest", "nginx:latest"])
        .assert()
        .success()
        .stdout(predicate::str::contains("PASSED  NoLatestTag in"));
}

#[test]
fn test_missing_image_fails_init() {
    let temp = TempDir::new().unwrap();
    preflight(&temp)
        .args(["run", "check-container"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("unable to initialize plugin"))
        .stderr(predicate::str::contains("an image reference is required"));

    // The placeholder is created before the plugin runs.
    let report = fs::read_to_string(temp.path().join("artifacts/results.txt")).unwrap();
    assert!(report.is_empty());
}

#[test]
fn test_artifacts_path_is_a_file() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("artifacts"), "").unwrap();
    preflight(&temp)
        .args(["run", "check-container", "nginx:1.25"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not a directory"));
}

// =============================================================================
// LEGACY COMMAND
// =============================================================================

#[test]
fn test_check_container_matches_run() {
    let temp = TempDir::new().unwrap();
    preflight(&temp)
        .args(["check", "container", "quay.io/org/app:1.0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("PASSED  PinnedReference in"));
}

#[test]
fn test_check_container_submit() {
    let temp = TempDir::new().unwrap();
    preflight(&temp)
        .args(["check", "container", "-s", "quay.io/org/app:1.0"])
        .assert()
        .success();

    let submission = fs::read_to_string(temp.path().join("artifacts/submission.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&submission).unwrap();
    assert_eq!(json["image"], "quay.io/org/app:1.0");
    assert_eq!(json["results"]["passed"].as_array().map(Vec::len), Some(3));
}

#[test]
fn test_check_container_submit_after_image() {
    let temp = TempDir::new().unwrap();
    preflight(&temp)
        .args(["check", "container", "quay.io/org/app:1.0", "--submit", "--logfile", "late.log"])
        .assert()
        .success();

    assert!(temp.path().join("artifacts/submission.json").exists());
    assert!(temp.path().join("late.log").exists());
    assert!(!temp.path().join("preflight.log").exists());
}

#[test]
fn test_check_container_without_submit_writes_no_submission() {
    let temp = TempDir::new().unwrap();
    preflight(&temp)
        .args(["check", "container", "quay.io/org/app:1.0"])
        .assert()
        .success();

    assert!(!temp.path().join("artifacts/submission.json").exists());
}

#[test]
fn test_submit_from_environment() {
    let temp = TempDir::new().unwrap();
    preflight(&temp)
        .env("PFLT_SUBMIT", "true")
        .args(["run", "check-container", "quay.io/org/app:1.0"])
        .assert()
        .success();

    assert!(temp.path().join("artifacts/submission.json").exists());
}
