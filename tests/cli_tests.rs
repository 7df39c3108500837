//! Integration tests for the flowstate CLI
//!
//! These tests run the actual binary and verify output.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Get the binary to test, with ambient config env stripped
fn flowstate_cmd() -> Command {
    let mut cmd = Command::cargo_bin("flowstate").unwrap();
    cmd.env_remove("FLOWSTATE_BACKEND_URL")
        .env_remove("TERRA_API_KEY")
        .env_remove("TERRA_DEV_ID");
    cmd
}

#[test]
fn test_no_args_shows_usage() {
    flowstate_cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_help_flag() {
    flowstate_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("terminal wellness dashboard"))
        .stdout(predicate::str::contains("check"));
}

#[test]
fn test_run_help_lists_options() {
    flowstate_cmd()
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--stress-score"))
        .stdout(predicate::str::contains("--mock-health"));
}

#[test]
fn test_check_with_full_config() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("config.toml");
    fs::write(
        &config_file,
        r#"
backend_url = "http://10.32.81.229:5002"

[health]
api_key = "test-api-key"
dev_id = "test-dev-id"
"#,
    )
    .unwrap();

    flowstate_cmd()
        .args(["check", "--config"])
        .arg(&config_file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"))
        .stdout(predicate::str::contains("http://10.32.81.229:5002"))
        .stdout(predicate::str::contains("configured"))
        .stdout(predicate::str::contains("test-dev-id"));
}

#[test]
fn test_check_without_health_keys_falls_back_to_mock() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("config.toml");
    fs::write(&config_file, "backend_url = \"http://127.0.0.1:5002\"\n").unwrap();

    flowstate_cmd()
        .args(["check", "--config"])
        .arg(&config_file)
        .assert()
        .success()
        .stdout(predicate::str::contains("not configured"))
        .stdout(predicate::str::contains("mock source"));
}

#[test]
fn test_check_rejects_invalid_backend_url() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("config.toml");
    fs::write(&config_file, "backend_url = \"not a url\"\n").unwrap();

    flowstate_cmd()
        .args(["check", "--config"])
        .arg(&config_file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("Fix:"));
}

#[test]
fn test_check_rejects_malformed_config() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("config.toml");
    fs::write(&config_file, "backend_url = [oops\n").unwrap();

    flowstate_cmd()
        .args(["check", "--config"])
        .arg(&config_file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}
