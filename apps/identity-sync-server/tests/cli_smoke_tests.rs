//! CLI smoke tests for the identity-sync-server binary
//!
//! These tests verify that the CLI commands work correctly, including
//! configuration validation, help output, and basic command functionality.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::timeout;

const SECRET: &str = "whsec_c21va2UtdGVzdC1zZWNyZXQ=";

/// Helper to run the identity-sync-server binary with given arguments
fn run_server(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_identity-sync-server"))
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .expect("Failed to execute identity-sync-server")
}

/// Write a config whose home_dir points into `dir`, plus extra YAML.
fn write_config(dir: &Path, extra: &str) -> PathBuf {
    let path = dir.join("config.yaml");
    let home = dir.join("home");
    let content = format!(
        r#"
server:
  home_dir: "{}"
  host: "127.0.0.1"
  port: 0

database:
  url: "sqlite://database/identity_sync.db"

logging:
  default:
    console_level: info
    file: "logs/identity-sync.log"
    file_level: debug
    max_backups: 1
    max_size_mb: 1
{extra}"#,
        home.display()
    );
    std::fs::write(&path, content).expect("Failed to write config file");
    path
}

fn module_section(secret: &str) -> String {
    format!(
        r#"
modules:
  identity_sync:
    webhook_secret: "{secret}"
"#
    )
}

#[test]
fn test_cli_help_command() {
    let output = run_server(&["--help"]);

    assert!(output.status.success(), "Help command should succeed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("identity-sync-server"));
    assert!(stdout.contains("Usage:"), "Should contain usage information");
    assert!(stdout.contains("run"), "Should contain 'run' subcommand");
    assert!(stdout.contains("check"), "Should contain 'check' subcommand");
    assert!(stdout.contains("migrate"), "Should contain 'migrate' subcommand");
    assert!(stdout.contains("--config"), "Should mention config option");
}

#[test]
fn test_cli_version_command() {
    let output = run_server(&["--version"]);

    assert!(output.status.success(), "Version command should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("identity-sync-server"));
    assert!(stdout.contains("0.1.0"));
}

#[test]
fn test_cli_invalid_command() {
    let output = run_server(&["invalid-command"]);

    assert!(!output.status.success(), "Invalid command should fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("error") || stderr.contains("unrecognized"),
        "Should contain error message about invalid command: {stderr}"
    );
}

#[test]
fn test_cli_config_validation_missing_file() {
    let output = run_server(&["--config", "/nonexistent/config.yaml", "check"]);

    assert!(!output.status.success(), "Should fail with missing config");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("config file not found"),
        "Should mention config file issue: {stderr}"
    );
}

#[test]
fn test_cli_config_validation_invalid_yaml() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("invalid.yaml");
    std::fs::write(&config_path, "invalid: yaml: content: [unclosed")
        .expect("Failed to write file");

    let output = run_server(&["--config", config_path.to_str().unwrap(), "check"]);

    assert!(!output.status.success(), "Should fail with invalid YAML");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("yaml") || stderr.contains("parse"),
        "Should mention YAML parsing issue: {stderr}"
    );
}

#[test]
fn test_cli_check_fails_without_webhook_secret() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(temp_dir.path(), "");

    let output = run_server(&["--config", config_path.to_str().unwrap(), "check"]);

    assert!(!output.status.success(), "Missing secret must be fatal");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("webhook secret is not set"),
        "Should name the missing secret: {stderr}"
    );
}

#[test]
fn test_cli_check_passes_with_webhook_secret() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(temp_dir.path(), &module_section(SECRET));

    let output = run_server(&["--config", config_path.to_str().unwrap(), "check"]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "Check should pass: {stderr}");
    assert!(stdout.contains("Configuration check passed"));
    assert!(!stdout.contains(SECRET), "Secret must not be printed");
}

#[test]
fn test_cli_secret_from_environment() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(temp_dir.path(), "");

    let output = Command::new(env!("CARGO_BIN_EXE_identity-sync-server"))
        .args(["--config", config_path.to_str().unwrap(), "check"])
        .env("APP__MODULES__IDENTITY_SYNC__WEBHOOK_SECRET", SECRET)
        .output()
        .expect("Failed to execute identity-sync-server");

    assert!(
        output.status.success(),
        "Env secret should satisfy check: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn test_cli_print_config_redacts_secret() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(temp_dir.path(), &module_section(SECRET));

    let output = run_server(&["--config", config_path.to_str().unwrap(), "--print-config"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("identity_sync"));
    assert!(stdout.contains("[REDACTED]"));
    assert!(!stdout.contains(SECRET));
}

#[test]
fn test_cli_migrate_creates_sqlite_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(temp_dir.path(), "");

    let output = run_server(&["--config", config_path.to_str().unwrap(), "migrate"]);

    assert!(
        output.status.success(),
        "Migrate should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(temp_dir
        .path()
        .join("home/database/identity_sync.db")
        .is_file());
}

#[tokio::test]
async fn test_cli_run_command_with_mock_database() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(temp_dir.path(), &module_section(SECRET));

    let mut cmd = tokio::process::Command::new(env!("CARGO_BIN_EXE_identity-sync-server"));
    cmd.args(["--config", config_path.to_str().unwrap(), "--mock", "run"])
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    // A healthy server keeps running until signalled, so the timeout must elapse.
    let result = timeout(Duration::from_secs(3), cmd.output()).await;
    match result {
        Err(_elapsed) => {}
        Ok(Ok(output)) => panic!(
            "Server exited early: {}",
            String::from_utf8_lossy(&output.stderr)
        ),
        Ok(Err(e)) => panic!("Failed to spawn server: {e}"),
    }
}

#[test]
fn test_cli_run_refuses_to_start_without_secret() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(temp_dir.path(), "");

    let output = run_server(&["--config", config_path.to_str().unwrap(), "--mock", "run"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("identity_sync"), "{stderr}");
}
