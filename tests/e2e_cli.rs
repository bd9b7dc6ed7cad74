//! CLI end-to-end tests
//!
//! Tests for the liji command-line interface.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

/// Get a command for the liji binary with a clean environment
#[allow(deprecated)]
fn liji_cmd() -> Command {
    let mut cmd = Command::cargo_bin("liji").unwrap();
    for var in ["DATA_DIR", "PORT", "LIJI_HOST", "LIJI_BACKEND", "LIJI_STATIC_DIR"] {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn test_cli_no_args_shows_help() {
    liji_cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_help_flag() {
    liji_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("liji"))
        .stdout(predicate::str::contains("set-password"));
}

#[test]
fn test_cli_version_command() {
    liji_cmd()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_cli_start_help_lists_storage_flags() {
    liji_cmd()
        .args(["start", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--backend"))
        .stdout(predicate::str::contains("--data-dir"));
}

#[test]
fn test_cli_validate_config() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        "[server]\nport = 9000\n\n[storage]\nbackend = \"files\"\ndata_dir = \"/srv/liji\"\n",
    )
    .unwrap();

    liji_cmd()
        .arg("validate")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"))
        .stdout(predicate::str::contains("9000"))
        .stdout(predicate::str::contains("files"));
}

#[test]
fn test_cli_validate_invalid_config() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[server]\nport = \"not a port\"\n").unwrap();

    liji_cmd()
        .arg("validate")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse config file"));
}

#[test]
fn test_cli_set_password_files_backend() {
    let dir = tempdir().unwrap();
    let data_dir = dir.path().join("data");

    liji_cmd()
        .current_dir(dir.path())
        .args(["set-password", "recovered", "--backend", "files", "--data-dir"])
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Password updated"));

    let settings = fs::read_to_string(data_dir.join("settings.json")).unwrap();
    assert!(settings.contains("recovered"));
}

#[test]
fn test_cli_set_password_uses_data_dir_env() {
    let dir = tempdir().unwrap();
    let data_dir = dir.path().join("ledger");

    liji_cmd()
        .current_dir(dir.path())
        .env("DATA_DIR", &data_dir)
        .args(["set-password", "from-env"])
        .assert()
        .success();

    assert!(data_dir.join("liji.db").exists());

    let conn = rusqlite::Connection::open(data_dir.join("liji.db")).unwrap();
    let stored: String = conn
        .query_row("SELECT value FROM settings WHERE key = 'password'", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(stored, "from-env");
}
