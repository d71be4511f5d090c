//! Integration tests for CLI argument handling
//!
//! Runs the binary against scratch table directories; no test here needs the network.

use std::fs;
use std::process::Command;

use tempfile::TempDir;

/// Helper to run the CLI with given args and capture output
fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_cvtwd"))
        .args(args)
        .env_remove("CVTWD_URL")
        .env_remove("CVTWD_TABLE_DIR")
        .env("RUST_LOG", "off")
        .output()
        .expect("Failed to execute cvtwd")
}

fn table_dir_with(files: &[&str]) -> TempDir {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    for file in files {
        fs::write(temp_dir.path().join(file), b"Currency,Rate\n").unwrap();
    }
    temp_dir
}

#[test]
fn test_help_flag_exits_successfully() {
    let output = run_cli(&["--help"]);
    assert!(output.status.success(), "Expected --help to exit successfully");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("cvtwd"), "Help should mention cvtwd");
    assert!(stdout.contains("update"), "Help should mention the update command");
    assert!(stdout.contains("cleanup"), "Help should mention the cleanup command");
}

#[test]
fn test_missing_subcommand_fails() {
    let output = run_cli(&[]);
    assert!(!output.status.success());
}

#[test]
fn test_zero_timeout_prints_error_and_exits() {
    let temp_dir = table_dir_with(&[]);
    let dir = temp_dir.path().to_str().unwrap();
    let output = run_cli(&["--table-dir", dir, "--timeout-secs", "0", "update"]);
    assert!(!output.status.success(), "Expected zero timeout to fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Invalid timeout"),
        "Should print error message about the timeout: {}",
        stderr
    );
}

#[test]
fn test_status_on_empty_directory() {
    let temp_dir = table_dir_with(&[]);
    let dir = temp_dir.path().to_str().unwrap();
    let output = run_cli(&["status", "--table-dir", dir]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Active table:    none"), "stdout: {}", stdout);
}

#[test]
fn test_status_json_lists_tables() {
    let temp_dir = table_dir_with(&[
        "ExchangeRate@201912021600.csv",
        "ExchangeRate@201912201451.csv",
    ]);
    let dir = temp_dir.path().to_str().unwrap();
    let output = run_cli(&["status", "--json", "--table-dir", dir]);
    assert!(output.status.success());

    let status: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("status --json should print JSON");
    assert_eq!(status["active"], "ExchangeRate@201912201451.csv");
    assert_eq!(
        status["outdated"],
        serde_json::json!(["ExchangeRate@201912021600.csv"])
    );
}

#[test]
fn test_cleanup_removes_outdated_tables() {
    let temp_dir = table_dir_with(&["A@201912021600.csv", "A@201912201451.csv"]);
    let dir = temp_dir.path().to_str().unwrap();
    let output = run_cli(&["cleanup", "--table-dir", dir]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Deleted A@201912021600.csv"), "stdout: {}", stdout);
    assert!(!temp_dir.path().join("A@201912021600.csv").exists());
    assert!(temp_dir.path().join("A@201912201451.csv").exists());
}

#[test]
fn test_update_unreachable_endpoint_still_succeeds() {
    let temp_dir = table_dir_with(&["A@201912021600.csv"]);
    let dir = temp_dir.path().to_str().unwrap();
    let output = run_cli(&[
        "update",
        "--table-dir",
        dir,
        "--url",
        "http://127.0.0.1:9/table",
        "--timeout-secs",
        "1",
    ]);
    assert!(output.status.success(), "A failed fetch must not fail the update");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("try again later"), "stdout: {}", stdout);
    assert!(temp_dir.path().join("A@201912021600.csv").exists());
}

#[cfg(test)]
mod unit_tests {
    //! Unit tests for CLI parsing that don't require running the binary

    use clap::Parser;
    use cvtwd::cli::{table_config, Cli, Command};

    #[test]
    fn test_cli_path_command() {
        let cli = Cli::parse_from(["cvtwd", "path"]);
        assert_eq!(cli.command, Command::Path);
    }

    #[test]
    fn test_cli_update_clean_flag() {
        let cli = Cli::parse_from(["cvtwd", "update", "--clean"]);
        assert_eq!(cli.command, Command::Update { clean: true });
    }

    #[test]
    fn test_table_config_without_overrides_uses_defaults() {
        let cli = Cli::parse_from(["cvtwd", "status", "--timeout-secs", "3"]);
        let config = table_config(&cli).unwrap();
        assert_eq!(config.timeout, std::time::Duration::from_secs(3));
    }
}
