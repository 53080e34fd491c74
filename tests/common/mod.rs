//! Shared test helpers for integration tests
//!
//! This module provides common utilities used across all test files.

#![allow(dead_code)]

use std::path::Path;

use assert_cmd::cargo;
use assert_cmd::Command;
use tempfile::TempDir;

/// Helper to get a tolstack command isolated from the user's environment
pub fn tolstack() -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("tolstack"));
    cmd.env_remove("TOLSTACK_FILE")
        .env_remove("TOLSTACK_PRECISION")
        .env_remove("TOLSTACK_ADVANCED")
        .env_remove("RUST_LOG")
        .env("TOLSTACK_ANALYST", "Test Analyst");
    cmd
}

/// tolstack running inside a temp directory, with config lookups kept there
pub fn tolstack_in(tmp: &TempDir) -> Command {
    let mut cmd = tolstack();
    cmd.current_dir(tmp.path())
        .env("XDG_CONFIG_HOME", tmp.path().join(".config"))
        .env("HOME", tmp.path());
    cmd
}

/// Helper to create an empty stack file in a temp directory
pub fn setup_stack() -> TempDir {
    let tmp = TempDir::new().unwrap();
    tolstack_in(&tmp)
        .args(["new", "--title", "Test Stack"])
        .assert()
        .success();
    tmp
}

/// Helper to create a stack seeded with the demonstration rows
pub fn setup_sample_stack() -> TempDir {
    let tmp = TempDir::new().unwrap();
    tolstack_in(&tmp)
        .args(["new", "--title", "Sample", "--sample"])
        .assert()
        .success();
    tmp
}

/// Helper to append a contributor
pub fn add_row(tmp: &TempDir, description: &str, nominal: &str, direction: &str, tol: &str) {
    tolstack_in(tmp)
        .args([
            "row",
            "add",
            "--description",
            description,
            "--nominal",
            nominal,
            "--direction",
            direction,
            "--tol",
            tol,
        ])
        .assert()
        .success();
}

/// Read the stack file back as JSON
pub fn read_stack(tmp: &TempDir) -> serde_json::Value {
    read_json(&tmp.path().join("stack.json"))
}

pub fn read_json(path: &Path) -> serde_json::Value {
    let content = std::fs::read_to_string(path).unwrap();
    serde_json::from_str(&content).unwrap()
}

/// Run a command with `--format json` and parse its stdout
pub fn json_output(tmp: &TempDir, args: &[&str]) -> serde_json::Value {
    let output = tolstack_in(tmp)
        .args(args)
        .args(["--format", "json"])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "command {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

/// Approximate float comparison for JSON numbers
pub fn assert_close(value: &serde_json::Value, expected: f64) {
    let actual = value.as_f64().unwrap_or_else(|| panic!("not a number: {}", value));
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {}, got {}",
        expected,
        actual
    );
}
