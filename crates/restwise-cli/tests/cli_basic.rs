//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own temporary HOME so the
//! real config file is never touched.

use std::process::Command;

use tempfile::TempDir;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(home: &TempDir, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_restwise"))
        .args(args)
        .env("HOME", home.path())
        .env_remove("RESTWISE_ENV")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn home() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp HOME")
}

#[test]
fn test_config_path_is_under_home() {
    let home = home();
    let (stdout, _, code) = run_cli(&home, &["config", "path"]);
    assert_eq!(code, 0);
    assert!(stdout.trim().ends_with("restwise/config.toml"), "got {stdout}");
    assert!(stdout.contains(home.path().to_str().unwrap()));
}

#[test]
fn test_config_get_default() {
    let home = home();
    let (stdout, _, code) = run_cli(&home, &["config", "get", "timing.tick_period_ms"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "100");
}

#[test]
fn test_config_set_persists() {
    let home = home();
    let (stdout, _, code) = run_cli(&home, &["config", "set", "haptics.min_spacing_ms", "450"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "ok");

    let (stdout, _, code) = run_cli(&home, &["config", "get", "haptics.min_spacing_ms"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "450");
}

#[test]
fn test_config_set_unknown_key_fails() {
    let home = home();
    let (_, stderr, code) = run_cli(&home, &["config", "set", "timing.speed", "2"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("Unknown configuration key"), "got {stderr}");
}

#[test]
fn test_config_list_is_json() {
    let home = home();
    let (stdout, _, code) = run_cli(&home, &["config", "list"]);
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["timing"]["warning_threshold_secs"], 3);
    assert_eq!(parsed["haptics"]["enabled"], true);
}

#[test]
fn test_rest_rejects_zero() {
    let home = home();
    let (_, stderr, code) = run_cli(&home, &["rest", "0"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("Invalid rest duration"), "got {stderr}");
}

#[test]
fn test_rest_rejects_negative() {
    let home = home();
    let (_, stderr, code) = run_cli(&home, &["rest", "-3"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("Invalid rest duration"), "got {stderr}");
}

#[test]
fn test_rest_runs_to_completion_json() {
    let home = home();
    let (stdout, _, code) = run_cli(&home, &["rest", "1", "--label", "Plank", "--json"]);
    assert_eq!(code, 0);

    let events: Vec<serde_json::Value> = stdout
        .lines()
        .filter_map(|l| serde_json::from_str(l).ok())
        .filter(|v: &serde_json::Value| v.get("type").is_some())
        .collect();
    let last = events.last().expect("no events printed");
    assert_eq!(last["type"], "CountdownCompleted");
    assert_eq!(last["label"], "Plank");
    assert_eq!(last["reason"], "elapsed");
}

#[test]
fn test_config_set_zero_default_rest_fails() {
    let home = home();
    let (_, stderr, code) = run_cli(&home, &["config", "set", "timing.default_rest_secs", "0"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("timing.default_rest_secs"), "got {stderr}");

    let (stdout, _, code) = run_cli(&home, &["config", "get", "timing.default_rest_secs"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "60");
}
