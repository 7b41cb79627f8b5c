//! CLI integration tests

use std::path::PathBuf;
use std::process::{Command, Output};

fn pmctl() -> Command {
    Command::new(env!("CARGO_BIN_EXE_pmctl"))
}

/// Run against `api_url` with an isolated, nonexistent config file
fn run_against(api_url: &str, args: &[&str]) -> Output {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config: PathBuf = dir.path().join("config.json");
    pmctl()
        .env_remove("PM_API_URL")
        .args(["--api-url", api_url, "--config"])
        .arg(&config)
        .args(args)
        .output()
        .expect("Failed to execute command")
}

fn help_for(args: &[&str]) -> String {
    let output = pmctl()
        .args(args)
        .arg("--help")
        .output()
        .expect("Failed to execute command");
    assert!(output.status.success(), "help for {:?} should succeed", args);
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let stdout = help_for(&[]);

    assert!(stdout.contains("PharmaMind"), "Should show app name");
    for command in [
        "lines",
        "metrics",
        "oee",
        "maintenance",
        "quality",
        "analytics",
        "batches",
        "chart",
        "summary",
        "realtime",
        "vision",
    ] {
        assert!(stdout.contains(command), "Should show {} command", command);
    }
    assert!(stdout.contains("--api-url"), "Should show api-url option");
    assert!(stdout.contains("--seed"), "Should show seed option");
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let output = pmctl()
        .arg("--version")
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("pmctl"), "Should show binary name");
}

#[test]
fn test_analytics_help() {
    let stdout = help_for(&["analytics"]);
    assert!(stdout.contains("--line"), "Should show line option");
    assert!(stdout.contains("--range"), "Should show range option");
}

#[test]
fn test_batches_help() {
    let stdout = help_for(&["batches"]);
    assert!(stdout.contains("--limit"), "Should show limit option");
    assert!(stdout.contains("--line"), "Should show line option");
}

#[test]
fn test_vision_help() {
    let stdout = help_for(&["vision"]);
    assert!(stdout.contains("status"));
    assert!(stdout.contains("history"));
    assert!(stdout.contains("analyze"));
}

#[test]
fn test_realtime_data_requires_file_number() {
    let output = pmctl()
        .args(["realtime", "data"])
        .output()
        .expect("Failed to execute command");
    assert!(!output.status.success(), "Missing argument should fail");
}

#[test]
fn test_invalid_range_is_rejected() {
    let output = pmctl()
        .args(["analytics", "--line", "1", "--range", "1y"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success(), "Invalid range should fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("1y"), "Should name the bad value");
}

#[test]
fn test_invalid_command() {
    let output = pmctl()
        .arg("invalid-command")
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success(), "Invalid command should fail");
}

#[test]
fn test_lines_json_from_backend() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/api/production-lines")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"production_lines":[
                {"id":1,"name":"Production Line A","product":"Pain Relief Tablets",
                 "status":"running","batches_range":"1-250","total_batches":250},
                {"id":2,"name":"Production Line B","product":"Antibiotics",
                 "status":"maintenance","batches_range":"251-500","total_batches":250}
            ]}"#,
        )
        .create();

    let output = run_against(&server.url(), &["--format", "json", "lines"]);
    mock.assert();
    assert!(output.status.success(), "lines should succeed");

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let lines = json["production_lines"].as_array().unwrap();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[1]["status"], "maintenance");
}

#[test]
fn test_oee_json_is_derived_from_samples() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/api/realtime/production-line/1/metrics")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"line_id":1,"metrics":[
                {"title":"Tablet Production Rate","value":"240","unit":"tablets/min",
                 "change":"+2.1%","trend":"up","color":"green"},
                {"title":"Quality Score","value":"95","unit":"%",
                 "change":"-0.3%","trend":"down","color":"yellow"}
            ]}"#,
        )
        .create();

    let output = run_against(
        &server.url(),
        &["--format", "json", "--seed", "7", "oee", "--line", "1"],
    );
    mock.assert();
    assert!(output.status.success(), "oee should succeed");

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["availability"], 80.0);
    assert_eq!(json["performance"], 80.0);
    assert_eq!(json["quality"], 95.0);
    assert_eq!(json["oee"], 60.8);
    assert_eq!(json["status"], "warning");
}

#[test]
fn test_backend_error_fails_with_message() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("GET", "/api/quality/metrics")
        .with_status(503)
        .create();

    let output = run_against(&server.url(), &["summary"]);
    assert!(!output.status.success(), "backend error should fail");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to fetch quality metrics"));
}

#[test]
fn test_line_scoped_command_without_line_fails() {
    let output = run_against("http://127.0.0.1:9", &["oee"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--line"));
}
