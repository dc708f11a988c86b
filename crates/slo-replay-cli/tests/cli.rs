//! Tests of the `slo-replay` binary.

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::NamedTempFile;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn slo_replay() -> Command {
    let mut cmd = Command::cargo_bin("slo-replay").unwrap();
    cmd.env_remove("SLO_REPLAY_CONFIG")
        .env_remove("SLO_REPLAY_CONTEXT")
        .env_remove("RUST_LOG");
    cmd
}

fn config_for(server: &MockServer) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    write!(
        file,
        r#"
[contexts.test]
url = "{}"
project = "web"
access_token = "secret"

[replay]
status_check_interval_seconds = 1
"#,
        server.uri()
    )
    .unwrap();
    file
}

#[test]
fn test_help() {
    slo_replay()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("completions"));
}

/// Verify that a run without a name or files is a usage error.
#[test]
fn test_run_without_input_is_usage_error() {
    slo_replay()
        .args(["run", "--no-config-file"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("-f"));
}

/// Verify that a failure is reported on stderr exactly once, even with JSON logs.
#[test]
fn test_error_reported_once() {
    slo_replay()
        .args(["run", "--no-config-file", "--json-logs"])
        .assert()
        .code(2)
        .stderr(predicate::function(|stderr: &str| {
            stderr.matches("you must either run").count() == 1
        }));
}

#[test]
fn test_run_without_from_is_usage_error() {
    slo_replay()
        .args(["run", "latency", "--no-config-file"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("RFC3339"));
}

#[test]
fn test_too_many_names_is_usage_error() {
    slo_replay()
        .args([
            "run",
            "a",
            "b",
            "--from",
            "2024-05-01T10:00:00Z",
            "--no-config-file",
        ])
        .assert()
        .code(2);
}

#[test]
fn test_unknown_context_is_configuration_error() {
    slo_replay()
        .args(["list", "--no-config-file", "--context", "missing"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("'missing'"));
}

#[test]
fn test_completions() {
    slo_replay()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("slo-replay"));
}

/// Verify a full queue-mode run against a mock platform.
#[tokio::test(flavor = "multi_thread")]
async fn test_run_single_slo_in_queue_mode() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get/slo"))
        .and(header("Authorization", "Bearer secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{
            "metadata": {"name": "latency", "project": "web"},
            "spec": {"indicator": {"metricSource": {"name": "prom", "project": "web"}}}
        }])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/internal/plan-info"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"enabledPlaylists": true})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/internal/timemachine/availability"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"available": true})),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/timetravel"))
        .and(header("Project", "web"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let config_path = config.path().to_path_buf();
    let assert = tokio::task::spawn_blocking(move || {
        slo_replay()
            .arg("--config")
            .arg(&config_path)
            .args(["--no-color", "run", "latency", "--from", "2024-05-01T10:00:00Z"])
            .assert()
    })
    .await
    .unwrap();

    assert
        .success()
        .stdout(predicate::str::contains("[1/1] SLO: latency, Project: web"))
        .stdout(predicate::str::contains("Replay succeeded for all 1 SLOs."));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_delete_single_slo() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/timetravel"))
        .and(body_json(serde_json::json!({"project": "web", "slo": "latency"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let config_path = config.path().to_path_buf();
    let assert = tokio::task::spawn_blocking(move || {
        slo_replay()
            .arg("--config")
            .arg(&config_path)
            .args(["delete", "latency"])
            .assert()
    })
    .await
    .unwrap();

    assert.success().stdout(predicate::str::contains(
        "Replays from queue for SLO latency in project web deleted successfully",
    ));
}

/// Verify that delete needs either a name or --all.
#[test]
fn test_delete_without_target_is_usage_error() {
    slo_replay()
        .args(["delete", "--no-config-file"])
        .assert()
        .code(2);
}
