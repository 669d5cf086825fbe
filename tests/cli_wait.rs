//! Integration tests for the `wait-for-deployment` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RUNNER_VARS: &[&str] = &[
    "INPUT_GITHUB-TOKEN",
    "INPUT_TOKEN",
    "INPUT_ENVIRONMENT",
    "INPUT_SHA",
    "INPUT_TIMEOUT",
    "INPUT_INTERVAL",
    "GITHUB_TOKEN",
    "GITHUB_REPOSITORY",
    "GITHUB_API_URL",
    "GITHUB_OUTPUT",
    "DEPLOYMENT_WATCHER_CONFIG",
];

/// Binary with the runner environment stripped, running in an empty directory.
fn watcher_cmd(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("wait-for-deployment").expect("binary not found");
    for var in RUNNER_VARS {
        cmd.env_remove(var);
    }
    cmd.current_dir(dir.path()).env("RUST_LOG", "warn");
    cmd
}

#[test]
fn test_help_lists_inputs() {
    let dir = TempDir::new().unwrap();
    watcher_cmd(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--environment"))
        .stdout(predicate::str::contains("--sha"))
        .stdout(predicate::str::contains("--timeout"))
        .stdout(predicate::str::contains("--interval"));
}

#[test]
fn test_missing_environment_fails_before_polling() {
    let dir = TempDir::new().unwrap();
    watcher_cmd(&dir)
        .env("INPUT_GITHUB-TOKEN", "t0ken")
        .env("INPUT_SHA", "abc123")
        .env("GITHUB_REPOSITORY", "octo/app")
        // Unroutable on purpose: the run must fail before any request.
        .env("GITHUB_API_URL", "http://127.0.0.1:9")
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains(
            "::error::Input required and not supplied: environment",
        ));
}

#[test]
fn test_malformed_repository_fails() {
    let dir = TempDir::new().unwrap();
    watcher_cmd(&dir)
        .args(["--token", "t0ken", "--environment", "production", "--sha", "abc123"])
        .args(["--repository", "not-a-repo"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("::error::Invalid repository 'not-a-repo'"));
}

#[tokio::test]
async fn test_success_publishes_outputs() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/app/deployments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 42, "payload": { "web_url": "https://preview.example.com" } }
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/app/deployments/42/statuses"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "state": "success", "target_url": "http://x" }
        ])))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let output_file = dir.path().join("github_output");
    let mut cmd = watcher_cmd(&dir);
    cmd.env("INPUT_GITHUB-TOKEN", "t0ken")
        .env("INPUT_ENVIRONMENT", "production")
        .env("INPUT_SHA", "abc123")
        .env("GITHUB_REPOSITORY", "octo/app")
        .env("GITHUB_API_URL", server.uri())
        .env("GITHUB_OUTPUT", &output_file);

    tokio::task::spawn_blocking(move || {
        cmd.assert().success();
    })
    .await
    .unwrap();

    let outputs = std::fs::read_to_string(&output_file).unwrap();
    assert!(outputs.contains("id=42\n"), "outputs: {outputs}");
    assert!(
        outputs.contains("url=https://preview.example.com\n"),
        "outputs: {outputs}"
    );
}

#[tokio::test]
async fn test_set_output_command_without_output_file() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/app/deployments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 7 }])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/app/deployments/7/statuses"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "state": "success", "target_url": "http://x" }
        ])))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut cmd = watcher_cmd(&dir);
    cmd.args(["--token", "t0ken", "--environment", "production", "--sha", "abc123"])
        .args(["--repository", "octo/app"])
        .arg("--api-url")
        .arg(server.uri());

    tokio::task::spawn_blocking(move || {
        cmd.assert()
            .success()
            .stdout(predicate::str::contains("::set-output name=id::7"))
            .stdout(predicate::str::contains("::set-output name=url::http://x"));
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_times_out_when_nothing_is_deployed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/app/deployments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut cmd = watcher_cmd(&dir);
    cmd.env("INPUT_GITHUB-TOKEN", "t0ken")
        .env("INPUT_ENVIRONMENT", "production")
        .env("INPUT_SHA", "abc123")
        .env("INPUT_TIMEOUT", "1")
        .env("INPUT_INTERVAL", "1")
        .env("GITHUB_REPOSITORY", "octo/app")
        .env("GITHUB_API_URL", server.uri());

    tokio::task::spawn_blocking(move || {
        cmd.assert()
            .failure()
            .code(1)
            .stdout(predicate::str::contains("::error::Timing out after 1 seconds"));
    })
    .await
    .unwrap();
}

/// Mounts a successful deployment that only answers requests carrying `token`
/// and filtering on `environment`.
async fn mount_success_for(server: &MockServer, token: &str, environment: &str) {
    let auth = format!("Bearer {}", token);

    Mock::given(method("GET"))
        .and(path("/repos/octo/app/deployments"))
        .and(query_param("environment", environment))
        .and(header("authorization", auth.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 9 }])))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/app/deployments/9/statuses"))
        .and(header("authorization", auth.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "state": "success", "target_url": "http://nine" }
        ])))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_input_token_alias_is_accepted() {
    let server = MockServer::start().await;
    mount_success_for(&server, "t0ken", "production").await;

    let dir = TempDir::new().unwrap();
    let mut cmd = watcher_cmd(&dir);
    cmd.env("INPUT_TOKEN", "t0ken")
        .env("INPUT_ENVIRONMENT", "production")
        .env("INPUT_SHA", "abc123")
        .env("GITHUB_REPOSITORY", "octo/app")
        .env("GITHUB_API_URL", server.uri());

    tokio::task::spawn_blocking(move || {
        cmd.assert()
            .success()
            .stdout(predicate::str::contains("::set-output name=id::9"));
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_input_sources_precedence() {
    let server = MockServer::start().await;
    // Any other token or environment gets a 404 from wiremock, which fails the run.
    mount_success_for(&server, "from-input", "production").await;

    let dir = TempDir::new().unwrap();
    let mut cmd = watcher_cmd(&dir);
    cmd.env("INPUT_GITHUB-TOKEN", "from-input")
        .env("INPUT_TOKEN", "from-alias")
        .env("GITHUB_TOKEN", "from-runner")
        .env("INPUT_ENVIRONMENT", "staging")
        .env("INPUT_SHA", "abc123")
        .env("GITHUB_REPOSITORY", "octo/elsewhere")
        .env("GITHUB_API_URL", "http://127.0.0.1:9")
        .args(["--environment", "production", "--repository", "octo/app"])
        .arg("--api-url")
        .arg(server.uri());

    tokio::task::spawn_blocking(move || {
        cmd.assert()
            .success()
            .stdout(predicate::str::contains("::set-output name=url::http://nine"));
    })
    .await
    .unwrap();
}
