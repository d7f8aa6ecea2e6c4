//! CLI integration tests

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn speech_guard() -> Command {
    Command::new(env!("CARGO_BIN_EXE_speech-guard"))
}

#[test]
fn help_output() {
    speech_guard()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("hate speech"))
        .stdout(predicate::str::contains("classify"))
        .stdout(predicate::str::contains("record"))
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn version_output() {
    speech_guard()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("speech-guard"))
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn classify_help() {
    speech_guard()
        .args(["classify", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--server"))
        .stdout(predicate::str::contains("--json"));
}

#[test]
fn record_help() {
    speech_guard()
        .args(["record", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--no-live-transcript"))
        .stdout(predicate::str::contains("--server"));
}

#[test]
fn serve_help() {
    speech_guard()
        .args(["serve", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--port"))
        .stdout(predicate::str::contains("--cors-origin"))
        .stdout(predicate::str::contains("GEMINI_API_KEY"));
}

#[test]
fn config_help() {
    speech_guard()
        .args(["config", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("set"))
        .stdout(predicate::str::contains("get"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("path"));
}

#[test]
fn no_arguments_shows_usage() {
    speech_guard()
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn unknown_subcommand_rejected() {
    speech_guard()
        .arg("transmogrify")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("unrecognized"));
}

#[test]
fn config_path_command() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");

    speech_guard()
        .args(["config", "path"])
        .env("XDG_CONFIG_HOME", dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("speech-guard"))
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn config_init_creates_file() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");

    speech_guard()
        .args(["config", "init"])
        .env("XDG_CONFIG_HOME", dir.path())
        .assert()
        .success();

    assert!(dir.path().join("speech-guard").join("config.toml").exists());

    // Running init again must refuse to clobber the existing file
    speech_guard()
        .args(["config", "init"])
        .env("XDG_CONFIG_HOME", dir.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn config_set_then_get_round_trip() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");

    speech_guard()
        .args(["config", "set", "model", "gemini-2.5-pro"])
        .env("XDG_CONFIG_HOME", dir.path())
        .assert()
        .success();

    speech_guard()
        .args(["config", "get", "model"])
        .env("XDG_CONFIG_HOME", dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("gemini-2.5-pro"));
}

#[test]
fn config_get_unset_key_reports_not_set() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");

    speech_guard()
        .args(["config", "get", "server_url"])
        .env("XDG_CONFIG_HOME", dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("(not set)"));
}

#[test]
fn config_get_masks_api_key() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");

    speech_guard()
        .args(["config", "set", "api_key", "abcdef123456789"])
        .env("XDG_CONFIG_HOME", dir.path())
        .assert()
        .success();

    speech_guard()
        .args(["config", "get", "api_key"])
        .env("XDG_CONFIG_HOME", dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("abcd...6789"))
        .stdout(predicate::str::contains("abcdef123456789").not());
}

// The classify tests below run the binary against a stub gateway, so a
// valid invocation completes instead of waiting on a microphone.

fn mount_verdict(verdict: serde_json::Value) -> Mock {
    Mock::given(method("POST"))
        .and(path("/api/predict"))
        .respond_with(ResponseTemplate::new(200).set_body_json(verdict))
        .expect(1)
}

#[tokio::test(flavor = "multi_thread")]
async fn classify_prints_verdict_report() {
    let server = MockServer::start().await;
    mount_verdict(json!({
        "label": "Hate Speech",
        "confidence": 0.97,
        "explanation": "Targets a protected group",
        "transcription": "you heard me"
    }))
    .mount(&server)
    .await;

    speech_guard()
        .args(["classify", "some hateful words", "--server", &server.uri()])
        .env("HOME", "/nonexistent")
        .env("XDG_CONFIG_HOME", "/nonexistent")
        .assert()
        .success()
        .stdout(predicate::str::contains("Hate Speech"))
        .stdout(predicate::str::contains("97.0% confidence"))
        .stdout(predicate::str::contains("Targets a protected group"))
        .stdout(predicate::str::contains("Transcript:"))
        .stdout(predicate::str::contains("you heard me"));
}

#[tokio::test(flavor = "multi_thread")]
async fn classify_emits_json_verdict() {
    let server = MockServer::start().await;
    mount_verdict(json!({
        "label": "Normal Speech",
        "confidence": 0.91,
        "explanation": "Friendly greeting"
    }))
    .mount(&server)
    .await;

    speech_guard()
        .args(["classify", "hello there", "--server", &server.uri(), "--json"])
        .env("HOME", "/nonexistent")
        .env("XDG_CONFIG_HOME", "/nonexistent")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"label\": \"Normal Speech\""))
        .stdout(predicate::str::contains("\"confidence\": 0.91"));
}
