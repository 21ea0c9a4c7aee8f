#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Binary isolated from the caller's environment and config file
fn craton_cmd() -> Command {
    let mut cmd = Command::new(cargo_bin("craton"));
    cmd.env_remove("CRATON_URL")
        .env_remove("OS_USERNAME")
        .env_remove("OS_PASSWORD")
        .env(
            "XDG_CONFIG_HOME",
            std::env::temp_dir().join("craton-cli-tests-no-config"),
        );
    cmd
}

#[test]
fn test_no_arguments_prints_top_level_help() {
    craton_cmd()
        .assert()
        .success()
        .stdout(predicate::str::contains("region-list"))
        .stdout(predicate::str::contains("--craton-url"))
        .stdout(predicate::str::contains("craton help COMMAND"));
}

#[test]
fn test_help_flags() {
    for flag in ["-h", "--help"] {
        craton_cmd()
            .arg(flag)
            .assert()
            .success()
            .stdout(predicate::str::contains("region-create"));
    }
}

#[test]
fn test_subcommand_help_shows_its_schema() {
    craton_cmd()
        .args(["region-show", "-h"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Show detailed information about a region."))
        .stdout(predicate::str::contains("<REGION>"))
        .stdout(predicate::str::contains("--craton-url").not());
}

#[test]
fn test_help_command_for_subcommand() {
    craton_cmd()
        .args(["help", "region-update"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--note"));
}

#[test]
fn test_version() {
    craton_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(craton::VERSION));
}

#[test]
fn test_unknown_subcommand_is_usage_error() {
    craton_cmd()
        .arg("bogus-command")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("bogus-command"));
}

#[test]
fn test_missing_url_reports_error() {
    craton_cmd()
        .arg("region-list")
        .assert()
        .code(1)
        .stderr(predicate::str::starts_with("ERROR: no Craton URL configured"));
}

#[test]
fn test_malformed_config_is_logged() {
    let config_home =
        std::env::temp_dir().join(format!("craton-cli-tests-bad-config-{}", std::process::id()));
    let craton_dir = config_home.join("craton");
    std::fs::create_dir_all(&craton_dir).unwrap();
    std::fs::write(craton_dir.join("config.json"), "{ not json").unwrap();

    craton_cmd()
        .env("XDG_CONFIG_HOME", &config_home)
        .args(["--log-level", "warn", "region-list"])
        .assert()
        .code(1)
        .stderr(predicate::str::starts_with("ERROR: no Craton URL configured"));

    let log = std::fs::read_to_string(craton_dir.join("craton.log")).unwrap();
    std::fs::remove_dir_all(&config_home).unwrap();
    assert!(log.contains("Ignoring malformed config"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_not_found_prints_error_and_exits_1() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/regions/999"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let url = format!("{}/v1", server.uri());
    tokio::task::spawn_blocking(move || {
        craton_cmd()
            .args(["--craton-url", url.as_str(), "region-show", "999"])
            .assert()
            .code(1)
            .stdout(predicate::str::is_empty())
            .stderr(predicate::str::starts_with("ERROR: not found"));
    })
    .await
    .unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_region_show_prints_table() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/regions/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "region": {"id": 1, "project_id": 1, "name": "r1"}
        })))
        .mount(&server)
        .await;

    let url = format!("{}/v1", server.uri());
    tokio::task::spawn_blocking(move || {
        craton_cmd()
            .args(["--craton-url", url.as_str(), "region-show", "1"])
            .assert()
            .success()
            .stdout(predicate::str::contains("| Name       | r1    |"));
    })
    .await
    .unwrap();
}
