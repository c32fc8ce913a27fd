//! SPDX-License-Identifier: MIT OR AGPL-3.0-or-later
//! Command-line behaviour that needs no container engine

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

fn excalidraw_cli() -> Command {
    let mut cmd = Command::cargo_bin("excalidraw-cli").unwrap();
    cmd.env_remove("EXCALIDRAW_CLI_CONFIG")
        .env_remove("EXCALIDRAW_CLI_ENGINE")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_lists_actions() {
    excalidraw_cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--start"))
        .stdout(predicate::str::contains("--status"))
        .stdout(predicate::str::contains("--update"))
        .stdout(predicate::str::contains("--stop"))
        .stdout(predicate::str::contains("--engine"));
}

#[test]
fn single_dash_help_is_accepted() {
    excalidraw_cli()
        .arg("-help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn version_is_printed() {
    excalidraw_cli()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn completions_are_generated() {
    excalidraw_cli()
        .args(["--completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("excalidraw-cli"));
}

#[test]
fn completions_ignore_exported_settings() {
    excalidraw_cli()
        .args(["--completions", "zsh"])
        .env("EXCALIDRAW_CLI_ENGINE", "docker")
        .env("EXCALIDRAW_CLI_CONFIG", "/nonexistent/config.toml")
        .assert()
        .success()
        .stdout(predicate::str::contains("excalidraw-cli"));
}

#[test]
fn missing_action_fails() {
    excalidraw_cli()
        .assert()
        .failure()
        .stdout(predicate::str::contains("no action given"));
}

#[test]
fn conflicting_go_style_actions_are_rejected() {
    excalidraw_cli()
        .args(["-st", "-sp"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn unknown_engine_is_rejected() {
    excalidraw_cli()
        .args(["--status", "--engine", "lxc"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn missing_config_file_fails_before_engine_lookup() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.toml");

    excalidraw_cli()
        .arg("-status")
        .arg("-config")
        .arg(&missing)
        .assert()
        .failure()
        .stdout(predicate::str::contains("Failed to read"));
}

#[test]
fn invalid_config_file_is_reported() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "port = 5000").unwrap();

    excalidraw_cli()
        .args(["--status", "--config"])
        .arg(file.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("Invalid settings"));
}

#[test]
fn config_from_environment_is_used() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "engine = \"lxc\"").unwrap();

    excalidraw_cli()
        .arg("--stop")
        .env("EXCALIDRAW_CLI_CONFIG", file.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("Invalid settings"));
}
