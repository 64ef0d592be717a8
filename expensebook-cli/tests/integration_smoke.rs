//! Smoke tests to verify command wiring

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_help_lists_serve() {
    let mut cmd = Command::cargo_bin("expensebook").unwrap();
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("serve"));
}

#[test]
fn test_serve_help() {
    let mut cmd = Command::cargo_bin("expensebook").unwrap();
    cmd.arg("serve").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("--database-url"))
        .stdout(predicate::str::contains("--in-memory"))
        .stdout(predicate::str::contains("[env: PORT="));
}

#[test]
fn test_serve_rejects_bad_port() {
    let mut cmd = Command::cargo_bin("expensebook").unwrap();
    cmd.arg("serve").arg("--port").arg("not-a-port");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_unknown_command_fails() {
    let mut cmd = Command::cargo_bin("expensebook").unwrap();
    cmd.arg("export");

    cmd.assert().failure();
}
