// Surface tests for the task runner binary: no-argument guidance and the
// clap-generated help output. Nothing here touches docker or the network.

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_run_without_arguments_lists_tasks() {
    let mut cmd = Command::cargo_bin("xtask").unwrap();

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("opensearch-users development tasks"))
        .stdout(predicate::str::contains("cargo xtask fmt"))
        .stdout(predicate::str::contains("cargo xtask test"))
        .stdout(predicate::str::contains("cargo xtask doctor"));
}

#[test]
fn test_help_lists_every_task() {
    let mut cmd = Command::cargo_bin("xtask").unwrap();
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("fmt"))
        .stdout(predicate::str::contains("lint"))
        .stdout(predicate::str::contains("test"))
        .stdout(predicate::str::contains("bump"))
        .stdout(predicate::str::contains("fixture"))
        .stdout(predicate::str::contains("doctor"));
}

#[test]
fn test_bump_help_lists_severity_levels() {
    let mut cmd = Command::cargo_bin("xtask").unwrap();
    cmd.args(["bump", "--help"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("major"))
        .stdout(predicate::str::contains("minor"))
        .stdout(predicate::str::contains("patch"))
        .stdout(predicate::str::contains("--dry-run"));
}

#[test]
fn test_fixture_help_lists_operations() {
    let mut cmd = Command::cargo_bin("xtask").unwrap();
    cmd.args(["fixture", "--help"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("up"))
        .stdout(predicate::str::contains("down"))
        .stdout(predicate::str::contains("status"));
}

#[test]
fn test_unknown_task_is_rejected() {
    let mut cmd = Command::cargo_bin("xtask").unwrap();
    cmd.arg("frobnicate");

    cmd.assert().failure();
}

#[test]
fn test_bump_requires_a_level() {
    let mut cmd = Command::cargo_bin("xtask").unwrap();
    cmd.arg("bump");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("<LEVEL>"));
}
