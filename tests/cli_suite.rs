use assert_cmd::Command;
use predicates::prelude::*;

// Helper function to initialize the command to test.
fn pkgsweep() -> Command {
    Command::new(env!("CARGO_BIN_EXE_pkgsweep"))
}

#[test]
fn test_help_command() {
    let mut cmd = pkgsweep();

    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Scans Homebrew, npm, pnpm, yarn and pip inventories",
        ));
}

#[test]
fn test_version_flag() {
    let mut cmd = pkgsweep();

    let version = env!("CARGO_PKG_VERSION");
    let expected = format!("pkgsweep {}", version);

    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(expected));
}

#[test]
fn test_unknown_command() {
    let mut cmd = pkgsweep();

    cmd.arg("unknown-command-xyz")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage: pkgsweep"));
}

#[test]
fn test_no_command_shows_quick_start() {
    let mut cmd = pkgsweep();

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Quick start"));
}

#[test]
fn test_clean_requires_packages() {
    let mut cmd = pkgsweep();

    cmd.arg("clean")
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}

#[test]
fn test_unknown_manager_is_rejected() {
    let mut cmd = pkgsweep();

    cmd.args(["list", "--manager", "chocolatey"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Unknown package manager: chocolatey",
        ));
}

#[test]
fn test_managers_lists_every_kind() {
    let mut cmd = pkgsweep();

    cmd.arg("managers")
        .assert()
        .success()
        .stdout(predicate::str::contains("brew-cask"))
        .stdout(predicate::str::contains("pip"))
        .stdout(predicate::str::contains("of 6 managers available"));
}

#[test]
fn test_quiet_hides_the_summary_but_not_the_rows() {
    let mut cmd = pkgsweep();

    cmd.args(["--quiet", "managers"])
        .assert()
        .success()
        .stdout(predicate::str::contains("brew"))
        .stdout(predicate::str::contains("of 6 managers available").not());
}
