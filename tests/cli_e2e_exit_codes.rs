//! End-to-end tests for CLI exit codes.
//!
//! - Exit code 0: Success
//! - Exit code 1: Any failure of a run (bad configuration, unreadable input,
//!   directory errors)
//! - Exit code 2: Invalid command-line usage (handled by clap)
//!
//! None of these reach the network: every failure happens before the first
//! directory query.

mod common;
use common::prelude::*;

/// Exit code 0 is returned for --help.
#[test]
fn test_exit_code_help() {
    TestFixture::new().command().arg("--help").assert().code(0);
}

/// Exit code 0 is returned for --version.
#[test]
fn test_exit_code_version() {
    TestFixture::new()
        .command()
        .arg("--version")
        .assert()
        .code(0)
        .stdout(predicate::str::contains("dmrfill"));
}

/// Exit code 2 is returned when no subcommand is given.
#[test]
fn test_exit_code_no_subcommand() {
    TestFixture::new().command().assert().code(2);
}

/// Exit code 2 is returned when `fill` is missing `--ds`.
#[test]
fn test_exit_code_missing_data_source() {
    TestFixture::new()
        .command()
        .arg("fill")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--ds"));
}

/// Exit code 2 is returned for a malformed filter clause.
#[test]
fn test_exit_code_malformed_filter() {
    TestFixture::new()
        .command()
        .args(["fill", "--ds", "RADIOID_DMR", "-f", "state"])
        .assert()
        .code(2);
}

/// Exit code 2 is returned for a boolean flag without a boolean value.
#[test]
fn test_exit_code_bad_boolean() {
    TestFixture::new()
        .command()
        .args(["fill", "--ds", "RADIOID_DMR", "--tg", "maybe"])
        .assert()
        .code(2);
}

/// Exit code 1 is returned for an unknown data source, with the valid names.
#[test]
fn test_exit_code_unknown_data_source() {
    TestFixture::new()
        .command()
        .args(["fill", "--ds", "RADIOID_FM"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("RADIOID_DMR"))
        .stderr(predicate::str::contains("REPEATERBOOK_FM"));
}

/// Exit code 1 is returned for a misspelled power level, with a suggestion.
#[test]
fn test_exit_code_misspelled_power() {
    TestFixture::new()
        .command()
        .args(["fill", "--ds", "RADIOID_DMR", "--power", "Hihg"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Did you mean 'High'"));
}

/// Exit code 1 is returned for an analog run without a zone name.
#[test]
fn test_exit_code_analog_without_zone() {
    TestFixture::new()
        .command()
        .args(["fill", "--ds", "REPEATERBOOK_FM"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--zone"));
}

/// Exit code 1 is returned when the input codeplug does not exist.
#[test]
fn test_exit_code_missing_input() {
    TestFixture::new()
        .command()
        .args(["fill", "--ds", "RADIOID_DMR", "--in", "nonexistent.yaml"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("hint:"));
}

/// Exit code 1 is returned for an undecodable codeplug, and no output is written.
#[test]
fn test_exit_code_invalid_codeplug() {
    let fixture = TestFixture::new().with_file("in.yaml", codeplugs::INVALID_YAML);
    fixture
        .command()
        .args(["fill", "--ds", "RADIOID_DMR", "--in", "in.yaml", "--out", "out.yaml"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("in.yaml"));
    fixture.child("out.yaml").assert(predicate::path::missing());
}

/// Configuration is checked before the input is read.
#[test]
fn test_configuration_checked_before_input() {
    TestFixture::new()
        .command()
        .args(["fill", "--ds", "BOGUS", "--in", "nonexistent.yaml"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("data source"))
        .stderr(predicate::str::contains("nonexistent.yaml").not());
}
