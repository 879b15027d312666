//! End-to-end tests for the `cache` command.
//!
//! These tests invoke the actual CLI binary against a cache populated through
//! the library, in a private temporary directory.

mod common;
use common::prelude::*;

use dmrfill::cache::{ResponseCache, DEFAULT_MAX_AGE};

const RADIOID: &str = "https://radioid.net/api/dmr/repeater/?state=Maine";
const BRANDMEISTER: &str = "https://api.brandmeister.network/v2/talkgroup";

fn populated() -> TestFixture {
    let fixture = TestFixture::new();
    let cache = ResponseCache::new(fixture.cache_dir(), DEFAULT_MAX_AGE);
    cache
        .put(RADIOID, br#"{"count":0,"results":[]}"#)
        .expect("Failed to populate cache");
    cache
        .put(BRANDMEISTER, br#"{"91":"Worldwide"}"#)
        .expect("Failed to populate cache");
    fixture
}

fn entry_count(fixture: &TestFixture) -> usize {
    ResponseCache::new(fixture.cache_dir(), DEFAULT_MAX_AGE)
        .entries()
        .expect("Failed to read cache")
        .len()
}

#[test]
fn test_cache_help() {
    TestFixture::new()
        .command()
        .args(["cache", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Manage the directory response cache"));
}

#[test]
fn test_cache_list_empty() {
    TestFixture::new()
        .command()
        .args(["cache", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No cached responses found"));
}

#[test]
fn test_cache_list_shows_urls() {
    populated()
        .command()
        .args(["cache", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains(RADIOID))
        .stdout(predicate::str::contains(BRANDMEISTER))
        .stdout(predicate::str::contains("Total: 2 cached responses"));
}

#[test]
fn test_cache_list_json() {
    let output = populated()
        .command()
        .args(["cache", "list", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let urls: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["url"].as_str().unwrap())
        .collect();
    assert_eq!(urls, vec![BRANDMEISTER, RADIOID]);
}

#[test]
fn test_cache_dir_flag_overrides_environment() {
    let fixture = populated();
    fixture
        .command()
        .args(["cache", "--cache-dir"])
        .arg(fixture.path().join("elsewhere"))
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No cached responses found"));
}

#[test]
fn test_cache_clean_requires_selector() {
    let fixture = populated();
    fixture
        .command()
        .args(["cache", "clean"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--all"))
        .stderr(predicate::str::contains("--older-than"));
    assert_eq!(entry_count(&fixture), 2);
}

#[test]
fn test_cache_clean_dry_run_keeps_entries() {
    let fixture = populated();
    fixture
        .command()
        .args(["cache", "clean", "--all", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("would be deleted"))
        .stdout(predicate::str::contains(RADIOID));
    assert_eq!(entry_count(&fixture), 2);
}

#[test]
fn test_cache_clean_all() {
    let fixture = populated();
    fixture
        .command()
        .args(["cache", "clean", "--all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted 2 cache entries"));
    assert_eq!(entry_count(&fixture), 0);
}

#[test]
fn test_cache_clean_older_than_spares_fresh_entries() {
    let fixture = populated();
    fixture
        .command()
        .args(["cache", "clean", "--older-than", "1d"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No cache entries match"));
    assert_eq!(entry_count(&fixture), 2);
}

#[test]
fn test_cache_clean_bad_duration() {
    populated()
        .command()
        .args(["cache", "clean", "--older-than", "soon"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--older-than"));
}
