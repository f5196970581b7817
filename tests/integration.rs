use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use httpmock::prelude::*;
use serde_json::json;
use tempfile::TempDir;

fn qh_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("qh");
    path
}

/// Write a config pointing at the given mock upstream, with two bound
/// categories and a fast fetch policy.
fn setup_test_env(server: &MockServer) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let config_content = format!(
        r#"[db]
path = "{}/data/quotes.sqlite"

[fetch]
base_url = "{}"
timeout_secs = 2
max_attempts = 2
backoff_base_ms = 1
throttle_ms = 0
concurrency = 2

[[sources]]
name = "Love"
tag = "love"
description = "Beautiful words about love"
icon = "❤️"

[[sources]]
name = "Courage"
tag = "courage"
description = "Embrace courage and strength"
icon = "💪"
"#,
        root.display(),
        server.base_url()
    );

    let config_path = config_dir.join("qh.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_qh(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = qh_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run qh binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

fn mock_category(server: &MockServer, tag: &str, results: serde_json::Value) {
    server.mock(|when, then| {
        when.method(GET).path("/quotes").query_param("tags", tag);
        then.status(200).json_body(json!({ "results": results }));
    });
}

fn mock_both_categories(server: &MockServer) {
    mock_category(
        server,
        "love",
        json!([
            { "content": "Love conquers all", "author": "Virgil" },
            { "content": "love conquers ALL", "author": "Virgil" },
            { "content": "Where there is love there is life", "author": "Gandhi" },
        ]),
    );
    mock_category(
        server,
        "courage",
        json!([
            { "content": "Courage is grace under pressure", "author": "Hemingway" },
        ]),
    );
}

#[test]
fn test_init_creates_store() {
    let server = MockServer::start();
    let (_tmp, config_path) = setup_test_env(&server);

    let (stdout, stderr, success) = run_qh(&config_path, &["init"]);
    assert!(success, "init failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("initialized"));
}

#[test]
fn test_init_idempotent() {
    let server = MockServer::start();
    let (_tmp, config_path) = setup_test_env(&server);

    let (_, _, success1) = run_qh(&config_path, &["init"]);
    assert!(success1, "First init failed");

    let (_, _, success2) = run_qh(&config_path, &["init"]);
    assert!(success2, "Second init failed (not idempotent)");
}

#[test]
fn test_ingest_loads_and_reports() {
    let server = MockServer::start();
    mock_both_categories(&server);
    let (_tmp, config_path) = setup_test_env(&server);

    run_qh(&config_path, &["init"]);
    let (stdout, stderr, success) = run_qh(&config_path, &["ingest"]);
    assert!(
        success,
        "ingest failed: stdout={}, stderr={}",
        stdout, stderr
    );
    assert!(stdout.contains("Love"));
    assert!(stdout.contains("accepted: 2"), "got: {}", stdout);
    assert!(stdout.contains("Courage"));
    assert!(stdout.contains("ok"));
}

#[test]
fn test_ingest_twice_is_idempotent() {
    let server = MockServer::start();
    mock_both_categories(&server);
    let (_tmp, config_path) = setup_test_env(&server);

    run_qh(&config_path, &["init"]);
    run_qh(&config_path, &["ingest"]);

    let (stdout, _, success) = run_qh(&config_path, &["ingest"]);
    assert!(success);
    assert!(
        stdout.contains("accepted 0"),
        "second run should accept nothing, got: {}",
        stdout
    );

    // Stored counts did not grow.
    let (stats, _, _) = run_qh(&config_path, &["stats"]);
    assert!(stats.contains("Quotes:      3"), "got: {}", stats);
}

#[test]
fn test_failing_source_is_isolated() {
    let server = MockServer::start();
    mock_category(
        &server,
        "love",
        json!([{ "content": "Love conquers all", "author": "Virgil" }]),
    );
    server.mock(|when, then| {
        when.method(GET).path("/quotes").query_param("tags", "courage");
        then.status(503);
    });
    let (_tmp, config_path) = setup_test_env(&server);

    run_qh(&config_path, &["init"]);
    let (stdout, _, success) = run_qh(&config_path, &["ingest"]);
    // Partial failure is part of the report, not a process failure.
    assert!(success, "partial failure should still exit 0");
    assert!(stdout.contains("FAILED"), "got: {}", stdout);
    assert!(stdout.contains("503"), "got: {}", stdout);
    assert!(stdout.contains("accepted: 1"), "got: {}", stdout);

    // No dangling Courage category row.
    let (categories, _, _) = run_qh(&config_path, &["categories"]);
    assert!(categories.contains("Love"));
    assert!(!categories.contains("Courage"), "got: {}", categories);
}

#[test]
fn test_ingest_dry_run_writes_nothing() {
    let server = MockServer::start();
    mock_both_categories(&server);
    let (_tmp, config_path) = setup_test_env(&server);

    run_qh(&config_path, &["init"]);
    let (stdout, _, success) = run_qh(&config_path, &["ingest", "--dry-run"]);
    assert!(success);
    assert!(stdout.contains("dry-run"));

    let (categories, _, _) = run_qh(&config_path, &["categories"]);
    assert!(categories.contains("No categories found"), "got: {}", categories);
}

#[test]
fn test_ingest_json_report() {
    let server = MockServer::start();
    mock_both_categories(&server);
    let (_tmp, config_path) = setup_test_env(&server);

    run_qh(&config_path, &["init"]);
    let (stdout, _, success) = run_qh(&config_path, &["ingest", "--json"]);
    assert!(success);

    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["totals"]["accepted"], 3);
    assert_eq!(report["categories"][0]["name"], "Love");
    assert_eq!(report["categories"][0]["status"], "done");
}

#[test]
fn test_ingest_category_filter() {
    let server = MockServer::start();
    mock_both_categories(&server);
    let (_tmp, config_path) = setup_test_env(&server);

    run_qh(&config_path, &["init"]);
    let (stdout, _, success) = run_qh(&config_path, &["ingest", "--category", "love"]);
    assert!(success);
    assert!(stdout.contains("Love"));
    assert!(!stdout.contains("Courage"), "got: {}", stdout);
}

#[test]
fn test_ingest_without_init_fails() {
    let server = MockServer::start();
    mock_both_categories(&server);
    let (_tmp, config_path) = setup_test_env(&server);

    let (_, stderr, success) = run_qh(&config_path, &["ingest"]);
    assert!(!success, "ingest without schema should fail");
    assert!(
        stderr.contains("qh init"),
        "should point at init, got: {}",
        stderr
    );
}

#[test]
fn test_sources_lists_bindings() {
    let server = MockServer::start();
    let (_tmp, config_path) = setup_test_env(&server);

    let (stdout, _, success) = run_qh(&config_path, &["sources"]);
    assert!(success);
    assert!(stdout.contains("Love"));
    assert!(stdout.contains("love"));
    assert!(stdout.contains("Courage"));
}

#[test]
fn test_stats_shows_count_health() {
    let server = MockServer::start();
    mock_both_categories(&server);
    let (_tmp, config_path) = setup_test_env(&server);

    run_qh(&config_path, &["init"]);
    run_qh(&config_path, &["ingest"]);

    let (stdout, _, success) = run_qh(&config_path, &["stats"]);
    assert!(success);
    assert!(stdout.contains("Categories:  2"), "got: {}", stdout);
    assert!(stdout.contains("Quotes:      3"), "got: {}", stdout);
    assert!(stdout.contains("ok"));
    assert!(!stdout.contains("COUNT DRIFT"));
}

#[test]
fn test_add_category_and_listing() {
    let server = MockServer::start();
    let (_tmp, config_path) = setup_test_env(&server);

    run_qh(&config_path, &["init"]);
    let (stdout, _, success) = run_qh(
        &config_path,
        &[
            "add-category",
            "--name",
            "Stoicism",
            "--description",
            "The dichotomy of control",
        ],
    );
    assert!(success, "add-category failed: {}", stdout);
    assert!(stdout.contains("stoicism"), "slug fallback, got: {}", stdout);

    let (categories, _, _) = run_qh(&config_path, &["categories"]);
    assert!(categories.contains("Stoicism"));
}

#[test]
fn test_add_category_refuses_existing_slug() {
    let server = MockServer::start();
    let (_tmp, config_path) = setup_test_env(&server);

    run_qh(&config_path, &["init"]);
    run_qh(&config_path, &["add-category", "--name", "Stoicism"]);

    let (_, stderr, success) = run_qh(
        &config_path,
        &["add-category", "--name", "Stoa", "--slug", "stoicism"],
    );
    assert!(!success, "existing slug must be refused");
    assert!(stderr.contains("already exists"), "got: {}", stderr);
}

#[test]
fn test_add_quote_and_duplicate() {
    let server = MockServer::start();
    let (_tmp, config_path) = setup_test_env(&server);

    run_qh(&config_path, &["init"]);
    run_qh(&config_path, &["add-category", "--name", "Stoicism"]);

    let (stdout, _, success) = run_qh(
        &config_path,
        &[
            "add-quote",
            "--category",
            "stoicism",
            "--text",
            "We suffer more in imagination than in reality",
            "--author",
            "Seneca",
        ],
    );
    assert!(success, "add-quote failed: {}", stdout);
    assert!(stdout.contains("added quote"));

    // Same text modulo case and spacing: a duplicate.
    let (stdout, _, success) = run_qh(
        &config_path,
        &[
            "add-quote",
            "--category",
            "stoicism",
            "--text",
            "we suffer MORE in imagination   than in reality",
            "--author",
            "seneca",
        ],
    );
    assert!(success, "duplicate add-quote should not be a process error");
    assert!(stdout.contains("duplicate"), "got: {}", stdout);

    let (stats, _, _) = run_qh(&config_path, &["stats"]);
    assert!(stats.contains("Quotes:      1"), "got: {}", stats);
}

#[test]
fn test_add_quote_unknown_category() {
    let server = MockServer::start();
    let (_tmp, config_path) = setup_test_env(&server);

    run_qh(&config_path, &["init"]);
    let (_, stderr, success) = run_qh(
        &config_path,
        &["add-quote", "--category", "nope", "--text", "something"],
    );
    assert!(!success);
    assert!(stderr.contains("not found"), "got: {}", stderr);
}

#[test]
fn test_search_finds_and_misses() {
    let server = MockServer::start();
    mock_both_categories(&server);
    let (_tmp, config_path) = setup_test_env(&server);

    run_qh(&config_path, &["init"]);
    run_qh(&config_path, &["ingest"]);

    let (stdout, _, success) = run_qh(&config_path, &["search", "conquers"]);
    assert!(success);
    assert!(stdout.contains("Virgil"), "got: {}", stdout);

    // Case-insensitive.
    let (stdout, _, _) = run_qh(&config_path, &["search", "CONQUERS"]);
    assert!(stdout.contains("Virgil"), "got: {}", stdout);

    let (stdout, _, success) = run_qh(&config_path, &["search", "xyznonexistent"]);
    assert!(success);
    assert!(stdout.contains("No results"));
}

#[test]
fn test_sample_prints_quotes() {
    let server = MockServer::start();
    mock_both_categories(&server);
    let (_tmp, config_path) = setup_test_env(&server);

    run_qh(&config_path, &["init"]);
    run_qh(&config_path, &["ingest"]);

    let (stdout, _, success) = run_qh(&config_path, &["sample", "--limit", "2"]);
    assert!(success);
    assert!(stdout.contains("1."), "got: {}", stdout);
    assert!(stdout.contains("category:"), "got: {}", stdout);
}

#[test]
fn test_clear_requires_confirmation() {
    let server = MockServer::start();
    mock_both_categories(&server);
    let (_tmp, config_path) = setup_test_env(&server);

    run_qh(&config_path, &["init"]);
    run_qh(&config_path, &["ingest"]);

    let (_, stderr, success) = run_qh(&config_path, &["clear"]);
    assert!(!success, "clear without --yes must refuse");
    assert!(stderr.contains("--yes"), "got: {}", stderr);

    let (stdout, _, success) = run_qh(&config_path, &["clear", "--yes"]);
    assert!(success);
    assert!(stdout.contains("cleared"));

    let (categories, _, _) = run_qh(&config_path, &["categories"]);
    assert!(categories.contains("No categories found"));
}

#[test]
fn test_duplicate_slug_in_config_aborts() {
    let server = MockServer::start();
    let (tmp, _) = setup_test_env(&server);

    let config_path = tmp.path().join("config").join("bad.toml");
    fs::write(
        &config_path,
        r#"
[[sources]]
name = "Love"
tag = "love"
slug = "same"

[[sources]]
name = "Courage"
tag = "courage"
slug = "same"
"#,
    )
    .unwrap();

    let (_, stderr, success) = run_qh(&config_path, &["sources"]);
    assert!(!success, "duplicate slugs must abort");
    assert!(stderr.contains("duplicate category slug"), "got: {}", stderr);
}
