//! Integration tests for CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn fixture(name: &str) -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
        .to_str()
        .expect("utf8 path")
        .to_string()
}

fn propconf() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("propconf"));
    cmd.env_remove("PROPCONF_ENVIRONMENT").env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_cli_version() {
    let mut cmd = propconf();
    cmd.arg("--version");
    cmd.assert().success().stdout(predicate::str::contains("propconf"));
}

#[test]
fn test_cli_help() {
    let mut cmd = propconf();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Layered property-file configuration"))
        .stdout(predicate::str::contains("get"))
        .stdout(predicate::str::contains("keys"))
        .stdout(predicate::str::contains("dump"))
        .stdout(predicate::str::contains("subset"));
}

#[test]
fn test_get_resolves_placeholders() {
    let mut cmd = propconf();
    cmd.args(["get", "server.url", "--root", fixture("layered").as_str()]);
    cmd.assert().success().stdout("http://app.internal:8080\n");
}

#[test]
fn test_get_raw_and_origin() {
    let mut cmd = propconf();
    cmd.args(["get", "server.url", "--raw", "--origin", "--root", fixture("layered").as_str()]);
    cmd.assert()
        .success()
        .stdout("http://${server.host}:${server.port} [propconf-defaults.properties]\n");
}

#[test]
fn test_get_with_environment_suffix() {
    let mut cmd = propconf();
    cmd.args(["get", "server.url", "--env", "prod", "--root", fixture("layered").as_str()]);
    cmd.assert().success().stdout("http://example.com:443\n");
}

#[test]
fn test_environment_variable_sets_suffix() {
    let mut cmd = propconf();
    cmd.env("PROPCONF_ENVIRONMENT", "prod");
    cmd.args(["get", "server.host", "--root", fixture("layered").as_str()]);
    cmd.assert().success().stdout("example.com\n");
}

#[test]
fn test_get_missing_key_fails() {
    let mut cmd = propconf();
    cmd.args(["get", "no.such.key", "--root", fixture("layered").as_str()]);
    cmd.assert().failure().stderr(predicate::str::contains("Key not found: no.such.key"));
}

#[test]
fn test_keys_with_prefix() {
    let mut cmd = propconf();
    cmd.args(["keys", "--prefix", "db.", "--root", fixture("layered").as_str()]);
    cmd.assert().success().stdout("db.pool.size\ndb.pool.timeout\n");
}

#[test]
fn test_subset_truncated() {
    let mut cmd = propconf();
    cmd.args(["subset", "db.pool.", "--truncate", "--root", fixture("layered").as_str()]);
    cmd.assert().success().stdout("size=2\ntimeout=30\n");
}

#[test]
fn test_subset_json() {
    let mut cmd = propconf();
    cmd.args(["subset", "db.", "--json", "--root", fixture("layered").as_str()]);
    let output = cmd.assert().success().get_output().stdout.clone();
    let parsed: serde_json::Value = serde_json::from_slice(&output).expect("json output");
    assert_eq!(parsed["db.pool.size"], "2");
    assert_eq!(parsed["db.pool.timeout"], "30");
}

#[test]
fn test_dump_lists_origins() {
    let mut cmd = propconf();
    cmd.args(["dump", "--root", fixture("layered").as_str()]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("db.pool.size=2 [propconf-local.properties]"))
        .stdout(predicate::str::contains("app.name=propconf-demo [propconf-defaults.properties]"));
}

#[test]
fn test_dump_json_reports_resolved_and_raw() {
    let mut cmd = propconf();
    cmd.args(["dump", "--json", "--root", fixture("layered").as_str()]);
    let output = cmd.assert().success().get_output().stdout.clone();
    let entries: Vec<serde_json::Value> = serde_json::from_slice(&output).expect("json output");
    let url = entries.iter().find(|e| e["key"] == "server.url").expect("server.url entry");
    assert_eq!(url["value"], "http://app.internal:8080");
    assert_eq!(url["raw"], "http://${server.host}:${server.port}");
    assert_eq!(url["origin"], "propconf-defaults.properties");
}

#[test]
fn test_explicit_resources_replace_default_order() {
    let mut cmd = propconf();
    cmd.args([
        "get",
        "test.definedBeforeInclude",
        "--resources",
        "configuration-test.properties",
        "--root",
        fixture("defaults").as_str(),
    ]);
    cmd.assert().success().stdout("includeValue\n");
}

#[test]
fn test_invalid_resource_reports_line() {
    let mut cmd = propconf();
    cmd.args(["keys", "--root", fixture("invalid").as_str()]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"))
        .stderr(predicate::str::contains("line 2"));
}

#[test]
fn test_include_cycle_is_reported() {
    let tmp = TempDir::new().expect("temp dir");
    fs::write(tmp.path().join("propconf-app.properties"), "a=1\ninclude=loop.properties\n")
        .expect("write app");
    fs::write(tmp.path().join("loop.properties"), "include=propconf-app.properties\n")
        .expect("write loop");

    let mut cmd = propconf();
    cmd.args(["keys", "--root", tmp.path().to_str().expect("utf8 path")]);
    cmd.assert().failure().stderr(predicate::str::contains("include cycle detected"));
}

#[test]
fn test_runs_from_current_directory() {
    let mut cmd = propconf();
    cmd.current_dir(fixture("reordered"));
    cmd.args(["get", "greeting"]);
    cmd.assert().success().stdout("hello qa\n");
}
