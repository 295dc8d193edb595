//! Tests for `mooring resolve` and `mooring targets`.

use crate::support::*;

#[test]
fn test_resolve_single_target_redacts_values() {
    let t = Test::with_secrets(&[("DATABASE_URL", "postgres://prod-db/app")]);
    t.write_config(SINGLE_TARGET);

    let output = t.resolve(&[]);
    assert_success(&output);
    assert_stdout_contains(&output, "ghcr.io/acme/api:1.4.2");
    assert_stdout_contains(&output, "DATABASE_URL");
    assert_stdout_contains(&output, "1 target(s) resolved");
    assert_output_excludes(&output, "postgres://prod-db/app");
}

#[test]
fn test_resolve_json_summary() {
    let t = Test::with_secrets(&[("DATABASE_URL", "postgres://prod-db/app")]);
    t.write_config(SINGLE_TARGET);

    let output = t.resolve(&["--json"]);
    assert_success(&output);
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json[0]["target"], "api");
    assert_eq!(json[0]["port"], 8080);
    assert_eq!(json[0]["env"][1], "DATABASE_URL");
    assert_output_excludes(&output, "postgres://prod-db/app");
}

#[test]
fn test_resolve_missing_local_key_lists_available() {
    let t = Test::with_secrets(&[("API_KEY", "sk-123")]);
    t.write_config(SINGLE_TARGET);

    let output = t.resolve(&[]);
    assert_failure(&output);
    assert_stderr_contains(&output, "DATABASE_URL");
    assert_stderr_contains(&output, "available: API_KEY");
}

#[test]
fn test_single_target_rejects_named_targets() {
    let t = Test::new();
    t.write_config(SINGLE_TARGET);

    let output = t.resolve(&["--targets", "prod"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "prod");
    assert_stderr_contains(&output, "defines no targets");
}

#[test]
fn test_multi_target_requires_selection() {
    let t = Test::new();
    t.write_config(MULTI_TARGET);

    let output = t.resolve(&[]);
    assert_failure(&output);
    assert_stderr_contains(&output, "prod");
    assert_stderr_contains(&output, "staging");
}

#[test]
fn test_multi_target_selection() {
    let t = Test::new();
    t.write_config(MULTI_TARGET);

    let output = t.resolve(&["--targets", "staging"]);
    assert_success(&output);
    assert_stdout_contains(&output, "ghcr.io/acme/api:1.5.0-rc1");
    assert_stdout_contains(&output, "staging.example.com");

    let output = t.resolve(&["--all", "--json"]);
    assert_success(&output);
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json.as_array().unwrap().len(), 2);
    assert_eq!(json[0]["target"], "prod");
    assert_eq!(json[0]["replicas"], 3);

    let output = t.resolve(&["--targets", "qa"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "unknown target 'qa'");
}

#[test]
fn test_config_flag_and_json_document() {
    let t = Test::new();
    let path = t.dir.path().join("deploy.json");
    std::fs::write(
        &path,
        r#"{"name": "web", "server": "s.example.com", "image": {"repository": "nginx"}}"#,
    )
    .unwrap();

    let output = t
        .cmd()
        .args(["--config", path.to_str().unwrap(), "resolve"])
        .output()
        .unwrap();
    assert_success(&output);
    assert_stdout_contains(&output, "nginx:latest");
}

#[test]
fn test_targets_lists_merged_images() {
    let t = Test::new();
    t.write_config(MULTI_TARGET);

    let output = t.targets();
    assert_success(&output);
    assert_stdout_contains(&output, "2 targets");
    assert_stdout_contains(&output, "ghcr.io/acme/api:1.4.2 @ deploy.example.com");
    assert_stdout_contains(&output, "ghcr.io/acme/api:1.5.0-rc1 @ staging.example.com");
}
