//! Tests for error reporting and global flags.

use crate::support::*;

#[test]
fn test_help_lists_commands() {
    let t = Test::new();

    let output = t.cmd().arg("--help").output().unwrap();
    assert_success(&output);
    let out = stdout(&output);
    assert!(out.contains("resolve"));
    assert!(out.contains("secrets"));
}

#[test]
fn test_unknown_command_fails() {
    let t = Test::new();
    assert_failure(&t.cmd().arg("unknown-command").output().unwrap());
}

#[test]
fn test_version_flag() {
    let t = Test::new();

    let output = t.cmd().arg("--version").output().unwrap();
    assert_success(&output);
    assert_stdout_contains(&output, "mooring");
}

#[test]
fn test_missing_config_hints() {
    let t = Test::new();

    let output = t.resolve(&[]);
    assert_failure(&output);
    assert_stderr_contains(&output, "config file not found");
    assert_stderr_contains(&output, "--config");
}

#[test]
fn test_unsupported_config_extension() {
    let t = Test::new();
    let path = t.dir.path().join("mooring.yaml");
    std::fs::write(&path, "name: api").unwrap();

    let output = t
        .cmd()
        .args(["--config", path.to_str().unwrap(), "targets"])
        .output()
        .unwrap();
    assert_failure(&output);
    assert_stderr_contains(&output, "unsupported config format");
}

#[test]
fn test_verbose_logs_to_stderr_only() {
    let t = Test::init();
    assert_success(&t.set("API_KEY", "sk-verbose-secret"));

    let output = t
        .cmd()
        .args(["--verbose", "secrets", "list"])
        .output()
        .unwrap();
    assert_success(&output);
    assert_output_excludes(&output, "sk-verbose-secret");
}

#[test]
fn test_store_dir_flag() {
    let t = Test::new();
    let dir = t.dir.path().join("store");

    let output = t
        .cmd()
        .args(["--store-dir", dir.to_str().unwrap(), "secrets", "init"])
        .output()
        .unwrap();
    assert_success(&output);
    assert!(dir.join("identity.key").exists());
    assert!(!t.store_dir().exists());
}
