//! Tests for `mooring secrets` commands.

use crate::support::*;
use std::fs;

#[test]
fn test_init_creates_store_files() {
    let t = Test::new();

    let output = t.secrets_init();
    assert_success(&output);
    assert_stdout_contains(&output, "age1");

    let dir = t.store_dir();
    assert!(dir.join("identity.key").exists());
    assert!(dir.join("recipient.pub").exists());
    assert!(dir.join("secrets.json").exists());
}

#[test]
fn test_init_twice_fails() {
    let t = Test::init();

    let output = t.secrets_init();
    assert_failure(&output);
    assert_stderr_contains(&output, "already initialized");
}

#[test]
fn test_set_and_get_roundtrip() {
    let t = Test::init();
    for (name, value) in STANDARD_SECRETS {
        assert_roundtrip(&t, name, value);
    }
}

#[test]
fn test_set_from_stdin() {
    let t = Test::init();

    assert_success(&t.set_stdin("TOKEN", "from-stdin\n"));
    let output = t.get("TOKEN");
    assert_success(&output);
    assert_eq!(stdout(&output), "from-stdin\n");
}

#[test]
fn test_plaintext_not_on_disk() {
    let t = Test::with_secrets(STANDARD_SECRETS);

    let records = fs::read_to_string(t.store_dir().join("secrets.json")).unwrap();
    for (name, value) in STANDARD_SECRETS {
        assert!(records.contains(name));
        assert!(!records.contains(value), "plaintext for {} on disk", name);
    }
}

#[test]
fn test_set_without_init_fails_with_hint() {
    let t = Test::new();

    let output = t.set("KEY", "VALUE");
    assert_failure(&output);
    assert_stderr_contains(&output, "not initialized");
    assert_stderr_contains(&output, "mooring secrets init");
}

#[test]
fn test_invalid_names_rejected() {
    let t = Test::init();

    assert_failure(&t.set("123BAD", "value"));
    assert_failure(&t.set("has.dot", "value"));
    assert_failure(&t.set("EMPTY", ""));
}

#[test]
fn test_get_missing_suggests_name() {
    let t = Test::with_secrets(&[("DATABASE_URL", "x")]);

    let output = t.get("DATABSE_URL");
    assert_failure(&output);
    assert_stderr_contains(&output, "DATABASE_URL");
}

#[test]
fn test_list_and_rm() {
    let t = Test::with_secrets(STANDARD_SECRETS);

    let output = t.list();
    assert_success(&output);
    assert_stdout_contains(&output, "3 secrets");
    assert_stdout_contains(&output, "JWT_SECRET");

    assert_success(&t.rm("JWT_SECRET"));
    let output = t.list_json();
    assert_success(&output);

    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["count"], 2);
    let names: Vec<&str> = json["secrets"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["API_KEY", "DATABASE_URL"]);

    assert_failure(&t.rm("JWT_SECRET"));
}

#[test]
fn test_list_empty() {
    let t = Test::init();
    assert_stdout_contains(&t.list(), "no secrets stored");
}

#[test]
fn test_roll_changes_recipient_and_keeps_values() {
    let t = Test::with_secrets(STANDARD_SECRETS);
    let recipient = t.store_dir().join("recipient.pub");
    let before = fs::read_to_string(&recipient).unwrap();

    let output = t.roll();
    assert_success(&output);
    assert_stdout_contains(&output, "rolled 3 secrets");

    let after = fs::read_to_string(&recipient).unwrap();
    assert_ne!(before, after);

    for (name, value) in STANDARD_SECRETS {
        let output = t.get(name);
        assert_success(&output);
        assert_stdout_contains(&output, value);
    }

    let archived: Vec<_> = fs::read_dir(t.store_dir().join("archive"))
        .unwrap()
        .collect();
    assert_eq!(archived.len(), 1);
}

#[test]
fn test_identity_from_env() {
    let t = Test::with_secrets(&[("API_KEY", "sk-123")]);
    let identity = fs::read_to_string(t.store_dir().join("identity.key")).unwrap();
    fs::remove_file(t.store_dir().join("identity.key")).unwrap();

    assert_failure(&t.get("API_KEY"));

    let output = t
        .cmd()
        .env("MOORING_IDENTITY", identity.trim())
        .args(["secrets", "get", "API_KEY"])
        .output()
        .unwrap();
    assert_success(&output);
    assert_stdout_contains(&output, "sk-123");
}
