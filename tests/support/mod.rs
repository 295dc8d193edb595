//! Test support utilities for mooring integration tests.
//!
//! Provides an isolated environment and helper commands.

#![allow(dead_code)]

pub mod assertions;
pub mod commands;
pub mod fixtures;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;

use std::path::PathBuf;

use tempfile::TempDir;

/// Test environment with isolated temp directories.
///
/// Child processes get `HOME` pointed at `home` and run in `dir`, so tests
/// never touch the real secret store and can run in parallel.
pub struct Test {
    /// Project directory holding mooring.toml
    pub dir: TempDir,
    /// Temporary home directory
    pub home: TempDir,
}

impl Test {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let home = TempDir::new().expect("failed to create temp home");
        Self { dir, home }
    }

    /// Create a test environment with the secret store initialized.
    pub fn init() -> Self {
        let t = Self::new();
        let output = t.secrets_init();
        assert!(
            output.status.success(),
            "Failed to initialize store: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        t
    }

    /// Create a test environment with the store initialized and secrets set.
    pub fn with_secrets(secrets: &[(&str, &str)]) -> Self {
        let t = Self::init();
        for (k, v) in secrets {
            let output = t.set(k, v);
            assert!(
                output.status.success(),
                "Failed to set secret {}: {}",
                k,
                String::from_utf8_lossy(&output.stderr)
            );
        }
        t
    }

    /// Default store directory under the temp home.
    pub fn store_dir(&self) -> PathBuf {
        self.home.path().join(".mooring").join("secrets")
    }

    /// Write `mooring.toml` in the project directory.
    pub fn write_config(&self, contents: &str) -> PathBuf {
        let path = self.dir.path().join("mooring.toml");
        std::fs::write(&path, contents).expect("failed to write mooring.toml");
        path
    }
}
