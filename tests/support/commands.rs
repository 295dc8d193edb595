//! Command helper methods for Test.

use super::Test;
use assert_cmd::Command;
use std::process::Output;

impl Test {
    /// Create a mooring command isolated to this environment.
    ///
    /// HOME points at the temporary home and the working directory is the
    /// project directory. Variables that would leak the caller's setup are
    /// removed.
    pub fn cmd(&self) -> Command {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("mooring").expect("failed to find mooring binary");
        cmd.env("HOME", self.home.path());
        cmd.env("USERPROFILE", self.home.path());
        cmd.env("NO_COLOR", "1");
        cmd.env_remove("MOORING_IDENTITY");
        cmd.env_remove("MOORING_CONFIG");
        cmd.env_remove("MOORING_STORE_DIR");
        cmd.env_remove("MOORING_LOG");
        cmd.current_dir(self.dir.path());
        cmd
    }

    fn run(&self, args: &[&str]) -> Output {
        self.cmd()
            .args(args)
            .output()
            .unwrap_or_else(|e| panic!("failed to run mooring {:?}: {}", args, e))
    }

    pub fn secrets_init(&self) -> Output {
        self.run(&["secrets", "init"])
    }

    pub fn set(&self, name: &str, value: &str) -> Output {
        self.run(&["secrets", "set", name, value])
    }

    /// `mooring secrets set NAME` with the value on stdin.
    pub fn set_stdin(&self, name: &str, value: &str) -> Output {
        self.cmd()
            .args(["secrets", "set", name])
            .write_stdin(value)
            .output()
            .expect("failed to run mooring secrets set")
    }

    pub fn get(&self, name: &str) -> Output {
        self.run(&["secrets", "get", name])
    }

    pub fn rm(&self, name: &str) -> Output {
        self.run(&["secrets", "rm", name])
    }

    pub fn list(&self) -> Output {
        self.run(&["secrets", "list"])
    }

    pub fn list_json(&self) -> Output {
        self.run(&["secrets", "list", "--json"])
    }

    pub fn roll(&self) -> Output {
        self.run(&["secrets", "roll"])
    }

    /// `mooring resolve` with extra arguments.
    pub fn resolve(&self, args: &[&str]) -> Output {
        let mut full = vec!["resolve"];
        full.extend_from_slice(args);
        self.run(&full)
    }

    pub fn targets(&self) -> Output {
        self.run(&["targets"])
    }
}
