//! # Dockhand Integration Test Helpers
//!
//! File: cli/tests/common.rs
//!
//! Shared setup for the binary-level tests: a command builder pointing at the
//! compiled `dockhand` binary and an isolated working directory so that no
//! user or project configuration on the host leaks into a test run.

// Different test files use different helpers.
#![allow(dead_code)]

pub use assert_cmd::Command;
use std::fs;
use tempfile::TempDir;

/// Command for the compiled `dockhand` binary.
pub fn dockhand_cmd() -> Command {
    Command::cargo_bin("dockhand").expect("Failed to find dockhand binary for testing")
}

/// A scratch directory acting as both `$HOME` and project root. It contains a
/// `.git` directory so the project config search stops there.
pub struct Sandbox {
    pub dir: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        fs::create_dir(dir.path().join(".git")).expect("Failed to create .git");
        Sandbox { dir }
    }

    pub fn write_project_config(&self, content: &str) {
        fs::write(self.dir.path().join(".dockhand.toml"), content)
            .expect("Failed to write project config");
    }

    /// `dockhand` running inside the sandbox with a clean environment.
    pub fn cmd(&self) -> Command {
        let mut cmd = dockhand_cmd();
        cmd.current_dir(self.dir.path())
            .env("HOME", self.dir.path())
            .env("XDG_CONFIG_HOME", self.dir.path().join(".config"))
            .env_remove("DOCKER_HOST")
            .env_remove("RUST_LOG");
        cmd
    }
}
