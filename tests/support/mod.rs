//! Test support utilities for nvolt integration tests.

#![allow(dead_code)]

pub mod assertions;
pub mod commands;

#[allow(unused_imports)]
pub use assertions::*;

use std::path::PathBuf;

use tempfile::TempDir;

/// Test environment with an isolated identity directory.
///
/// Child processes get `NVOLT_CONFIG` pointing into the temp dir, so tests
/// never touch the real `~/.nvolt` and can run in parallel.
pub struct Test {
    /// Working directory for the child process
    pub dir: TempDir,
    /// Holds the identity directory
    pub home: TempDir,
    /// Server the child process talks to
    pub server: String,
}

impl Test {
    pub fn new() -> Self {
        Self::with_server("http://127.0.0.1:9")
    }

    /// Point the child process at `server`.
    pub fn with_server(server: &str) -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let home = TempDir::new().expect("failed to create temp home");
        Self {
            dir,
            home,
            server: server.to_string(),
        }
    }

    /// Create a test environment with an identity initialized.
    pub fn init() -> Self {
        Self::init_with_server("http://127.0.0.1:9")
    }

    pub fn init_with_server(server: &str) -> Self {
        let t = Self::with_server(server);
        let output = t.init_cmd();
        assert!(
            output.status.success(),
            "Failed to initialize identity: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        t
    }

    pub fn config_dir(&self) -> PathBuf {
        self.home.path().join("nvolt")
    }
}
