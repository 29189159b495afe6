//! Command helper methods for Test.

use super::Test;
use assert_cmd::Command;
use std::process::Output;

impl Test {
    /// An nvolt command bound to this test's identity and server.
    pub fn cmd(&self) -> Command {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("nvolt").expect("failed to find nvolt binary");
        cmd.env("NVOLT_CONFIG", self.config_dir());
        cmd.env("SERVER_BASE_URL", &self.server);
        cmd.env("HOME", self.home.path());
        cmd.env("USERPROFILE", self.home.path());
        cmd.env("NO_COLOR", "1");
        cmd.env_remove("NVOLT_LOG");
        cmd.current_dir(self.dir.path());
        cmd
    }

    pub fn run(&self, args: &[&str]) -> Output {
        self.cmd()
            .args(args)
            .output()
            .expect("failed to run nvolt")
    }

    /// Shortcut for `nvolt init`.
    pub fn init_cmd(&self) -> Output {
        self.run(&["init"])
    }

    /// Shortcut for `nvolt whoami`.
    pub fn whoami(&self) -> Output {
        self.run(&["whoami"])
    }

    /// Machine id from the identity on disk.
    pub fn machine_id(&self) -> String {
        let raw = std::fs::read_to_string(self.config_dir().join("config.json"))
            .expect("config.json should exist");
        let json: serde_json::Value = serde_json::from_str(&raw).expect("config.json is json");
        json["machine_id"].as_str().unwrap_or_default().to_string()
    }
}
