//! Shared helpers for CLI tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Output;

/// Passes strict token validation.
pub const VALID_TOKEN: &str =
    "MTAxMjM0NTY3ODkwMTIzNDU2Nw.GaBcDe.abcdefghijklmnopqrstuvwxyz0123456789AB";
pub const CLIENT_ID: &str = "123456789012345678";
pub const GUILD_ID: &str = "876543210987654321";

pub const PLACEHOLDER_ENV: &str =
    "DISCORD_TOKEN=your_bot_token_here\nCLIENT_ID=your_client_id_here\nGUILD_ID=your_guild_id_here\n";

/// Bot is a long `sleep`; no managed dependency directory.
pub const SLEEPING_BOT_CONFIG: &str = r#"
[bot]
command = "sleep"
args = ["30"]

[packages]
deps_dir = ""

[timeouts]
stop_secs = 2
"#;

/// `botctl` with no bot directory.
pub fn cli() -> CliBuilder {
    CliBuilder::new(None)
}

/// A scratch bot working directory.
pub struct Project {
    dir: tempfile::TempDir,
}

impl Project {
    pub fn empty() -> Self {
        Self { dir: tempfile::tempdir().unwrap() }
    }

    /// A project running [`SLEEPING_BOT_CONFIG`] with placeholder credentials.
    pub fn sleeping_bot() -> Self {
        let project = Self::empty();
        project.file("botctl.toml", SLEEPING_BOT_CONFIG);
        project.file(".env", PLACEHOLDER_ENV);
        project
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn join(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    pub fn file(&self, rel: &str, contents: &str) -> &Self {
        let path = self.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, contents).unwrap();
        self
    }

    pub fn read(&self, rel: &str) -> String {
        std::fs::read_to_string(self.join(rel)).unwrap()
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.join(rel).exists()
    }

    pub fn botctl(&self) -> CliBuilder {
        CliBuilder::new(Some(self.path()))
    }

    pub fn configure_valid(&self) {
        self.botctl()
            .args(&["configure", "--token", VALID_TOKEN, "--client-id", CLIENT_ID, "--guild-id", GUILD_ID])
            .passes();
    }
}

impl Drop for Project {
    /// Never leave a spawned bot behind when a test fails midway.
    fn drop(&mut self) {
        let Ok(pid) = std::fs::read_to_string(self.join("bot.pid")) else {
            return;
        };
        let _ = std::process::Command::new("kill").arg(pid.trim()).status();
    }
}

pub struct CliBuilder {
    cmd: assert_cmd::Command,
}

impl CliBuilder {
    fn new(dir: Option<&Path>) -> Self {
        let mut cmd = assert_cmd::Command::cargo_bin("botctl").unwrap();
        cmd.env("NO_COLOR", "1").env_remove("COLOR").env_remove("BOTCTL_REMOTE").env_remove("BOTCTL_BRANCH");
        if let Some(dir) = dir {
            cmd.env("BOTCTL_DIR", dir).current_dir(dir);
        }
        Self { cmd }
    }

    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn passes(mut self) -> RunAssert {
        let output = self.cmd.output().unwrap();
        let run = RunAssert { output };
        assert!(run.output.status.success(), "expected success\n{}", run.describe());
        run
    }

    pub fn fails(mut self) -> RunAssert {
        let output = self.cmd.output().unwrap();
        let run = RunAssert { output };
        assert!(!run.output.status.success(), "expected failure\n{}", run.describe());
        run
    }

    pub fn fails_with(self, code: i32) -> RunAssert {
        let run = self.fails();
        assert_eq!(run.output.status.code(), Some(code), "{}", run.describe());
        run
    }
}

pub struct RunAssert {
    output: Output,
}

impl RunAssert {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.output.stdout).unwrap()
    }

    pub fn stdout_has(&self, needle: &str) -> &Self {
        assert!(self.stdout().contains(needle), "stdout missing {needle:?}\n{}", self.describe());
        self
    }

    pub fn stderr_has(&self, needle: &str) -> &Self {
        assert!(self.stderr().contains(needle), "stderr missing {needle:?}\n{}", self.describe());
        self
    }

    fn describe(&self) -> String {
        format!(
            "status: {:?}\n--- stdout ---\n{}\n--- stderr ---\n{}",
            self.output.status,
            self.stdout(),
            self.stderr()
        )
    }
}
