// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Manager configuration (`botctl.toml`) and the derived file layout.
//!
//! Every field has a default, so the file is optional and may be partial.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::credentials::Strictness;

pub const CONFIG_FILE: &str = "botctl.toml";
/// Private state directory inside the working directory. Excluded from the
/// untracked-file clean during updates.
pub const STATE_DIR: &str = ".botctl";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not determine working directory")]
    NoWorkDir,
    #[error("IO error reading {0}: {1}")]
    Io(PathBuf, std::io::Error),
    #[error("invalid {0}: {1}")]
    Parse(PathBuf, toml::de::Error),
}

/// A program plus its arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(command: impl Into<String>, args: &[&str]) -> Self {
        Self { command: command.into(), args: args.iter().map(|s| s.to_string()).collect() }
    }

    /// Render for log lines and error messages.
    pub fn display(&self) -> String {
        std::iter::once(self.command.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    pub guild: CommandSpec,
    pub global: CommandSpec,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            guild: CommandSpec::new("node", &["deploy-commands.js"]),
            global: CommandSpec::new("node", &["deploy-commands-global.js"]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateConfig {
    /// Remote repository URL. Empty means "use the existing origin".
    pub remote: String,
    pub branch: String,
    /// Copied to a temporary location before anything else; last-resort
    /// recovery if the main snapshot turns out to be unusable.
    pub critical_files: Vec<String>,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            remote: String::new(),
            branch: "main".to_string(),
            critical_files: vec!["package.json".to_string(), "index.js".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageConfig {
    pub program: String,
    /// Directory whose presence means dependencies are installed.
    pub deps_dir: String,
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self { program: "npm".to_string(), deps_dir: "node_modules".to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupConfig {
    pub include_manifests: bool,
    pub manifests: Vec<String>,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            include_manifests: false,
            manifests: vec!["package.json".to_string(), "package-lock.json".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    pub git_secs: u64,
    pub install_secs: u64,
    pub stop_secs: u64,
    pub deploy_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { git_secs: 120, install_secs: 600, stop_secs: 10, deploy_secs: 120 }
    }
}

impl Timeouts {
    pub fn git(&self) -> Duration {
        Duration::from_secs(self.git_secs)
    }

    pub fn install(&self) -> Duration {
        Duration::from_secs(self.install_secs)
    }

    pub fn stop(&self) -> Duration {
        Duration::from_secs(self.stop_secs)
    }

    pub fn deploy(&self) -> Duration {
        Duration::from_secs(self.deploy_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub strict_token: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self { strict_token: true }
    }
}

/// Contents of `botctl.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub bot: CommandSpec,
    pub deploy: DeployConfig,
    pub update: UpdateConfig,
    pub packages: PackageConfig,
    pub backup: BackupConfig,
    pub timeouts: Timeouts,
    pub validation: ValidationConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bot: CommandSpec::new("node", &["index.js"]),
            deploy: DeployConfig::default(),
            update: UpdateConfig::default(),
            packages: PackageConfig::default(),
            backup: BackupConfig::default(),
            timeouts: Timeouts::default(),
            validation: ValidationConfig::default(),
        }
    }
}

impl Config {
    /// Load `botctl.toml` from the working directory (defaults if absent),
    /// then apply environment overrides.
    pub fn load(work_dir: &Path) -> Result<Self, ConfigError> {
        let path = work_dir.join(CONFIG_FILE);
        let mut config = match std::fs::read_to_string(&path) {
            Ok(contents) => Self::parse(&path, &contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => return Err(ConfigError::Io(path, e)),
        };
        if let Some(remote) = crate::env::remote_override() {
            config.update.remote = remote;
        }
        if let Some(branch) = crate::env::branch_override() {
            config.update.branch = branch;
        }
        Ok(config)
    }

    pub fn parse(path: &Path, contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))
    }

    pub fn strictness(&self) -> Strictness {
        if self.validation.strict_token {
            Strictness::Strict
        } else {
            Strictness::Lenient
        }
    }
}

/// Every file location the manager touches, derived from the working dir.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    /// Bot installation (a git checkout once updates have run)
    pub work_dir: PathBuf,
    /// Credentials file
    pub env_file: PathBuf,
    /// Process record
    pub pid_file: PathBuf,
    /// Update settings
    pub update_state: PathBuf,
    /// Private manager state (`.botctl/`)
    pub state_dir: PathBuf,
    pub backups_dir: PathBuf,
    /// Temporary critical-file snapshots during an update
    pub tmp_dir: PathBuf,
    pub logs_dir: PathBuf,
    /// Manager log
    pub log_file: PathBuf,
    /// Bot stdout/stderr
    pub bot_log: PathBuf,
    /// Advisory lock for mutating commands
    pub lock_file: PathBuf,
}

impl Paths {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        let work_dir = work_dir.into();
        let state_dir = work_dir.join(STATE_DIR);
        let logs_dir = state_dir.join("logs");
        Self {
            env_file: work_dir.join(".env"),
            pid_file: work_dir.join("bot.pid"),
            update_state: work_dir.join("update-state.json"),
            backups_dir: state_dir.join("backups"),
            tmp_dir: state_dir.join("tmp"),
            log_file: logs_dir.join("botctl.log"),
            bot_log: logs_dir.join("bot.log"),
            lock_file: state_dir.join("botctl.lock"),
            logs_dir,
            state_dir,
            work_dir,
        }
    }

    /// Working-directory-relative names of the files a snapshot captures.
    pub fn backup_allow_list(&self, backup: &BackupConfig) -> Vec<String> {
        let mut names: Vec<String> = [&self.env_file, &self.pid_file, &self.update_state]
            .iter()
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .collect();
        if backup.include_manifests {
            names.extend(backup.manifests.iter().cloned());
        }
        names
    }

    /// Files that are local runtime state and never count as an update.
    pub fn update_ignore_list(&self) -> Vec<String> {
        let mut names = self.backup_allow_list(&BackupConfig::default());
        names.extend(Self::clean_excludes());
        names
    }

    /// Untracked paths an update's clean step must leave alone.
    pub fn clean_excludes() -> Vec<String> {
        vec![STATE_DIR.to_string(), CONFIG_FILE.to_string()]
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
