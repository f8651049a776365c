// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Slash-command deployment via the bot's own deploy scripts.

use std::fmt;
use std::time::Duration;

use botctl_adapters::subprocess::{run_checked, SubprocessError};
use botctl_core::config::DeployConfig;
use botctl_core::{credentials, CommandSpec, Paths, Strictness};
use thiserror::Error;
use tokio::process::Command;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployTarget {
    /// Register commands in the configured guild only (instant).
    Guild,
    /// Register commands for every guild (propagation may take a while).
    Global,
}

impl fmt::Display for DeployTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeployTarget::Guild => f.write_str("guild"),
            DeployTarget::Global => f.write_str("global"),
        }
    }
}

#[derive(Debug, Error)]
pub enum DeployError {
    #[error("credentials are missing or still placeholders")]
    InvalidConfig,

    #[error(transparent)]
    Subprocess(#[from] SubprocessError),
}

/// Run the deploy command for `target`. Returns its stdout.
pub async fn deploy_commands(
    target: DeployTarget,
    config: &DeployConfig,
    paths: &Paths,
    strictness: Strictness,
    timeout: Duration,
) -> Result<String, DeployError> {
    if !credentials::is_valid_file(&paths.env_file, strictness) {
        return Err(DeployError::InvalidConfig);
    }
    let spec: &CommandSpec = match target {
        DeployTarget::Guild => &config.guild,
        DeployTarget::Global => &config.global,
    };

    let mut cmd = Command::new(&spec.command);
    cmd.args(&spec.args).current_dir(&paths.work_dir);
    let description = format!("{target} deploy ({})", spec.display());
    tracing::info!(target: "system", scope = %target, command = %spec.display(), "deploying commands");

    match run_checked(cmd, timeout, &description).await {
        Ok(output) => {
            tracing::info!(scope = %target, "commands deployed");
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        }
        Err(e) => {
            tracing::error!(scope = %target, error = %e, "deploy failed");
            Err(e.into())
        }
    }
}

#[cfg(test)]
#[path = "deploy_tests.rs"]
mod tests;
