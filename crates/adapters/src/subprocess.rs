// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded subprocess execution.
//!
//! Every external tool (git, the package manager, deploy scripts, tasklist)
//! runs through [`run_with_timeout`] so a hung child can never block the
//! manager forever.

use std::process::{Output, Stdio};
use std::time::Duration;

use thiserror::Error;
use tokio::process::Command;

/// Timeout for `--version` style availability probes
pub const TOOL_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum SubprocessError {
    #[error("failed to spawn {description}: {source}")]
    Spawn {
        description: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{description} timed out after {}s", .timeout.as_secs())]
    TimedOut { description: String, timeout: Duration },

    #[error("{description} failed ({}): {stderr}", exit_label(.code))]
    Failed { description: String, code: Option<i32>, stderr: String },
}

fn exit_label(code: &Option<i32>) -> String {
    code.map_or_else(|| "killed by signal".to_string(), |c| format!("exit {c}"))
}

/// Run a command to completion, killing it if it exceeds `timeout`.
///
/// Returns the raw output regardless of exit status; use [`check_success`]
/// when a non-zero exit is an error.
pub async fn run_with_timeout(
    mut cmd: Command,
    timeout: Duration,
    description: &str,
) -> Result<Output, SubprocessError> {
    cmd.stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::piped()).kill_on_drop(true);
    tracing::debug!(%description, "running subprocess");
    let child = cmd
        .spawn()
        .map_err(|source| SubprocessError::Spawn { description: description.to_string(), source })?;

    match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(source)) => {
            Err(SubprocessError::Spawn { description: description.to_string(), source })
        }
        Err(_) => {
            tracing::warn!(%description, timeout_secs = timeout.as_secs(), "subprocess timed out");
            Err(SubprocessError::TimedOut { description: description.to_string(), timeout })
        }
    }
}

/// Turn a non-zero exit into [`SubprocessError::Failed`].
pub fn check_success(output: Output, description: &str) -> Result<Output, SubprocessError> {
    if output.status.success() {
        return Ok(output);
    }
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    Err(SubprocessError::Failed {
        description: description.to_string(),
        code: output.status.code(),
        stderr,
    })
}

/// Run and require success.
pub async fn run_checked(
    cmd: Command,
    timeout: Duration,
    description: &str,
) -> Result<Output, SubprocessError> {
    let output = run_with_timeout(cmd, timeout, description).await?;
    check_success(output, description)
}

/// Whether `program --version` runs and exits zero.
pub async fn tool_available(program: &str) -> bool {
    let mut cmd = Command::new(program);
    cmd.arg("--version");
    let description = format!("{program} --version");
    match run_with_timeout(cmd, TOOL_PROBE_TIMEOUT, &description).await {
        Ok(output) => output.status.success(),
        Err(e) => {
            tracing::debug!(%program, error = %e, "tool not available");
            false
        }
    }
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
