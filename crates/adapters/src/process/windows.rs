// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Windows process control via tasklist/taskkill.
//!
//! Windows has no graceful default comparable to SIGTERM for a detached
//! console process, so termination is a forced tree-kill.

use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use super::{spawn_detached_command, ProcessController, ProcessError, SpawnRequest};
use crate::subprocess::{run_checked, run_with_timeout};

const TASK_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Copy, Debug, Default)]
pub struct TaskController;

impl TaskController {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessController for TaskController {
    async fn spawn_detached(&self, req: &SpawnRequest) -> Result<u32, ProcessError> {
        spawn_detached_command(req)
    }

    async fn is_alive(&self, pid: u32) -> Result<bool, ProcessError> {
        let mut cmd = Command::new("tasklist");
        cmd.args(["/FI", &format!("PID eq {pid}"), "/NH", "/FO", "CSV"]);
        let output = run_with_timeout(cmd, TASK_TIMEOUT, "tasklist")
            .await
            .map_err(|e| ProcessError::LivenessCheckFailed { pid, reason: e.to_string() })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ProcessError::LivenessCheckFailed { pid, reason: stderr.trim().to_string() });
        }
        let needle = format!("\"{pid}\"");
        Ok(String::from_utf8_lossy(&output.stdout).contains(&needle))
    }

    async fn terminate(&self, pid: u32) -> Result<(), ProcessError> {
        let mut cmd = Command::new("taskkill");
        cmd.args(["/PID", &pid.to_string(), "/F", "/T"]);
        run_checked(cmd, TASK_TIMEOUT, "taskkill")
            .await
            .map(|_| ())
            .map_err(|e| ProcessError::TerminateFailed { pid, reason: e.to_string() })
    }
}
