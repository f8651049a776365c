// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Platform process control behind one capability.
//!
//! The supervisor only ever needs three things from the OS: start a
//! detached process, ask whether a pid is alive, and ask it to terminate.
//! POSIX uses signals; Windows uses tasklist/taskkill. The implementation is
//! picked once via [`NativeController`].

#[cfg(unix)]
mod unix;
#[cfg(windows)]
mod windows;

#[cfg(unix)]
pub use unix::SignalController;
#[cfg(windows)]
pub use windows::TaskController;

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use botctl_core::CommandSpec;
use thiserror::Error;

/// Controller for the current platform.
#[cfg(unix)]
pub type NativeController = SignalController;
#[cfg(windows)]
pub type NativeController = TaskController;

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to spawn {command}: {reason}")]
    SpawnFailed { command: String, reason: String },

    #[error("failed to terminate pid {pid}: {reason}")]
    TerminateFailed { pid: u32, reason: String },

    #[error("cannot tell whether pid {pid} is alive: {reason}")]
    LivenessCheckFailed { pid: u32, reason: String },
}

/// What to launch and where its output goes.
#[derive(Debug, Clone)]
pub struct SpawnRequest {
    pub command: CommandSpec,
    pub cwd: PathBuf,
    /// Append stdout/stderr here; `None` discards output.
    pub log_path: Option<PathBuf>,
}

/// OS-level process control used by the supervisor.
#[async_trait]
pub trait ProcessController: Clone + Send + Sync + 'static {
    /// Start the process detached from the manager's session and return its pid.
    async fn spawn_detached(&self, req: &SpawnRequest) -> Result<u32, ProcessError>;

    /// Liveness probe. Sends no functional signal.
    ///
    /// `Err` means the OS could not be asked; callers must not read it as
    /// "not alive".
    async fn is_alive(&self, pid: u32) -> Result<bool, ProcessError>;

    /// Ask the process to exit (SIGTERM on POSIX, tree-kill on Windows).
    /// A pid that no longer exists counts as success.
    async fn terminate(&self, pid: u32) -> Result<(), ProcessError>;
}

/// Spawn `req` so it outlives the manager.
///
/// On POSIX the child gets its own process group so terminal signals aimed
/// at the manager do not reach it. A background task reaps the child if it
/// exits while the manager is still running.
pub(crate) fn spawn_detached_command(req: &SpawnRequest) -> Result<u32, ProcessError> {
    let display = req.command.display();
    let spawn_err = |reason: String| ProcessError::SpawnFailed { command: display.clone(), reason };

    let mut cmd = tokio::process::Command::new(&req.command.command);
    cmd.args(&req.command.args).current_dir(&req.cwd).stdin(Stdio::null());

    match &req.log_path {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| spawn_err(e.to_string()))?;
            }
            let log = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| spawn_err(format!("cannot open {}: {e}", path.display())))?;
            let log_err = log.try_clone().map_err(|e| spawn_err(e.to_string()))?;
            cmd.stdout(Stdio::from(log)).stderr(Stdio::from(log_err));
        }
        None => {
            cmd.stdout(Stdio::null()).stderr(Stdio::null());
        }
    }

    #[cfg(unix)]
    cmd.process_group(0);

    #[cfg(windows)]
    {
        const DETACHED_PROCESS: u32 = 0x0000_0008;
        const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;
        cmd.creation_flags(DETACHED_PROCESS | CREATE_NEW_PROCESS_GROUP);
    }

    let mut child = cmd.spawn().map_err(|e| spawn_err(e.to_string()))?;
    let pid = child.id().ok_or_else(|| spawn_err("process exited before reporting a pid".into()))?;

    tokio::spawn(async move {
        match child.wait().await {
            Ok(status) => tracing::info!(pid, %status, "bot process exited"),
            Err(e) => tracing::warn!(pid, error = %e, "failed to reap bot process"),
        }
    });

    Ok(pid)
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{ProcessController, ProcessError, SpawnRequest};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::BTreeSet;
    use std::sync::Arc;

    /// Recorded controller call
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum ProcessCall {
        Spawn { command: String },
        Terminate { pid: u32 },
    }

    struct FakeProcessState {
        next_pid: u32,
        alive: BTreeSet<u32>,
        fail_spawn: Option<String>,
        fail_terminate: Option<String>,
        fail_liveness_check: Option<String>,
        survive_terminate: bool,
        calls: Vec<ProcessCall>,
    }

    /// In-memory process table for supervisor tests
    #[derive(Clone)]
    pub struct FakeProcessController {
        inner: Arc<Mutex<FakeProcessState>>,
    }

    impl Default for FakeProcessController {
        fn default() -> Self {
            Self {
                inner: Arc::new(Mutex::new(FakeProcessState {
                    next_pid: 1000,
                    alive: BTreeSet::new(),
                    fail_spawn: None,
                    fail_terminate: None,
                    fail_liveness_check: None,
                    survive_terminate: false,
                    calls: Vec::new(),
                })),
            }
        }
    }

    impl FakeProcessController {
        pub fn new() -> Self {
            Self::default()
        }

        /// Make the next spawns fail with `reason`.
        pub fn fail_spawn(&self, reason: &str) {
            self.inner.lock().fail_spawn = Some(reason.to_string());
        }

        /// Make terminate fail (the process stays alive).
        pub fn fail_terminate(&self, reason: &str) {
            self.inner.lock().fail_terminate = Some(reason.to_string());
        }

        /// Make liveness checks fail until cleared with `None`.
        pub fn fail_liveness_check(&self, reason: Option<&str>) {
            self.inner.lock().fail_liveness_check = reason.map(str::to_string);
        }

        /// Terminate succeeds but the process keeps running.
        pub fn survive_terminate(&self) {
            self.inner.lock().survive_terminate = true;
        }

        /// Simulate a crash: the pid disappears without the supervisor knowing.
        pub fn crash(&self, pid: u32) {
            self.inner.lock().alive.remove(&pid);
        }

        /// Mark an arbitrary pid as alive.
        pub fn insert_alive(&self, pid: u32) {
            self.inner.lock().alive.insert(pid);
        }

        pub fn alive(&self) -> Vec<u32> {
            self.inner.lock().alive.iter().copied().collect()
        }

        pub fn calls(&self) -> Vec<ProcessCall> {
            self.inner.lock().calls.clone()
        }
    }

    #[async_trait]
    impl ProcessController for FakeProcessController {
        async fn spawn_detached(&self, req: &SpawnRequest) -> Result<u32, ProcessError> {
            let mut inner = self.inner.lock();
            let command = req.command.display();
            inner.calls.push(ProcessCall::Spawn { command: command.clone() });
            if let Some(reason) = inner.fail_spawn.clone() {
                return Err(ProcessError::SpawnFailed { command, reason });
            }
            inner.next_pid += 1;
            let pid = inner.next_pid;
            inner.alive.insert(pid);
            Ok(pid)
        }

        async fn is_alive(&self, pid: u32) -> Result<bool, ProcessError> {
            let inner = self.inner.lock();
            match &inner.fail_liveness_check {
                Some(reason) => Err(ProcessError::LivenessCheckFailed { pid, reason: reason.clone() }),
                None => Ok(inner.alive.contains(&pid)),
            }
        }

        async fn terminate(&self, pid: u32) -> Result<(), ProcessError> {
            let mut inner = self.inner.lock();
            inner.calls.push(ProcessCall::Terminate { pid });
            if let Some(reason) = inner.fail_terminate.clone() {
                return Err(ProcessError::TerminateFailed { pid, reason });
            }
            if !inner.survive_terminate {
                inner.alive.remove(&pid);
            }
            Ok(())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeProcessController, ProcessCall};

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
