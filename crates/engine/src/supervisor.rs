// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bot process supervision.
//!
//! There is no in-memory "running" flag. Every query recomputes state from
//! the pid file plus an OS liveness probe, so the answer is the same no
//! matter how many manager invocations came before.

use std::path::PathBuf;
use std::time::Duration;

use botctl_adapters::{ProcessController, ProcessError, SpawnRequest};
use botctl_core::credentials;
use botctl_core::{CommandSpec, Paths, ProcessRecord, RecordError, Strictness};
use serde::Serialize;
use thiserror::Error;

const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Error)]
pub enum StartError {
    #[error("bot is already running (pid {pid})")]
    AlreadyRunning { pid: u32 },

    #[error("credentials in {} are missing or still placeholders", .path.display())]
    InvalidConfig { path: PathBuf },

    #[error(transparent)]
    SpawnFailed(ProcessError),

    #[error("failed to write process record: {0}")]
    Record(#[from] RecordError),
}

#[derive(Debug, Error)]
pub enum StopError {
    #[error("bot is not running")]
    NotRunning,

    /// The signal failed; the process record was removed anyway.
    #[error(transparent)]
    TerminateFailed(ProcessError),
}

/// Recomputed on every query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum BotState {
    Stopped,
    Running { pid: u32 },
}

#[derive(Clone)]
pub struct Supervisor<C: ProcessController> {
    controller: C,
    paths: Paths,
    bot: CommandSpec,
    strictness: Strictness,
}

impl<C: ProcessController> Supervisor<C> {
    pub fn new(controller: C, paths: Paths, bot: CommandSpec, strictness: Strictness) -> Self {
        Self { controller, paths, bot, strictness }
    }

    pub fn paths(&self) -> &Paths {
        &self.paths
    }

    /// Pid of the live bot, if any.
    ///
    /// A record pointing at a dead pid (or an unreadable record) is stale:
    /// it is removed here and the bot reported as stopped. When the liveness
    /// check itself fails the record is kept and the pid reported as running.
    pub async fn running_pid(&self) -> Option<u32> {
        let record = match ProcessRecord::read(&self.paths.pid_file) {
            Ok(Some(record)) => record,
            Ok(None) => return None,
            Err(RecordError::Corrupt(contents)) => {
                tracing::warn!(contents = %contents, "discarding unreadable process record");
                self.discard_record();
                return None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "cannot read process record");
                return None;
            }
        };

        match self.controller.is_alive(record.pid).await {
            Ok(true) => Some(record.pid),
            Ok(false) => {
                tracing::info!(pid = record.pid, "process record is stale, removing");
                self.discard_record();
                None
            }
            Err(e) => {
                tracing::warn!(pid = record.pid, error = %e, "liveness check failed, keeping record");
                Some(record.pid)
            }
        }
    }

    pub async fn is_running(&self) -> bool {
        self.running_pid().await.is_some()
    }

    pub async fn state(&self) -> BotState {
        match self.running_pid().await {
            Some(pid) => BotState::Running { pid },
            None => BotState::Stopped,
        }
    }

    /// Spawn the bot detached and persist its pid.
    pub async fn start(&self) -> Result<u32, StartError> {
        if let Some(pid) = self.running_pid().await {
            return Err(StartError::AlreadyRunning { pid });
        }
        if !credentials::is_valid_file(&self.paths.env_file, self.strictness) {
            tracing::error!(path = %self.paths.env_file.display(), "refusing to start with invalid credentials");
            return Err(StartError::InvalidConfig { path: self.paths.env_file.clone() });
        }

        let request = SpawnRequest {
            command: self.bot.clone(),
            cwd: self.paths.work_dir.clone(),
            log_path: Some(self.paths.bot_log.clone()),
        };
        let pid = self.controller.spawn_detached(&request).await.map_err(|e| {
            tracing::error!(command = %self.bot.display(), error = %e, "bot failed to spawn");
            StartError::SpawnFailed(e)
        })?;

        if let Err(e) = ProcessRecord::new(pid).write(&self.paths.pid_file) {
            // Without a record the process would be untracked; take it back down.
            let _ = self.controller.terminate(pid).await;
            return Err(e.into());
        }
        tracing::info!(target: "system", pid, command = %self.bot.display(), "bot started");
        Ok(pid)
    }

    /// Ask the bot to exit and remove its record. Returns the stopped pid.
    ///
    /// The record is removed even when the signal fails, so a failed stop
    /// never leaves the operator stuck behind a record they cannot clear.
    pub async fn stop(&self) -> Result<u32, StopError> {
        let Some(pid) = self.running_pid().await else {
            return Err(StopError::NotRunning);
        };

        let signalled = self.controller.terminate(pid).await;
        self.discard_record();

        match signalled {
            Ok(()) => {
                tracing::info!(target: "system", pid, "bot stopped");
                Ok(pid)
            }
            Err(e) => {
                tracing::error!(pid, error = %e, "failed to signal bot; record removed");
                Err(StopError::TerminateFailed(e))
            }
        }
    }

    /// Drop the process record without signalling anything.
    pub fn forget(&self) {
        self.discard_record();
    }

    /// Record an already running pid, e.g. one that survived a failed stop.
    pub fn adopt(&self, pid: u32) -> Result<(), RecordError> {
        ProcessRecord::new(pid).write(&self.paths.pid_file)?;
        tracing::info!(pid, "tracking running bot");
        Ok(())
    }

    /// Poll until `pid` is gone or `timeout` elapses. Returns whether it exited.
    /// A failed liveness check counts as still alive.
    pub async fn wait_for_exit(&self, pid: u32, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if let Ok(false) = self.controller.is_alive(pid).await {
                return true;
            }
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(EXIT_POLL_INTERVAL).await;
        }
    }

    fn discard_record(&self) {
        if let Err(e) = ProcessRecord::remove(&self.paths.pid_file) {
            tracing::warn!(error = %e, "failed to remove process record");
        }
    }
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
