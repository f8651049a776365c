// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! POSIX process control via signals.

use async_trait::async_trait;
use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;

use super::{spawn_detached_command, ProcessController, ProcessError, SpawnRequest};

/// Zero-signal liveness probe and SIGTERM termination.
#[derive(Clone, Copy, Debug, Default)]
pub struct SignalController;

impl SignalController {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessController for SignalController {
    async fn spawn_detached(&self, req: &SpawnRequest) -> Result<u32, ProcessError> {
        spawn_detached_command(req)
    }

    async fn is_alive(&self, pid: u32) -> Result<bool, ProcessError> {
        let Ok(raw) = i32::try_from(pid) else {
            return Ok(false);
        };
        match kill(Pid::from_raw(raw), None::<Signal>) {
            Ok(()) => Ok(!is_zombie(pid)),
            // Exists but owned by someone else
            Err(Errno::EPERM) => Ok(true),
            Err(Errno::ESRCH) => Ok(false),
            Err(e) => Err(ProcessError::LivenessCheckFailed { pid, reason: e.to_string() }),
        }
    }

    async fn terminate(&self, pid: u32) -> Result<(), ProcessError> {
        let raw = i32::try_from(pid).map_err(|_| ProcessError::TerminateFailed {
            pid,
            reason: "pid out of range".to_string(),
        })?;
        match kill(Pid::from_raw(raw), Signal::SIGTERM) {
            Ok(()) | Err(Errno::ESRCH) => Ok(()),
            Err(e) => Err(ProcessError::TerminateFailed { pid, reason: e.to_string() }),
        }
    }
}

/// An exited-but-unreaped child still answers the zero signal; treat it as dead.
#[cfg(target_os = "linux")]
fn is_zombie(pid: u32) -> bool {
    let Ok(stat) = std::fs::read_to_string(format!("/proc/{pid}/stat")) else {
        return false;
    };
    // Field 3 follows the parenthesised command name, which may contain spaces.
    stat.rsplit_once(')')
        .and_then(|(_, rest)| rest.split_whitespace().next())
        .is_some_and(|state| state == "Z")
}

#[cfg(not(target_os = "linux"))]
fn is_zombie(_pid: u32) -> bool {
    false
}
