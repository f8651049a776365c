// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Update phases and the reports the orchestrator hands back.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Where an update is in its sequence.
///
/// Phases advance strictly in declaration order. `RollingBack` is entered
/// from any phase between `Stopping` and `Installing` when a step fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    BackingUp,
    Stopping,
    Fetching,
    Resetting,
    Restoring,
    Installing,
    Resuming,
    Done,
    RollingBack,
}

impl Phase {
    /// Whether the working tree may already have been rewritten.
    pub fn touched_tree(self) -> bool {
        (Phase::Resetting..=Phase::Installing).contains(&self)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Idle => "idle",
            Phase::BackingUp => "backing up",
            Phase::Stopping => "stopping",
            Phase::Fetching => "fetching",
            Phase::Resetting => "resetting",
            Phase::Restoring => "restoring",
            Phase::Installing => "installing",
            Phase::Resuming => "resuming",
            Phase::Done => "done",
            Phase::RollingBack => "rolling back",
        };
        f.write_str(s)
    }
}

/// A completed update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateReport {
    pub snapshot: String,
    /// Files that differed between the old `HEAD` and the remote tip.
    pub changed_files: Vec<String>,
    pub previous_head: Option<String>,
    /// Pid that was stopped for the update, if the bot was running.
    pub stopped_pid: Option<u32>,
    pub restarted_pid: Option<u32>,
    /// Set when the bot was running before but could not be restarted.
    pub restart_error: Option<String>,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RollbackStep {
    pub action: String,
    pub ok: bool,
    pub detail: Option<String>,
}

/// Every recovery action attempted after a failed update, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RollbackReport {
    pub steps: Vec<RollbackStep>,
    pub restarted_pid: Option<u32>,
}

impl RollbackReport {
    pub(crate) fn record<T, E: fmt::Display>(&mut self, action: impl Into<String>, result: &Result<T, E>) {
        let action = action.into();
        match result {
            Ok(_) => {
                tracing::info!(action = %action, "rollback step succeeded");
                self.steps.push(RollbackStep { action, ok: true, detail: None });
            }
            Err(e) => {
                tracing::error!(action = %action, error = %e, "rollback step failed");
                self.steps.push(RollbackStep { action, ok: false, detail: Some(e.to_string()) });
            }
        }
    }

    /// True when every attempted step succeeded.
    pub fn succeeded(&self) -> bool {
        self.steps.iter().all(|s| s.ok)
    }
}

impl fmt::Display for RollbackReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.steps {
            match &step.detail {
                Some(detail) => writeln!(f, "  [failed] {}: {detail}", step.action)?,
                None => writeln!(f, "  [ok]     {}", step.action)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "phase_tests.rs"]
mod tests;
