// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Self-update from the configured git remote.
//!
//! The orchestrator walks a fixed sequence of [`Phase`]s. Each step returns
//! a [`StepError`] on failure; the top-level routine funnels every step
//! failure between `Stopping` and `Installing` into one rollback sequence,
//! so no failure leaves the bot down without a recovery attempt.

mod check;
mod critical;
mod phase;

pub use check::{CheckError, UpdateCheck};
pub use phase::{Phase, RollbackReport, RollbackStep, UpdateReport};

use std::time::Duration;

use botctl_adapters::vcs::remote_ref;
use botctl_adapters::{PackageAdapter, PackageError, ProcessController, VcsAdapter, VcsError};
use botctl_core::config::UpdateConfig;
use botctl_core::{Clock, Paths, UpdateState, UpdateStateError};
use thiserror::Error;

use crate::backup::{BackupError, BackupStore, RestoreError};
use crate::supervisor::{StopError, Supervisor};
use critical::CriticalCopy;

/// A single failed step inside the update sequence.
#[derive(Debug, Error)]
pub enum StepError {
    #[error(transparent)]
    Stop(#[from] StopError),

    #[error(transparent)]
    Vcs(#[from] VcsError),

    #[error(transparent)]
    Restore(#[from] RestoreError),

    #[error(transparent)]
    Package(#[from] PackageError),

    #[error("failed to record update: {0}")]
    State(#[from] UpdateStateError),
}

#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("git is not installed")]
    VcsUnavailable,

    #[error("failed to initialize repository: {0}")]
    Init(#[source] VcsError),

    #[error("failed to copy critical files, update aborted: {0}")]
    CriticalCopy(#[source] std::io::Error),

    #[error("backup failed, update aborted: {0}")]
    Backup(#[from] BackupError),

    #[error("update failed while {phase}: {source}")]
    Failed {
        phase: Phase,
        #[source]
        source: StepError,
        rollback: RollbackReport,
    },
}

/// What the sequence has done so far; drives rollback.
#[derive(Debug)]
struct Progress {
    phase: Phase,
    stopped_pid: Option<u32>,
    previous_head: Option<String>,
    changed_files: Vec<String>,
}

impl Progress {
    fn enter(&mut self, phase: Phase) {
        tracing::info!(target: "system", phase = %phase, "update phase");
        self.phase = phase;
    }
}

pub struct Updater<C, V, P, K>
where
    C: ProcessController,
    V: VcsAdapter,
    P: PackageAdapter,
    K: Clock,
{
    supervisor: Supervisor<C>,
    vcs: V,
    packages: P,
    backups: BackupStore<K>,
    clock: K,
    settings: UpdateConfig,
    stop_timeout: Duration,
}

impl<C, V, P, K> Updater<C, V, P, K>
where
    C: ProcessController,
    V: VcsAdapter,
    P: PackageAdapter,
    K: Clock,
{
    pub fn new(
        supervisor: Supervisor<C>,
        vcs: V,
        packages: P,
        backups: BackupStore<K>,
        clock: K,
        settings: UpdateConfig,
        stop_timeout: Duration,
    ) -> Self {
        Self { supervisor, vcs, packages, backups, clock, settings, stop_timeout }
    }

    fn paths(&self) -> &Paths {
        self.supervisor.paths()
    }

    /// Run one full update.
    pub async fn run(&self) -> Result<UpdateReport, UpdateError> {
        self.ensure_repository().await?;

        let paths = self.paths();
        let critical = CriticalCopy::create(
            &paths.tmp_dir,
            &paths.work_dir,
            &self.settings.critical_files,
            &self.clock,
        )
        .map_err(UpdateError::CriticalCopy)?;

        let mut progress = Progress {
            phase: Phase::Idle,
            stopped_pid: None,
            previous_head: None,
            changed_files: Vec::new(),
        };

        progress.enter(Phase::BackingUp);
        let retain = self.retention();
        let snapshot = match self.backups.create_snapshot() {
            Ok(id) => id,
            Err(e) => {
                tracing::error!(error = %e, "backup failed, update aborted before any change");
                critical.discard();
                return Err(e.into());
            }
        };
        self.prune_backups(retain, &snapshot);

        if let Err(source) = self.apply(&snapshot, &mut progress).await {
            let phase = progress.phase;
            tracing::error!(phase = %phase, error = %source, "update step failed, rolling back");
            let rollback = self.roll_back(&snapshot, &critical, &progress).await;
            return Err(UpdateError::Failed { phase, source, rollback });
        }
        critical.discard();

        progress.enter(Phase::Resuming);
        let (restarted_pid, restart_error) = match progress.stopped_pid {
            Some(old_pid) => self.restart(old_pid).await,
            None => (None, None),
        };

        progress.enter(Phase::Done);
        Ok(UpdateReport {
            snapshot,
            changed_files: progress.changed_files,
            previous_head: progress.previous_head,
            stopped_pid: progress.stopped_pid,
            restarted_pid,
            restart_error,
            completed_at: self.clock.utc_now(),
        })
    }

    async fn ensure_repository(&self) -> Result<(), UpdateError> {
        if !self.vcs.available().await {
            tracing::error!("git is not installed");
            return Err(UpdateError::VcsUnavailable);
        }
        if !self.vcs.is_repository().await {
            tracing::info!(
                target: "system",
                remote = %self.settings.remote,
                branch = %self.settings.branch,
                "initializing repository"
            );
            self.vcs
                .init(&self.settings.remote, &self.settings.branch)
                .await
                .map_err(UpdateError::Init)?;
        }
        Ok(())
    }

    /// Loads (and on first run creates) the update state so the snapshot
    /// captures it.
    fn retention(&self) -> usize {
        match UpdateState::load_or_init(&self.paths().update_state) {
            Ok(state) => state.retention(),
            Err(e) => {
                tracing::warn!(error = %e, "cannot read update state, using default retention");
                UpdateState::default().retention()
            }
        }
    }

    fn prune_backups(&self, retain: usize, current: &str) {
        let report = self.backups.prune_keeping(retain, current);
        if !report.failed.is_empty() {
            tracing::warn!(failed = ?report.failed, "some backups could not be pruned");
        }
    }

    /// Everything between the snapshot and the restart. Any error here rolls back.
    async fn apply(&self, snapshot: &str, progress: &mut Progress) -> Result<(), StepError> {
        let tip = remote_ref(&self.settings.branch);

        progress.enter(Phase::Stopping);
        if let Some(pid) = self.supervisor.running_pid().await {
            progress.stopped_pid = Some(pid);
            self.supervisor.stop().await?;
            if !self.supervisor.wait_for_exit(pid, self.stop_timeout).await {
                tracing::warn!(pid, timeout_secs = self.stop_timeout.as_secs(), "bot still alive after stop, continuing");
            }
        }

        progress.enter(Phase::Fetching);
        self.vcs.fetch().await?;
        progress.previous_head = match self.vcs.head_revision().await {
            Ok(head) => Some(head),
            Err(e) => {
                tracing::debug!(error = %e, "no previous revision");
                None
            }
        };
        progress.changed_files = match self.vcs.diff_names("HEAD", &tip).await {
            Ok(files) => files,
            Err(e) => {
                tracing::debug!(error = %e, "cannot compute changed files");
                Vec::new()
            }
        };
        tracing::info!(target: "system", changed = progress.changed_files.len(), "fetched {tip}");
        for file in &progress.changed_files {
            tracing::debug!(file = %file, "changed");
        }

        progress.enter(Phase::Resetting);
        self.vcs.reset_hard(&tip).await?;
        self.vcs.clean_untracked(&Paths::clean_excludes()).await?;

        progress.enter(Phase::Restoring);
        self.backups.restore_snapshot(snapshot)?;
        if progress.stopped_pid.is_some() {
            // The snapshot's record names the pid that was just stopped.
            self.supervisor.forget();
        }

        progress.enter(Phase::Installing);
        self.packages.install().await?;
        let mut state = UpdateState::load_or_init(&self.paths().update_state)?;
        state.last_update_timestamp = Some(self.clock.utc_now());
        state.save(&self.paths().update_state)?;
        Ok(())
    }

    /// Best-effort recovery. Never fails; every action lands in the report.
    async fn roll_back(
        &self,
        snapshot: &str,
        critical: &CriticalCopy,
        progress: &Progress,
    ) -> RollbackReport {
        tracing::warn!(target: "system", phase = %Phase::RollingBack, failed_in = %progress.phase, "update phase");
        let mut report = RollbackReport::default();
        let paths = self.paths();

        if progress.phase.touched_tree() {
            if let Some(head) = &progress.previous_head {
                let result = self.vcs.reset_hard(head).await;
                report.record(format!("reset tree to {head}"), &result);
            }
        }

        let result = critical.restore(&paths.work_dir);
        report.record(format!("restore critical files from {}", critical.path().display()), &result);

        let result = self.backups.restore_snapshot(snapshot);
        report.record(format!("restore snapshot {snapshot}"), &result);

        if let Some(old_pid) = progress.stopped_pid {
            self.supervisor.forget();
            report.restarted_pid = self.resume_after_failure(old_pid, &mut report).await;
        }

        if report.succeeded() {
            critical.discard();
        } else {
            tracing::warn!(dir = %critical.path().display(), "rollback incomplete, keeping critical-file copy");
        }
        report
    }

    /// Start the new version once the stopped bot is really gone. A bot that
    /// outlives a second grace period is re-tracked instead of doubled.
    async fn restart(&self, old_pid: u32) -> (Option<u32>, Option<String>) {
        if !self.supervisor.wait_for_exit(old_pid, self.stop_timeout).await {
            tracing::error!(pid = old_pid, "previous bot still running, not starting a second instance");
            let reason = format!("previous bot (pid {old_pid}) did not exit; stop it and start again");
            return match self.supervisor.adopt(old_pid) {
                Ok(()) => (None, Some(reason)),
                Err(e) => (None, Some(format!("{reason} (cannot track it: {e})"))),
            };
        }
        match self.supervisor.start().await {
            Ok(pid) => (Some(pid), None),
            Err(e) => {
                tracing::error!(error = %e, "bot could not be restarted after update");
                (None, Some(e.to_string()))
            }
        }
    }

    async fn resume_after_failure(&self, old_pid: u32, report: &mut RollbackReport) -> Option<u32> {
        // A failed stop removes the record but may leave the process alive.
        if !self.supervisor.wait_for_exit(old_pid, Duration::ZERO).await {
            let result = self.supervisor.adopt(old_pid);
            report.record(format!("re-track still running bot (pid {old_pid})"), &result);
            return result.ok().map(|()| old_pid);
        }
        let result = self.supervisor.start().await;
        report.record("restart bot", &result);
        result.ok()
    }

    pub fn auto_update_enabled(&self) -> bool {
        UpdateState::load(&self.paths().update_state)
            .map(|state| state.auto_update_enabled)
            .unwrap_or(false)
    }
}

/// Persist the auto-update flag.
pub fn set_auto_update(paths: &Paths, enabled: bool) -> Result<UpdateState, UpdateStateError> {
    let mut state = UpdateState::load_or_init(&paths.update_state)?;
    state.auto_update_enabled = enabled;
    state.save(&paths.update_state)?;
    tracing::info!(target: "system", enabled, "auto-update toggled");
    Ok(state)
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
