// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Timestamped snapshots of the bot's local mutable files.
//!
//! A snapshot is a directory under `.botctl/backups/` named by its creation
//! time, holding plain copies of the allow-listed files that existed at that
//! moment. Restore only ever writes allow-listed names back; it never
//! deletes anything from the working directory.

use std::path::{Path, PathBuf};

use botctl_core::fs_util::dir_size;
use botctl_core::{Clock, Paths};
use serde::Serialize;
use thiserror::Error;

const ID_FORMAT: &str = "%Y%m%d-%H%M%S-%3f";

#[derive(Debug, Error)]
pub enum BackupError {
    #[error("cannot create snapshot directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum RestoreError {
    #[error("snapshot not found: {0}")]
    SnapshotNotFound(String),

    #[error("cannot read snapshot {id}: {source}")]
    Read {
        id: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to restore {} file(s) from {id}: {}", .failed.len(), .failed.join(", "))]
    Partial { id: String, failed: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotInfo {
    pub id: String,
    pub size_bytes: u64,
}

/// Outcome of a prune. Failures are reported here, never raised.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PruneReport {
    pub removed: Vec<String>,
    pub failed: Vec<String>,
}

#[derive(Clone)]
pub struct BackupStore<K: Clock> {
    work_dir: PathBuf,
    backups_dir: PathBuf,
    allow_list: Vec<String>,
    clock: K,
}

impl<K: Clock> BackupStore<K> {
    pub fn new(paths: &Paths, allow_list: Vec<String>, clock: K) -> Self {
        Self {
            work_dir: paths.work_dir.clone(),
            backups_dir: paths.backups_dir.clone(),
            allow_list,
            clock,
        }
    }

    /// Copy every allow-listed file that exists into a new snapshot.
    ///
    /// Only failing to create the directory is an error; a file that cannot
    /// be copied is logged and left out.
    pub fn create_snapshot(&self) -> Result<String, BackupError> {
        let (id, dir) = self.create_unique_dir()?;

        let mut captured = 0usize;
        for name in &self.allow_list {
            let source = self.work_dir.join(name);
            if !source.is_file() {
                continue;
            }
            match copy_file(&source, &dir.join(name)) {
                Ok(()) => captured += 1,
                Err(e) => tracing::warn!(snapshot = %id, file = %name, error = %e, "skipping file in snapshot"),
            }
        }

        tracing::info!(target: "system", snapshot = %id, files = captured, "backup snapshot created");
        Ok(id)
    }

    /// Copy the snapshot's files back over the working directory.
    ///
    /// Returns the names that were restored.
    pub fn restore_snapshot(&self, id: &str) -> Result<Vec<String>, RestoreError> {
        let dir = self.snapshot_dir(id).ok_or_else(|| RestoreError::SnapshotNotFound(id.to_string()))?;

        let mut restored = Vec::new();
        let mut failed = Vec::new();
        for name in &self.allow_list {
            let source = dir.join(name);
            if !source.is_file() {
                continue;
            }
            match copy_file(&source, &self.work_dir.join(name)) {
                Ok(()) => restored.push(name.clone()),
                Err(e) => {
                    tracing::error!(snapshot = %id, file = %name, error = %e, "failed to restore file");
                    failed.push(name.clone());
                }
            }
        }

        if !failed.is_empty() {
            return Err(RestoreError::Partial { id: id.to_string(), failed });
        }
        tracing::info!(target: "system", snapshot = %id, files = restored.len(), "backup snapshot restored");
        Ok(restored)
    }

    /// Keep the newest `retain` snapshots and delete the rest.
    pub fn prune(&self, retain: usize) -> PruneReport {
        self.prune_ids(retain, None)
    }

    /// Like [`prune`](Self::prune), but `current` always survives and counts
    /// toward `retain`, whatever its timestamp.
    pub fn prune_keeping(&self, retain: usize, current: &str) -> PruneReport {
        self.prune_ids(retain, Some(current))
    }

    fn prune_ids(&self, retain: usize, current: Option<&str>) -> PruneReport {
        let mut report = PruneReport::default();
        let mut ids = match self.snapshot_ids() {
            Ok(ids) => ids,
            Err(e) => {
                tracing::warn!(error = %e, "cannot list snapshots for pruning");
                return report;
            }
        };
        let mut retain = retain;
        if let Some(current) = current {
            if let Some(pos) = ids.iter().position(|id| id == current) {
                ids.remove(pos);
                retain = retain.saturating_sub(1);
            }
        }

        for id in ids.into_iter().skip(retain) {
            match std::fs::remove_dir_all(self.backups_dir.join(&id)) {
                Ok(()) => {
                    tracing::info!(snapshot = %id, "pruned backup snapshot");
                    report.removed.push(id);
                }
                Err(e) => {
                    tracing::warn!(snapshot = %id, error = %e, "failed to prune backup snapshot");
                    report.failed.push(id);
                }
            }
        }
        report
    }

    /// Snapshots, newest first.
    pub fn list(&self) -> Vec<SnapshotInfo> {
        self.snapshot_ids()
            .unwrap_or_default()
            .into_iter()
            .map(|id| {
                let size_bytes = dir_size(&self.backups_dir.join(&id));
                SnapshotInfo { id, size_bytes }
            })
            .collect()
    }

    fn snapshot_dir(&self, id: &str) -> Option<PathBuf> {
        if id.is_empty() || id.contains(['/', '\\']) || id.starts_with('.') {
            return None;
        }
        let dir = self.backups_dir.join(id);
        dir.is_dir().then_some(dir)
    }

    /// Snapshot ids sorted newest first.
    fn snapshot_ids(&self) -> std::io::Result<Vec<String>> {
        let entries = match std::fs::read_dir(&self.backups_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };
        let mut ids: Vec<String> = entries
            .filter_map(Result::ok)
            .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|name| !name.starts_with('.'))
            .collect();
        ids.sort_by_key(|id| std::cmp::Reverse(sort_key(id)));
        Ok(ids)
    }

    fn create_unique_dir(&self) -> Result<(String, PathBuf), BackupError> {
        std::fs::create_dir_all(&self.backups_dir)
            .map_err(|source| BackupError::CreateDir { path: self.backups_dir.clone(), source })?;

        let base = self.clock.utc_now().format(ID_FORMAT).to_string();
        let mut attempt = 0u32;
        loop {
            let id = if attempt == 0 { base.clone() } else { format!("{base}-{attempt}") };
            let dir = self.backups_dir.join(&id);
            match std::fs::create_dir(&dir) {
                Ok(()) => return Ok((id, dir)),
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => attempt += 1,
                Err(source) => return Err(BackupError::CreateDir { path: dir, source }),
            }
        }
    }
}

/// Timestamp prefix plus collision counter, so `-10` sorts after `-9`.
fn sort_key(id: &str) -> (String, u32) {
    match id.rsplit_once('-') {
        Some((base, n)) if base.matches('-').count() == 2 => {
            (base.to_string(), n.parse().unwrap_or(0))
        }
        _ => (id.to_string(), 0),
    }
}

fn copy_file(source: &Path, target: &Path) -> std::io::Result<()> {
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::copy(source, target).map(|_| ())
}

#[cfg(test)]
#[path = "backup_tests.rs"]
mod tests;
