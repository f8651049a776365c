// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::BTreeSet;

use botctl_adapters::vcs::{is_ignored, remote_ref};
use botctl_adapters::{PackageAdapter, ProcessController, VcsAdapter, VcsError};
use botctl_core::Clock;
use serde::Serialize;
use thiserror::Error;

use super::Updater;

#[derive(Debug, Error)]
pub enum CheckError {
    #[error("git is not installed")]
    VcsUnavailable,

    #[error("not a git repository yet; run `botctl update run` to initialize it")]
    NotRepository,

    #[error(transparent)]
    Vcs(#[from] VcsError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateCheck {
    pub available: bool,
    /// Differing paths, after dropping local runtime files.
    pub changed: Vec<String>,
}

impl<C, V, P, K> Updater<C, V, P, K>
where
    C: ProcessController,
    V: VcsAdapter,
    P: PackageAdapter,
    K: Clock,
{
    /// Fetch and compare against the remote branch.
    ///
    /// Credentials, the process record, update state and the manager's own
    /// files never count as a difference.
    pub async fn check_for_updates(&self) -> Result<UpdateCheck, CheckError> {
        if !self.vcs.available().await {
            return Err(CheckError::VcsUnavailable);
        }
        if !self.vcs.is_repository().await {
            return Err(CheckError::NotRepository);
        }

        self.vcs.fetch().await?;
        if self.vcs.head_revision().await.is_err() {
            // Nothing checked out yet: everything upstream is new.
            tracing::debug!("repository has no commits checked out");
            return Ok(UpdateCheck { available: true, changed: Vec::new() });
        }

        let tip = remote_ref(&self.settings.branch);
        let mut differing: BTreeSet<String> = self.vcs.diff_names("HEAD", &tip).await?.into_iter().collect();
        differing.extend(self.vcs.status_porcelain().await?);

        let ignored = self.paths().update_ignore_list();
        let changed: Vec<String> =
            differing.into_iter().filter(|path| !is_ignored(path, &ignored)).collect();

        tracing::info!(available = !changed.is_empty(), changed = changed.len(), "checked for updates");
        Ok(UpdateCheck { available: !changed.is_empty(), changed })
    }
}
