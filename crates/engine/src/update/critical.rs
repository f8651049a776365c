// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Last-resort copy of the bot's entry point and manifest.
//!
//! Taken before the main snapshot and kept outside the backups directory,
//! so a broken backup store still leaves something to recover from.

use std::path::{Path, PathBuf};

use botctl_core::Clock;

#[derive(Debug)]
pub(crate) struct CriticalCopy {
    dir: PathBuf,
    files: Vec<String>,
}

impl CriticalCopy {
    pub(crate) fn create(
        tmp_dir: &Path,
        work_dir: &Path,
        names: &[String],
        clock: &impl Clock,
    ) -> std::io::Result<Self> {
        let stamp = clock.utc_now().format("%Y%m%d-%H%M%S-%3f");
        let dir = tmp_dir.join(format!("critical-{stamp}"));
        std::fs::create_dir_all(&dir)?;

        let mut files = Vec::new();
        for name in names {
            let source = work_dir.join(name);
            if !source.is_file() {
                continue;
            }
            let target = dir.join(name);
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::copy(&source, &target)?;
            files.push(name.clone());
        }
        tracing::debug!(dir = %dir.display(), files = files.len(), "critical files copied");
        Ok(Self { dir, files })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.dir
    }

    /// Copy every saved file back into `work_dir`.
    pub(crate) fn restore(&self, work_dir: &Path) -> std::io::Result<()> {
        for name in &self.files {
            let target = work_dir.join(name);
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::copy(self.dir.join(name), target)?;
        }
        Ok(())
    }

    /// Best-effort removal.
    pub(crate) fn discard(&self) {
        if let Err(e) = std::fs::remove_dir_all(&self.dir) {
            tracing::warn!(dir = %self.dir.display(), error = %e, "failed to remove critical-file copy");
        }
    }
}

#[cfg(test)]
#[path = "critical_tests.rs"]
mod tests;
