// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Exclusive advisory lock for mutating commands.
//!
//! Held for the lifetime of a [`ManagerLock`]; the OS drops the lock when
//! the file handle closes, so a crashed manager never leaves it stuck.

use std::fs::File;
use std::io::{Read, Seek, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LockError {
    #[error("another botctl instance is running{}", holder_label(.holder))]
    Held { holder: Option<u32> },

    #[error("cannot open lock file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn holder_label(holder: &Option<u32>) -> String {
    holder.map(|pid| format!(" (pid {pid})")).unwrap_or_default()
}

#[derive(Debug)]
pub struct ManagerLock {
    file: File,
    path: PathBuf,
}

impl ManagerLock {
    /// Take the lock without blocking and record our pid in it.
    pub fn acquire(path: &Path) -> Result<Self, LockError> {
        let io_err = |source| LockError::Io { path: path.to_path_buf(), source };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        // Open without truncating: the current holder's pid must survive a
        // failed attempt.
        let mut file = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(io_err)?;

        if file.try_lock_exclusive().is_err() {
            let mut contents = String::new();
            let _ = file.read_to_string(&mut contents);
            return Err(LockError::Held { holder: contents.trim().parse().ok() });
        }

        file.set_len(0).map_err(io_err)?;
        file.rewind().map_err(io_err)?;
        writeln!(file, "{}", std::process::id()).map_err(io_err)?;
        tracing::debug!(path = %path.display(), "manager lock acquired");
        Ok(Self { file, path: path.to_path_buf() })
    }
}

impl Drop for ManagerLock {
    fn drop(&mut self) {
        let _ = self.file.set_len(0);
        let _ = FileExt::unlock(&self.file);
        tracing::debug!(path = %self.path.display(), "manager lock released");
    }
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
