// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! On-disk process record: the bot's pid as the sole content of a file.
//!
//! The record is advisory. Whether the process is actually alive is decided
//! by the supervisor's liveness probe, never by the file alone.

use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("pid file does not contain a pid: {0:?}")]
    Corrupt(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessRecord {
    pub pid: u32,
}

impl ProcessRecord {
    pub fn new(pid: u32) -> Self {
        Self { pid }
    }

    /// Read the record. `Ok(None)` when the file does not exist.
    pub fn read(path: &Path) -> Result<Option<Self>, RecordError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let trimmed = contents.trim();
        match trimmed.parse::<u32>() {
            Ok(pid) if pid > 0 => Ok(Some(Self { pid })),
            _ => Err(RecordError::Corrupt(trimmed.to_string())),
        }
    }

    pub fn write(&self, path: &Path) -> Result<(), RecordError> {
        crate::fs_util::write_atomic(path, self.pid.to_string().as_bytes())?;
        Ok(())
    }

    /// Delete the record file. Returns whether a file was removed.
    pub fn remove(path: &Path) -> Result<bool, RecordError> {
        match std::fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
#[path = "process_record_tests.rs"]
mod tests;
