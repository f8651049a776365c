// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persisted self-update settings (`update-state.json`).

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_RETENTION: usize = 5;

#[derive(Debug, Error)]
pub enum UpdateStateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Auto-update flag, last successful update and backup retention.
///
/// Missing keys fall back to their defaults so an older or hand-edited file
/// never fails to load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateState {
    pub auto_update_enabled: bool,
    pub last_update_timestamp: Option<DateTime<Utc>>,
    pub backup_retention_count: usize,
}

impl Default for UpdateState {
    fn default() -> Self {
        Self {
            auto_update_enabled: false,
            last_update_timestamp: None,
            backup_retention_count: DEFAULT_RETENTION,
        }
    }
}

impl UpdateState {
    /// Load the state, creating the file with defaults on first run.
    ///
    /// A corrupt file is reported and replaced by defaults in memory; it is
    /// not overwritten until the next `save`.
    pub fn load_or_init(path: &Path) -> Result<Self, UpdateStateError> {
        match Self::read(path)? {
            Some(state) => Ok(state),
            None => {
                let state = Self::default();
                state.save(path)?;
                tracing::info!(path = %path.display(), "created update state with defaults");
                Ok(state)
            }
        }
    }

    /// Load the state without touching the disk; a missing file reads as defaults.
    pub fn load(path: &Path) -> Result<Self, UpdateStateError> {
        Ok(Self::read(path)?.unwrap_or_default())
    }

    fn read(path: &Path) -> Result<Option<Self>, UpdateStateError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(state) => Ok(Some(state)),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "update state unreadable, using defaults");
                    Ok(Some(Self::default()))
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Write atomically (temp file + rename).
    pub fn save(&self, path: &Path) -> Result<(), UpdateStateError> {
        let json = serde_json::to_string_pretty(self)?;
        crate::fs_util::write_atomic(path, json.as_bytes())?;
        Ok(())
    }

    /// Retention never drops below one snapshot.
    pub fn retention(&self) -> usize {
        self.backup_retention_count.max(1)
    }
}

#[cfg(test)]
#[path = "update_state_tests.rs"]
mod tests;
