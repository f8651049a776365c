// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access.

use std::path::PathBuf;

use crate::config::ConfigError;

/// Resolve the bot working directory: BOTCTL_DIR > current directory
pub fn work_dir() -> Result<PathBuf, ConfigError> {
    if let Ok(dir) = std::env::var("BOTCTL_DIR") {
        if !dir.is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    std::env::current_dir().map_err(|_| ConfigError::NoWorkDir)
}

/// Log filter directive for the manager log (default `info`)
pub fn log_filter() -> String {
    std::env::var("BOTCTL_LOG").ok().filter(|s| !s.is_empty()).unwrap_or_else(|| "info".to_string())
}

/// Remote repository override for self-update.
pub fn remote_override() -> Option<String> {
    std::env::var("BOTCTL_REMOTE").ok().filter(|s| !s.is_empty())
}

/// Branch override for self-update.
pub fn branch_override() -> Option<String> {
    std::env::var("BOTCTL_BRANCH").ok().filter(|s| !s.is_empty())
}
