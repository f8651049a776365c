// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Custom error type that carries a process exit code.
//!
//! Commands return `ExitError` instead of calling `std::process::exit()`
//! directly, allowing `main()` to handle process termination.

use std::fmt;

use botctl_engine::{
    CheckError, DeployError, InstallError, LockError, StartError, StopError, UpdateError,
};

/// Process exit codes.
pub mod codes {
    pub const FAILURE: i32 = 1;
    /// Credentials missing, placeholders, or rejected.
    pub const INVALID_CONFIG: i32 = 2;
    /// Start while running, stop while stopped.
    pub const ALREADY_IN_STATE: i32 = 3;
    /// Missing tool, missing repository, or another instance holds the lock.
    pub const PRECONDITION: i32 = 4;
    /// Update failed and was rolled back.
    pub const ROLLED_BACK: i32 = 5;
}

#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    pub message: String,
}

impl ExitError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExitError {}

impl From<StartError> for ExitError {
    fn from(e: StartError) -> Self {
        let code = match e {
            StartError::AlreadyRunning { .. } => codes::ALREADY_IN_STATE,
            StartError::InvalidConfig { .. } => codes::INVALID_CONFIG,
            StartError::SpawnFailed(_) | StartError::Record(_) => codes::FAILURE,
        };
        Self::new(code, e.to_string())
    }
}

impl From<StopError> for ExitError {
    fn from(e: StopError) -> Self {
        let code = match e {
            StopError::NotRunning => codes::ALREADY_IN_STATE,
            StopError::TerminateFailed(_) => codes::FAILURE,
        };
        Self::new(code, e.to_string())
    }
}

impl From<LockError> for ExitError {
    fn from(e: LockError) -> Self {
        let code = match e {
            LockError::Held { .. } => codes::PRECONDITION,
            LockError::Io { .. } => codes::FAILURE,
        };
        Self::new(code, e.to_string())
    }
}

impl From<InstallError> for ExitError {
    fn from(e: InstallError) -> Self {
        let code = match e {
            InstallError::ToolMissing(_) => codes::PRECONDITION,
            InstallError::Package(_) | InstallError::Template(_) => codes::FAILURE,
        };
        Self::new(code, e.to_string())
    }
}

impl From<DeployError> for ExitError {
    fn from(e: DeployError) -> Self {
        let code = match e {
            DeployError::InvalidConfig => codes::INVALID_CONFIG,
            DeployError::Subprocess(_) => codes::FAILURE,
        };
        Self::new(code, e.to_string())
    }
}

impl From<CheckError> for ExitError {
    fn from(e: CheckError) -> Self {
        let code = match e {
            CheckError::VcsUnavailable | CheckError::NotRepository => codes::PRECONDITION,
            CheckError::Vcs(_) => codes::FAILURE,
        };
        Self::new(code, e.to_string())
    }
}

impl From<UpdateError> for ExitError {
    fn from(e: UpdateError) -> Self {
        let code = match e {
            UpdateError::VcsUnavailable | UpdateError::Init(_) => codes::PRECONDITION,
            UpdateError::CriticalCopy(_) | UpdateError::Backup(_) => codes::FAILURE,
            UpdateError::Failed { .. } => codes::ROLLED_BACK,
        };
        Self::new(code, e.to_string())
    }
}

#[cfg(test)]
#[path = "exit_error_tests.rs"]
mod tests;
