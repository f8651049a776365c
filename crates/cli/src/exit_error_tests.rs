// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::path::PathBuf;

#[test]
fn start_errors_map_to_codes() {
    let already: ExitError = StartError::AlreadyRunning { pid: 7 }.into();
    assert_eq!(already.code, codes::ALREADY_IN_STATE);
    assert_eq!(already.to_string(), "bot is already running (pid 7)");

    let invalid: ExitError = StartError::InvalidConfig { path: PathBuf::from(".env") }.into();
    assert_eq!(invalid.code, codes::INVALID_CONFIG);
}

#[test]
fn stop_when_stopped_is_already_in_state() {
    let err: ExitError = StopError::NotRunning.into();
    assert_eq!(err.code, codes::ALREADY_IN_STATE);
}

#[test]
fn held_lock_is_a_precondition_failure() {
    let err: ExitError = LockError::Held { holder: Some(12) }.into();
    assert_eq!(err.code, codes::PRECONDITION);
    assert!(err.message.contains("pid 12"));
}

#[test]
fn missing_tools_are_precondition_failures() {
    assert_eq!(ExitError::from(InstallError::ToolMissing("npm".into())).code, codes::PRECONDITION);
    assert_eq!(ExitError::from(UpdateError::VcsUnavailable).code, codes::PRECONDITION);
    assert_eq!(ExitError::from(CheckError::NotRepository).code, codes::PRECONDITION);
}

#[test]
fn deploy_with_bad_credentials_is_invalid_config() {
    assert_eq!(ExitError::from(DeployError::InvalidConfig).code, codes::INVALID_CONFIG);
}
