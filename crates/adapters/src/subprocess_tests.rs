// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[cfg(unix)]
#[tokio::test]
async fn captures_stdout() {
    let mut cmd = Command::new("echo");
    cmd.arg("hello");
    let output = run_with_timeout(cmd, Duration::from_secs(5), "echo").await.unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "hello");
}

#[cfg(unix)]
#[tokio::test]
async fn slow_command_times_out() {
    let mut cmd = Command::new("sleep");
    cmd.arg("5");
    let err = run_with_timeout(cmd, Duration::from_millis(100), "sleep").await.unwrap_err();
    assert!(matches!(err, SubprocessError::TimedOut { .. }));
    assert_eq!(err.to_string(), "sleep timed out after 0s");
}

#[tokio::test]
async fn missing_program_is_spawn_error() {
    let cmd = Command::new("botctl-definitely-not-a-real-program");
    let err = run_with_timeout(cmd, Duration::from_secs(5), "missing").await.unwrap_err();
    assert!(matches!(err, SubprocessError::Spawn { .. }));
}

#[cfg(unix)]
#[tokio::test]
async fn run_checked_reports_exit_code_and_stderr() {
    let mut cmd = Command::new("sh");
    cmd.args(["-c", "echo broken >&2; exit 3"]);
    let err = run_checked(cmd, Duration::from_secs(5), "script").await.unwrap_err();
    match err {
        SubprocessError::Failed { code, stderr, .. } => {
            assert_eq!(code, Some(3));
            assert_eq!(stderr, "broken");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn failed_error_message_names_exit_code() {
    let err = SubprocessError::Failed {
        description: "npm install".to_string(),
        code: Some(1),
        stderr: "ERESOLVE".to_string(),
    };
    assert_eq!(err.to_string(), "npm install failed (exit 1): ERESOLVE");
}

#[tokio::test]
async fn unknown_tool_is_unavailable() {
    assert!(!tool_available("botctl-definitely-not-a-real-program").await);
}
