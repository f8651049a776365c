//! Bot start/stop lifecycle specs

use crate::prelude::*;

#[test]
fn stop_when_stopped_is_already_in_state() {
    let project = Project::sleeping_bot();
    project.botctl().args(&["stop"]).fails_with(3).stderr_has("not running");
}

#[test]
fn status_of_fresh_directory_reports_stopped() {
    let project = Project::empty();
    let status = project.botctl().args(&["status", "-o", "json"]).passes().json();
    assert_eq!(status["bot"]["state"], "stopped");
    assert_eq!(status["credentials"]["valid"], false);
}

#[test]
fn status_does_not_create_update_state() {
    let project = Project::empty();
    let status = project.botctl().args(&["status", "-o", "json"]).passes().json();
    assert_eq!(status["auto_update"], false);
    assert!(!project.exists("update-state.json"));
}

#[test]
fn stale_process_record_is_cleared_by_status() {
    let project = Project::sleeping_bot();
    // Far above any default pid_max
    project.file("bot.pid", "999999999");
    project.botctl().args(&["status"]).passes().stdout_has("stopped");
    assert!(!project.exists("bot.pid"));
}

#[cfg(unix)]
#[test]
fn placeholder_credentials_block_start_until_configured() {
    let project = Project::sleeping_bot();

    project.botctl().args(&["start"]).fails_with(2).stderr_has("placeholders");
    assert!(!project.exists("bot.pid"));

    project.configure_valid();
    let started = project.botctl().args(&["start", "-o", "json"]).passes().json();
    let pid = started["pid"].as_u64().unwrap();
    assert_eq!(project.read("bot.pid").trim(), pid.to_string());

    let status = project.botctl().args(&["status", "-o", "json"]).passes().json();
    assert_eq!(status["bot"]["state"], "running");
    assert_eq!(status["bot"]["pid"], pid);

    // Second start leaves the record alone
    project.botctl().args(&["start"]).fails_with(3);
    assert_eq!(project.read("bot.pid").trim(), pid.to_string());

    project.botctl().args(&["stop"]).passes().stdout_has("Bot stopped");
    assert!(!project.exists("bot.pid"));
    let status = project.botctl().args(&["status", "-o", "json"]).passes().json();
    assert_eq!(status["bot"]["state"], "stopped");
}

#[cfg(unix)]
#[test]
fn restart_replaces_the_running_bot() {
    let project = Project::sleeping_bot();
    project.configure_valid();

    let first = project.botctl().args(&["start", "-o", "json"]).passes().json()["pid"].clone();
    let restarted = project.botctl().args(&["restart", "-o", "json"]).passes().json();
    assert_eq!(restarted["stopped_pid"], first);
    assert_ne!(restarted["pid"], first);

    project.botctl().args(&["stop"]).passes();
}

#[test]
fn manager_log_records_operations() {
    let project = Project::sleeping_bot();
    project.botctl().args(&["start"]).fails_with(2);

    project.botctl().args(&["logs", "-n", "5"]).passes().stdout_has("invalid credentials");
    project.botctl().args(&["logs", "--clear"]).passes().stdout_has("Cleared");
    assert_eq!(project.read(".botctl/logs/botctl.log"), "");
}

#[test]
fn bot_log_with_invalid_utf8_is_shown() {
    let project = Project::sleeping_bot();
    std::fs::create_dir_all(project.join(".botctl/logs")).unwrap();
    std::fs::write(project.join(".botctl/logs/bot.log"), b"ready\n\xff\xfe\n").unwrap();
    project.botctl().args(&["logs", "--bot"]).passes().stdout_has("ready").stdout_has("\u{FFFD}");
}
