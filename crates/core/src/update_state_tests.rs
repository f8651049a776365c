// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::TimeZone;

#[test]
fn first_load_creates_file_with_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("update-state.json");

    let state = UpdateState::load_or_init(&path).unwrap();

    assert_eq!(state, UpdateState::default());
    assert!(path.exists());
    assert_eq!(state.backup_retention_count, DEFAULT_RETENTION);
}

#[test]
fn load_reads_defaults_without_creating_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("update-state.json");

    assert_eq!(UpdateState::load(&path).unwrap(), UpdateState::default());
    assert!(!path.exists());

    std::fs::write(&path, r#"{"backupRetentionCount": 4}"#).unwrap();
    assert_eq!(UpdateState::load(&path).unwrap().backup_retention_count, 4);
}

#[test]
fn missing_keys_merge_with_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("update-state.json");
    std::fs::write(&path, r#"{"autoUpdateEnabled": true}"#).unwrap();

    let state = UpdateState::load_or_init(&path).unwrap();

    assert!(state.auto_update_enabled);
    assert_eq!(state.last_update_timestamp, None);
    assert_eq!(state.backup_retention_count, DEFAULT_RETENTION);
}

#[test]
fn unknown_keys_are_ignored() {
    let state: UpdateState =
        serde_json::from_str(r#"{"backupRetentionCount": 2, "somethingElse": 1}"#).unwrap();
    assert_eq!(state.backup_retention_count, 2);
}

#[test]
fn corrupt_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("update-state.json");
    std::fs::write(&path, "{not json").unwrap();

    let state = UpdateState::load_or_init(&path).unwrap();

    assert_eq!(state, UpdateState::default());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "{not json");
}

#[test]
fn save_then_load_keeps_timestamp() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("update-state.json");
    let at = Utc.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap();
    let state = UpdateState {
        auto_update_enabled: true,
        last_update_timestamp: Some(at),
        backup_retention_count: 3,
    };

    state.save(&path).unwrap();
    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(raw.contains("lastUpdateTimestamp"));

    assert_eq!(UpdateState::load_or_init(&path).unwrap(), state);
}

#[test]
fn retention_is_at_least_one() {
    let state = UpdateState { backup_retention_count: 0, ..UpdateState::default() };
    assert_eq!(state.retention(), 1);
}
