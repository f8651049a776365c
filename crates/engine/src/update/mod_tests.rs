// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use botctl_adapters::{FakePackageAdapter, FakeProcessController, FakeVcsAdapter, PackageCall, ProcessCall, VcsOp};
use botctl_core::config::BackupConfig;
use botctl_core::test_support::write_valid_credentials;
use botctl_core::{CommandSpec, FakeClock, Strictness};
use chrono::{TimeZone, Utc};

type TestUpdater = Updater<FakeProcessController, FakeVcsAdapter, FakePackageAdapter, FakeClock>;

struct Fixture {
    _dir: tempfile::TempDir,
    paths: Paths,
    controller: FakeProcessController,
    supervisor: Supervisor<FakeProcessController>,
    vcs: FakeVcsAdapter,
    packages: FakePackageAdapter,
    clock: FakeClock,
    updater: TestUpdater,
}

fn fixture_with(remote: &str) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let paths = Paths::new(dir.path());
    write_valid_credentials(&paths.env_file);
    std::fs::write(dir.path().join("index.js"), "v1").unwrap();
    std::fs::write(dir.path().join("package.json"), "{\"version\":1}").unwrap();

    let controller = FakeProcessController::new();
    let supervisor = Supervisor::new(
        controller.clone(),
        paths.clone(),
        CommandSpec::new("node", &["index.js"]),
        Strictness::Strict,
    );
    let vcs = FakeVcsAdapter::new(dir.path());
    vcs.set_remote_files(&[("index.js", "v2"), ("package.json", "{\"version\":2}")]);
    vcs.set_diff(&["index.js", "package.json"]);
    let packages = FakePackageAdapter::new();
    let clock = FakeClock::new();
    let backups = BackupStore::new(&paths, paths.backup_allow_list(&BackupConfig::default()), clock.clone());
    let settings = UpdateConfig { remote: remote.to_string(), ..UpdateConfig::default() };
    let updater = Updater::new(
        supervisor.clone(),
        vcs.clone(),
        packages.clone(),
        backups,
        clock.clone(),
        settings,
        Duration::from_secs(1),
    );
    Fixture { _dir: dir, paths, controller, supervisor, vcs, packages, clock, updater }
}

fn fixture() -> Fixture {
    fixture_with("https://example.invalid/bot.git")
}

fn read(path: &std::path::Path) -> String {
    std::fs::read_to_string(path).unwrap()
}

fn spawn_count(controller: &FakeProcessController) -> usize {
    controller.calls().iter().filter(|c| matches!(c, ProcessCall::Spawn { .. })).count()
}

#[tokio::test]
async fn update_replaces_code_and_keeps_local_state() {
    let f = fixture();
    let credentials = read(&f.paths.env_file);
    let old_pid = f.supervisor.start().await.unwrap();

    let report = f.updater.run().await.unwrap();

    assert_eq!(read(&f.paths.work_dir.join("index.js")), "v2");
    assert_eq!(read(&f.paths.env_file), credentials);
    assert_eq!(report.changed_files, vec!["index.js", "package.json"]);
    assert_eq!(report.previous_head.as_deref(), Some("aaaaaaa"));
    assert_eq!(report.stopped_pid, Some(old_pid));
    let new_pid = report.restarted_pid.unwrap();
    assert_ne!(new_pid, old_pid);
    assert_eq!(f.supervisor.running_pid().await, Some(new_pid));

    assert_eq!(
        f.vcs.calls(),
        vec![
            "fetch",
            "rev-parse HEAD",
            "diff HEAD origin/main",
            "reset --hard origin/main",
            "clean -fd .botctl botctl.toml",
        ]
    );
    assert_eq!(f.packages.calls(), vec![PackageCall::Install]);

    let state = UpdateState::load_or_init(&f.paths.update_state).unwrap();
    assert_eq!(state.last_update_timestamp, Some(f.clock.utc_now()));
    assert_eq!(std::fs::read_dir(&f.paths.tmp_dir).unwrap().count(), 0);
}

#[tokio::test]
async fn update_with_stopped_bot_leaves_it_stopped() {
    let f = fixture();
    let report = f.updater.run().await.unwrap();
    assert_eq!(report.stopped_pid, None);
    assert_eq!(report.restarted_pid, None);
    assert!(!f.supervisor.is_running().await);
    assert!(f.controller.calls().is_empty());
}

#[tokio::test]
async fn install_failure_restores_credentials_and_restarts_bot() {
    let f = fixture();
    let credentials = read(&f.paths.env_file);
    f.supervisor.start().await.unwrap();
    f.packages.fail_on(PackageCall::Install);

    let err = f.updater.run().await.unwrap_err();
    let UpdateError::Failed { phase, rollback, .. } = err else {
        panic!("expected a rolled-back failure");
    };

    assert_eq!(phase, Phase::Installing);
    assert!(rollback.succeeded(), "{rollback}");
    assert_eq!(read(&f.paths.env_file), credentials);
    assert!(f.supervisor.is_running().await);
    assert_eq!(rollback.restarted_pid, f.supervisor.running_pid().await);
    // Critical files win over the tree reset
    assert_eq!(read(&f.paths.work_dir.join("index.js")), "v1");
    assert!(f.vcs.calls().contains(&"reset --hard aaaaaaa".to_string()));
    // Success timestamp is only written by a completed update
    let state = UpdateState::load_or_init(&f.paths.update_state).unwrap();
    assert_eq!(state.last_update_timestamp, None);
}

#[tokio::test]
async fn install_failure_with_stopped_bot_does_not_start_it() {
    let f = fixture();
    let credentials = read(&f.paths.env_file);
    f.packages.fail_on(PackageCall::Install);

    assert!(matches!(f.updater.run().await, Err(UpdateError::Failed { phase: Phase::Installing, .. })));
    assert_eq!(read(&f.paths.env_file), credentials);
    assert!(!f.supervisor.is_running().await);
    assert_eq!(spawn_count(&f.controller), 0);
}

#[tokio::test]
async fn fetch_failure_rolls_back_without_touching_tree() {
    let f = fixture();
    f.supervisor.start().await.unwrap();
    f.vcs.fail_on(VcsOp::Fetch);

    let err = f.updater.run().await.unwrap_err();
    assert!(matches!(err, UpdateError::Failed { phase: Phase::Fetching, .. }));
    assert!(err.to_string().contains("while fetching"));
    assert!(!f.vcs.calls().iter().any(|c| c.starts_with("reset")));
    assert_eq!(read(&f.paths.work_dir.join("index.js")), "v1");
    assert!(f.supervisor.is_running().await);
}

#[tokio::test]
async fn reset_failure_rolls_back() {
    let f = fixture();
    f.vcs.fail_on(VcsOp::Reset);
    let err = f.updater.run().await.unwrap_err();
    let UpdateError::Failed { phase, rollback, .. } = err else {
        panic!("expected a rolled-back failure");
    };
    assert_eq!(phase, Phase::Resetting);
    // The reset back to the old head fails too and is reported, not raised
    assert!(!rollback.succeeded());
    assert!(rollback.steps.iter().any(|s| s.action.starts_with("restore snapshot") && s.ok));
    // Incomplete rollback keeps the critical-file copy around
    assert_eq!(std::fs::read_dir(&f.paths.tmp_dir).unwrap().count(), 1);
}

#[tokio::test]
async fn backup_failure_aborts_before_any_change() {
    let f = fixture();
    f.supervisor.start().await.unwrap();
    std::fs::create_dir_all(&f.paths.state_dir).unwrap();
    std::fs::write(&f.paths.backups_dir, "not a directory").unwrap();

    assert!(matches!(f.updater.run().await, Err(UpdateError::Backup(_))));
    assert!(f.vcs.calls().is_empty());
    assert!(f.packages.calls().is_empty());
    assert!(f.supervisor.is_running().await);
    assert!(!f.controller.calls().iter().any(|c| matches!(c, ProcessCall::Terminate { .. })));
}

#[tokio::test]
async fn stop_failure_keeps_tracking_the_bot() {
    let f = fixture();
    let pid = f.supervisor.start().await.unwrap();
    f.controller.fail_terminate("EPERM");

    let err = f.updater.run().await.unwrap_err();
    let UpdateError::Failed { phase, rollback, .. } = err else {
        panic!("expected a rolled-back failure");
    };
    assert_eq!(phase, Phase::Stopping);
    assert_eq!(rollback.restarted_pid, Some(pid));
    assert_eq!(f.supervisor.running_pid().await, Some(pid));
    assert_eq!(spawn_count(&f.controller), 1);
}

#[tokio::test]
async fn missing_git_is_a_precondition_failure() {
    let f = fixture();
    f.vcs.set_available(false);
    assert!(matches!(f.updater.run().await, Err(UpdateError::VcsUnavailable)));
    assert!(f.vcs.calls().is_empty());
    assert!(!f.paths.backups_dir.exists());
}

#[tokio::test]
async fn non_repository_is_initialized_first() {
    let f = fixture();
    f.vcs.set_repository(false);
    f.updater.run().await.unwrap();
    assert_eq!(f.vcs.calls()[0], "init https://example.invalid/bot.git main");
}

#[tokio::test]
async fn initialization_without_remote_fails() {
    let f = fixture_with("");
    f.vcs.set_repository(false);
    assert!(matches!(f.updater.run().await, Err(UpdateError::Init(VcsError::NoRemote))));
    assert!(!f.paths.backups_dir.exists());
}

#[tokio::test]
async fn update_prunes_to_retention() {
    let f = fixture();
    let state = UpdateState { backup_retention_count: 2, ..UpdateState::default() };
    state.save(&f.paths.update_state).unwrap();

    for _ in 0..3 {
        f.updater.run().await.unwrap();
        f.clock.advance(Duration::from_secs(60));
    }
    assert_eq!(std::fs::read_dir(&f.paths.backups_dir).unwrap().count(), 2);
}

#[tokio::test]
async fn pruning_never_removes_the_snapshot_being_used() {
    let f = fixture();
    let credentials = read(&f.paths.env_file);
    let state = UpdateState { backup_retention_count: 1, ..UpdateState::default() };
    state.save(&f.paths.update_state).unwrap();

    // A snapshot stamped later than the one this update will take
    f.clock.advance(Duration::from_secs(3600));
    let store = BackupStore::new(&f.paths, f.paths.backup_allow_list(&BackupConfig::default()), f.clock.clone());
    let later = store.create_snapshot().unwrap();
    f.clock.set_utc(Utc.with_ymd_and_hms(2025, 12, 31, 23, 0, 0).unwrap());

    f.supervisor.start().await.unwrap();
    f.packages.fail_on(PackageCall::Install);
    let err = f.updater.run().await.unwrap_err();
    let UpdateError::Failed { phase, rollback, .. } = err else {
        panic!("expected a rolled-back failure");
    };

    assert_eq!(phase, Phase::Installing);
    assert!(rollback.succeeded(), "{rollback}");
    assert_eq!(read(&f.paths.env_file), credentials);
    let remaining: Vec<String> = store.list().into_iter().map(|s| s.id).collect();
    assert_eq!(remaining, vec!["20251231-230000-000".to_string()]);
    assert!(!remaining.contains(&later));
}

#[tokio::test]
async fn bot_outliving_stop_is_tracked_not_doubled() {
    let f = fixture();
    let old_pid = f.supervisor.start().await.unwrap();
    f.controller.survive_terminate();

    let report = f.updater.run().await.unwrap();

    assert_eq!(report.stopped_pid, Some(old_pid));
    assert_eq!(report.restarted_pid, None);
    let reason = report.restart_error.unwrap();
    assert!(reason.contains(&format!("pid {old_pid}) did not exit")), "{reason}");
    assert_eq!(spawn_count(&f.controller), 1);
    assert_eq!(f.supervisor.running_pid().await, Some(old_pid));
}

#[tokio::test]
async fn rollback_re_tracks_bot_outliving_stop() {
    let f = fixture();
    let old_pid = f.supervisor.start().await.unwrap();
    f.controller.survive_terminate();
    f.packages.fail_on(PackageCall::Install);

    let err = f.updater.run().await.unwrap_err();
    let UpdateError::Failed { rollback, .. } = err else {
        panic!("expected a rolled-back failure");
    };
    assert!(rollback.succeeded(), "{rollback}");
    assert_eq!(rollback.restarted_pid, Some(old_pid));
    assert_eq!(spawn_count(&f.controller), 1);
}

#[tokio::test]
async fn check_ignores_local_runtime_files() {
    let f = fixture();
    f.vcs.set_diff(&[]);
    f.vcs.set_status(&[".env", "bot.pid", "update-state.json", ".botctl/logs/botctl.log"]);

    let check = f.updater.check_for_updates().await.unwrap();
    assert!(!check.available);
    assert!(check.changed.is_empty());
}

#[tokio::test]
async fn check_reports_other_differences() {
    let f = fixture();
    f.vcs.set_diff(&["index.js"]);
    f.vcs.set_status(&[".env", "commands/ping.js"]);

    let check = f.updater.check_for_updates().await.unwrap();
    assert!(check.available);
    assert_eq!(check.changed, vec!["commands/ping.js", "index.js"]);
}

#[tokio::test]
async fn check_requires_repository() {
    let f = fixture();
    f.vcs.set_repository(false);
    assert!(matches!(f.updater.check_for_updates().await, Err(CheckError::NotRepository)));
}

#[tokio::test]
async fn check_with_unborn_head_reports_available() {
    let f = fixture();
    f.vcs.fail_on(VcsOp::Head);
    assert!(f.updater.check_for_updates().await.unwrap().available);
}

#[test]
fn auto_update_toggle_persists() {
    let f = fixture();
    assert!(!f.updater.auto_update_enabled());
    assert!(!f.paths.update_state.exists());
    let state = set_auto_update(&f.paths, true).unwrap();
    assert!(state.auto_update_enabled);
    assert!(f.updater.auto_update_enabled());
    set_auto_update(&f.paths, false).unwrap();
    assert!(!f.updater.auto_update_enabled());
}
