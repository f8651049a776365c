//! Backup snapshot specs

use crate::prelude::*;

#[test]
fn backup_list_starts_empty() {
    let project = Project::empty();
    project.botctl().args(&["backup", "list"]).passes().stdout_has("No backups");
}

#[test]
fn backup_create_and_restore_round_trip() {
    let project = Project::empty();
    project.configure_valid();
    let original = project.read(".env");

    let created = project.botctl().args(&["backup", "create", "-o", "json"]).passes().json();
    let id = created["id"].as_str().unwrap().to_string();

    let listed = project.botctl().args(&["backup", "list", "-o", "json"]).passes().json();
    assert_eq!(listed[0]["id"], id.as_str());

    project.file(".env", "DISCORD_TOKEN=clobbered\n");
    project.botctl().args(&["backup", "restore", &id]).passes().stdout_has(".env");
    similar_asserts::assert_eq!(project.read(".env"), original);
}

#[test]
fn restore_of_unknown_snapshot_fails() {
    let project = Project::empty();
    project.botctl().args(&["backup", "restore", "20200101-000000-000"]).fails_with(1).stderr_has("not found");
}

#[test]
fn backup_clean_keeps_requested_count() {
    let project = Project::empty();
    project.configure_valid();
    for _ in 0..3 {
        project.botctl().args(&["backup", "create"]).passes();
    }
    project.botctl().args(&["backup", "clean", "--keep", "1"]).passes().stdout_has("Removed 2 backup(s)");

    let listed = project.botctl().args(&["backup", "list", "-o", "json"]).passes().json();
    assert_eq!(listed.as_array().unwrap().len(), 1);
}
