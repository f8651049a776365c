//! Self-update command specs (no network)

use crate::prelude::*;

#[test]
fn auto_update_toggle_persists() {
    let project = Project::empty();
    project.botctl().args(&["update", "auto"]).passes().stdout_has("Auto-update is off");
    project.botctl().args(&["update", "auto", "on"]).passes().stdout_has("Auto-update is on");

    let state: serde_json::Value = serde_json::from_str(&project.read("update-state.json")).unwrap();
    assert_eq!(state["autoUpdateEnabled"], true);

    project.botctl().args(&["update", "auto", "off"]).passes();
    project.botctl().args(&["update", "auto", "-o", "json"]).passes().stdout_has("false");
}

#[test]
fn update_without_remote_fails_before_touching_anything() {
    // Without git this is still a precondition failure
    let project = Project::empty();
    project.configure_valid();
    project.botctl().args(&["update", "run"]).fails_with(4);
    assert!(!project.exists(".botctl/backups"));
    assert!(!project.exists(".git"));
}
