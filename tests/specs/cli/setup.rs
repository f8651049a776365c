//! Credentials setup specs

use crate::prelude::*;

#[test]
fn configure_writes_credentials_and_masks_token() {
    let project = Project::empty();
    project.configure_valid();

    let env = project.read(".env");
    assert!(env.contains(&format!("DISCORD_TOKEN={VALID_TOKEN}")));
    assert!(env.contains(&format!("CLIENT_ID={CLIENT_ID}")));

    let status = project.botctl().args(&["status", "-o", "json"]).passes().json();
    assert_eq!(status["credentials"]["valid"], true);
    assert_eq!(status["credentials"]["token"], "MTAxMjM0NT...");
}

#[test]
fn configure_rejects_placeholder_token() {
    let project = Project::empty();
    project
        .botctl()
        .args(&["configure", "--token", "your_bot_token_here", "--client-id", CLIENT_ID, "--guild-id", GUILD_ID])
        .fails_with(2);
    assert!(!project.exists(".env"));
}

#[test]
fn configure_strips_pasted_mention_syntax_from_ids() {
    let project = Project::empty();
    project
        .botctl()
        .args(&["configure", "--token", VALID_TOKEN, "--client-id", "<@123456>", "--guild-id", GUILD_ID])
        .passes();
    assert!(project.read(".env").contains("CLIENT_ID=123456\n"));
}

#[test]
fn reset_removes_credentials() {
    let project = Project::empty();
    project.configure_valid();
    project.botctl().args(&["reset"]).passes().stdout_has("Removed");
    assert!(!project.exists(".env"));
    project.botctl().args(&["reset"]).passes().stdout_has("No credentials file");
}

#[test]
fn deploy_requires_valid_credentials() {
    let project = Project::sleeping_bot();
    project.botctl().args(&["deploy", "--guild"]).fails_with(2);
}
