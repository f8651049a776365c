//! CLI help output specs

use crate::prelude::*;

#[test]
fn no_args_shows_usage_and_exits_zero() {
    cli().passes().stdout_has("Usage:");
}

#[test]
fn help_lists_commands() {
    cli()
        .args(&["--help"])
        .passes()
        .stdout_has("install")
        .stdout_has("configure")
        .stdout_has("start")
        .stdout_has("stop")
        .stdout_has("deploy")
        .stdout_has("update")
        .stdout_has("backup")
        .stdout_has("logs");
}

#[test]
fn update_help_shows_subcommands() {
    cli().args(&["update", "--help"]).passes().stdout_has("run").stdout_has("check").stdout_has("auto");
}

#[test]
fn backup_help_shows_subcommands() {
    cli()
        .args(&["backup", "--help"])
        .passes()
        .stdout_has("list")
        .stdout_has("create")
        .stdout_has("restore")
        .stdout_has("clean");
}

#[test]
fn version_shows_version() {
    cli().args(&["--version"]).passes().stdout_has("0.2");
}

#[test]
fn deploy_rejects_both_targets() {
    cli().args(&["deploy", "--guild", "--global"]).fails().stderr_has("cannot be used with");
}
