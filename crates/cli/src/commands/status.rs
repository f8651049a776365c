// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `botctl status` - One-screen overview

use std::io::Write;

use anyhow::Result;
use botctl_adapters::VcsAdapter;
use botctl_core::{credentials, UpdateState};
use botctl_engine::BotState;
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::logs::{log_stats, LogStats};
use crate::color;
use crate::context::Context;
use crate::output::{format_bytes, format_or_json, OutputFormat};

#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub bot: BotState,
    pub credentials: CredentialStatus,
    pub dependencies_installed: bool,
    pub package_tool: ToolStatus,
    pub git: ToolStatus,
    pub auto_update: bool,
    pub last_update: Option<DateTime<Utc>>,
    pub backups: BackupStats,
    pub log: Option<LogStats>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CredentialStatus {
    pub valid: bool,
    /// Masked; never the full token.
    pub token: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolStatus {
    pub name: String,
    pub available: bool,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct BackupStats {
    pub count: usize,
    pub total_bytes: u64,
}

pub async fn status(ctx: &Context, format: OutputFormat) -> Result<()> {
    let report = collect(ctx).await?;
    format_or_json(format, &report, || render(&report, &mut std::io::stdout()))
}

async fn collect(ctx: &Context) -> Result<StatusReport> {
    let deps = ctx.dependencies();
    let state = UpdateState::load(&ctx.paths.update_state)?;
    let snapshots = ctx.backups().list();

    Ok(StatusReport {
        bot: ctx.supervisor().state().await,
        credentials: CredentialStatus {
            valid: credentials::is_valid_file(&ctx.paths.env_file, ctx.config.strictness()),
            token: credentials::load(&ctx.paths.env_file).map(|set| set.masked_token()),
        },
        dependencies_installed: deps.installed(),
        package_tool: ToolStatus {
            name: ctx.config.packages.program.clone(),
            available: deps.tool_available().await,
        },
        git: ToolStatus { name: "git".to_string(), available: ctx.vcs().available().await },
        auto_update: state.auto_update_enabled,
        last_update: state.last_update_timestamp,
        backups: BackupStats {
            count: snapshots.len(),
            total_bytes: snapshots.iter().map(|s| s.size_bytes).sum(),
        },
        log: log_stats(&ctx.paths.log_file),
    })
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

pub fn render(report: &StatusReport, out: &mut dyn Write) {
    let label = |name: &str| color::context(&format!("{name:<14}"));

    let bot = match report.bot {
        BotState::Running { pid } => format!("{} (pid {pid})", color::status("running", true)),
        BotState::Stopped => color::status("stopped", false),
    };
    let _ = writeln!(out, "{}{bot}", label("Bot:"));

    let creds = match (&report.credentials.token, report.credentials.valid) {
        (Some(token), true) => format!("{} ({token})", color::status("valid", true)),
        (Some(_), false) => color::status("invalid", false),
        (None, _) => color::status("missing", false),
    };
    let _ = writeln!(out, "{}{creds}", label("Credentials:"));
    let _ = writeln!(
        out,
        "{}{}",
        label("Dependencies:"),
        color::status(if report.dependencies_installed { "installed" } else { "missing" }, report.dependencies_installed)
    );
    for tool in [&report.package_tool, &report.git] {
        let _ = writeln!(
            out,
            "{}{}",
            label(&format!("{}:", tool.name)),
            color::status(if tool.available { "found" } else { "not found" }, tool.available)
        );
    }

    let _ = writeln!(out, "{}{}", label("Auto-update:"), yes_no(report.auto_update));
    let last = report
        .last_update
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "never".to_string());
    let _ = writeln!(out, "{}{last}", label("Last update:"));
    let _ = writeln!(
        out,
        "{}{} ({})",
        label("Backups:"),
        report.backups.count,
        color::muted(&format_bytes(report.backups.total_bytes))
    );
    match report.log {
        Some(stats) => {
            let _ = writeln!(
                out,
                "{}{} lines ({})",
                label("Log:"),
                stats.lines,
                color::muted(&format_bytes(stats.size_bytes))
            );
        }
        None => {
            let _ = writeln!(out, "{}{}", label("Log:"), color::muted("empty"));
        }
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
