// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `botctl update` - Self-update commands

use anyhow::Result;
use botctl_core::UpdateState;
use botctl_engine::{set_auto_update, UpdateError, UpdateReport};
use clap::{Args, Subcommand, ValueEnum};

use crate::color;
use crate::context::Context;
use crate::exit_error::ExitError;
use crate::output::{format_or_json, OutputFormat};

#[derive(Args)]
pub struct UpdateArgs {
    #[command(subcommand)]
    pub command: UpdateCommand,
}

#[derive(Subcommand)]
pub enum UpdateCommand {
    /// Back up local state, pull the remote branch, reinstall, restart
    Run,
    /// Report whether the remote branch has changes
    Check,
    /// Show or set auto-update before start
    Auto {
        /// New setting; omit to show the current one
        #[arg(value_enum)]
        state: Option<Toggle>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

pub async fn update(ctx: &Context, args: UpdateArgs, format: OutputFormat) -> Result<()> {
    match args.command {
        UpdateCommand::Run => run(ctx, format).await,
        UpdateCommand::Check => check(ctx, format).await,
        UpdateCommand::Auto { state } => auto(ctx, state, format),
    }
}

async fn run(ctx: &Context, format: OutputFormat) -> Result<()> {
    let _lock = ctx.lock()?;
    match ctx.updater().run().await {
        Ok(report) => format_or_json(format, &report, || print_report(&report)),
        Err(e) => {
            if let UpdateError::Failed { rollback, .. } = &e {
                eprintln!("Rollback:");
                eprint!("{rollback}");
            }
            Err(ExitError::from(e).into())
        }
    }
}

fn print_report(report: &UpdateReport) {
    println!("{}", color::header("Update complete"));
    println!("  snapshot: {}", report.snapshot);
    if report.changed_files.is_empty() {
        println!("  no tracked files changed");
    } else {
        println!("  changed:  {} file(s)", report.changed_files.len());
        for path in &report.changed_files {
            println!("    {}", color::muted(path));
        }
    }
    match (report.stopped_pid, report.restarted_pid, &report.restart_error) {
        (Some(_), Some(pid), _) => println!("  bot restarted (pid {pid})"),
        (Some(_), None, Some(err)) => {
            println!("  {}: {err}", color::status("bot failed to restart", false));
        }
        _ => println!("  bot was not running; left stopped"),
    }
}

async fn check(ctx: &Context, format: OutputFormat) -> Result<()> {
    let result = ctx.updater().check_for_updates().await.map_err(ExitError::from)?;
    format_or_json(format, &result, || {
        if !result.available {
            println!("Up to date");
            return;
        }
        println!("{}", color::status("Update available", true));
        for path in &result.changed {
            println!("  {}", color::muted(path));
        }
        println!("Run {} to apply it", color::literal("botctl update run"));
    })
}

fn auto(ctx: &Context, state: Option<Toggle>, format: OutputFormat) -> Result<()> {
    let current = match state {
        Some(toggle) => set_auto_update(&ctx.paths, toggle == Toggle::On)?,
        None => UpdateState::load(&ctx.paths.update_state)?,
    };
    let enabled = current.auto_update_enabled;
    let obj = serde_json::json!({ "auto_update_enabled": enabled });
    format_or_json(format, &obj, || {
        println!("Auto-update is {}", if enabled { "on" } else { "off" });
    })
}
