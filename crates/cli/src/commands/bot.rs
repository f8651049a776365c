// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `botctl start | stop | restart`

use anyhow::Result;
use botctl_engine::{StartError, UpdateError};

use crate::context::{BotUpdater, Context};
use crate::exit_error::ExitError;
use crate::output::{format_or_json, OutputFormat};

pub async fn start(ctx: &Context, format: OutputFormat) -> Result<()> {
    let _lock = ctx.lock()?;
    let pid = start_locked(ctx).await?;
    let obj = serde_json::json!({ "state": "running", "pid": pid });
    format_or_json(format, &obj, || println!("Bot started (pid {pid})"))
}

pub async fn stop(ctx: &Context, format: OutputFormat) -> Result<()> {
    let _lock = ctx.lock()?;
    let pid = ctx.supervisor().stop().await.map_err(ExitError::from)?;
    let obj = serde_json::json!({ "state": "stopped", "pid": pid });
    format_or_json(format, &obj, || println!("Bot stopped (pid {pid})"))
}

pub async fn restart(ctx: &Context, format: OutputFormat) -> Result<()> {
    let _lock = ctx.lock()?;
    let supervisor = ctx.supervisor();
    let stopped = match supervisor.running_pid().await {
        Some(_) => {
            let pid = supervisor.stop().await.map_err(ExitError::from)?;
            if !supervisor.wait_for_exit(pid, ctx.config.timeouts.stop()).await {
                tracing::warn!(pid, "bot still alive after stop timeout, starting anyway");
            }
            Some(pid)
        }
        None => None,
    };

    let pid = start_locked(ctx).await?;
    let obj = serde_json::json!({ "stopped_pid": stopped, "pid": pid });
    format_or_json(format, &obj, || match stopped {
        Some(old) => println!("Bot restarted (pid {old} -> {pid})"),
        None => println!("Bot was not running; started (pid {pid})"),
    })
}

/// Start sequence shared by `start` and `restart`. The caller holds the lock.
async fn start_locked(ctx: &Context) -> Result<u32> {
    let supervisor = ctx.supervisor();
    if let Some(pid) = supervisor.running_pid().await {
        return Err(ExitError::from(StartError::AlreadyRunning { pid }).into());
    }

    let updater = ctx.updater();
    if updater.auto_update_enabled() {
        auto_update(&updater).await;
    }

    let deps = ctx.dependencies();
    if deps.ensure_installed().await.map_err(ExitError::from)? {
        eprintln!("Installed missing dependencies");
    }

    Ok(supervisor.start().await.map_err(ExitError::from)?)
}

/// Update before starting when something new is upstream. Failures never
/// block the start: a failed update has already been rolled back.
async fn auto_update(updater: &BotUpdater) {
    let check = match updater.check_for_updates().await {
        Ok(check) => check,
        Err(e) => {
            tracing::warn!(error = %e, "auto-update check failed, starting current version");
            return;
        }
    };
    if !check.available {
        return;
    }

    eprintln!("Update available, updating before start");
    match updater.run().await {
        Ok(report) => {
            tracing::info!(target: "system", snapshot = %report.snapshot, "auto-update applied");
        }
        Err(e) => {
            if let UpdateError::Failed { rollback, .. } = &e {
                eprintln!("Rollback:\n{rollback}");
            }
            eprintln!("warning: {e}; starting current version");
            tracing::error!(error = %e, "auto-update failed");
        }
    }
}
