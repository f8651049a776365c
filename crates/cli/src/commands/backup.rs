// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `botctl backup` - Snapshot management

use anyhow::Result;
use botctl_core::UpdateState;
use clap::{Args, Subcommand};

use crate::color;
use crate::context::Context;
use crate::output::{format_bytes, format_or_json, handle_list, OutputFormat};

#[derive(Args)]
pub struct BackupArgs {
    #[command(subcommand)]
    pub command: BackupCommand,
}

#[derive(Subcommand)]
pub enum BackupCommand {
    /// List snapshots, newest first
    List,
    /// Snapshot credentials, process record and update state now
    Create,
    /// Copy a snapshot's files back into the working directory
    Restore {
        /// Snapshot id (see `botctl backup list`)
        id: String,
    },
    /// Delete old snapshots
    Clean {
        /// Snapshots to keep (default: the configured retention count)
        #[arg(long)]
        keep: Option<usize>,
    },
}

pub fn backup(ctx: &Context, args: BackupArgs, format: OutputFormat) -> Result<()> {
    let store = ctx.backups();
    match args.command {
        BackupCommand::List => {
            let snapshots = store.list();
            handle_list(format, &snapshots, "No backups", |items, out| {
                let _ = writeln!(out, "{} {}", color::header(&format!("{:<24}", "ID")), color::header("SIZE"));
                for s in items {
                    let _ = writeln!(out, "{:<24} {}", s.id, color::muted(&format_bytes(s.size_bytes)));
                }
            })
        }
        BackupCommand::Create => {
            let id = store.create_snapshot()?;
            let obj = serde_json::json!({ "id": id });
            format_or_json(format, &obj, || println!("Created backup {id}"))
        }
        BackupCommand::Restore { id } => {
            let _lock = ctx.lock()?;
            let restored = store.restore_snapshot(&id)?;
            let obj = serde_json::json!({ "id": id, "restored": restored });
            format_or_json(format, &obj, || {
                println!("Restored {} file(s) from {id}", restored.len());
                for name in &restored {
                    println!("  {}", color::muted(name));
                }
            })
        }
        BackupCommand::Clean { keep } => {
            let retain = match keep {
                Some(n) => n,
                None => UpdateState::load_or_init(&ctx.paths.update_state)?.retention(),
            };
            let report = store.prune(retain);
            for id in &report.failed {
                eprintln!("warning: could not remove backup {id}");
            }
            format_or_json(format, &report, || {
                println!("Removed {} backup(s), keeping {retain}", report.removed.len());
            })
        }
    }
}
