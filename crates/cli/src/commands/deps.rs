// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `botctl deps`

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::context::Context;
use crate::exit_error::ExitError;
use crate::output::{format_or_json, OutputFormat};

#[derive(Args)]
pub struct DepsArgs {
    #[command(subcommand)]
    pub command: DepsCommand,
}

#[derive(Subcommand)]
pub enum DepsCommand {
    /// Update dependencies to the newest allowed versions
    Update,
}

pub async fn deps(ctx: &Context, args: DepsArgs, format: OutputFormat) -> Result<()> {
    match args.command {
        DepsCommand::Update => {
            ctx.dependencies().update().await.map_err(ExitError::from)?;
            let obj = serde_json::json!({ "updated": true });
            format_or_json(format, &obj, || println!("Dependencies updated"))
        }
    }
}
