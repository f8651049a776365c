// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `botctl deploy`

use anyhow::Result;
use botctl_engine::{deploy_commands, DeployTarget};
use clap::Args;

use crate::context::Context;
use crate::exit_error::ExitError;
use crate::output::{format_or_json, OutputFormat};

#[derive(Args)]
#[group(multiple = false)]
pub struct DeployArgs {
    /// Register commands in the configured guild (default)
    #[arg(long)]
    pub guild: bool,

    /// Register commands globally
    #[arg(long)]
    pub global: bool,
}

impl DeployArgs {
    pub fn target(&self) -> DeployTarget {
        match (self.guild, self.global) {
            (false, true) => DeployTarget::Global,
            _ => DeployTarget::Guild,
        }
    }
}

pub async fn deploy(ctx: &Context, args: DeployArgs, format: OutputFormat) -> Result<()> {
    let target = args.target();
    let stdout = deploy_commands(
        target,
        &ctx.config.deploy,
        &ctx.paths,
        ctx.config.strictness(),
        ctx.config.timeouts.deploy(),
    )
    .await
    .map_err(ExitError::from)?;

    let obj = serde_json::json!({ "target": target.to_string(), "output": stdout });
    format_or_json(format, &obj, || {
        let trimmed = stdout.trim_end();
        if !trimmed.is_empty() {
            println!("{trimmed}");
        }
        match target {
            DeployTarget::Guild => println!("Commands deployed to guild"),
            DeployTarget::Global => println!("Commands deployed globally (may take up to an hour to appear)"),
        }
    })
}
