// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `botctl install | configure | reset`

use anyhow::Result;
use botctl_core::CredentialSet;
use clap::Args;

use crate::color;
use crate::context::Context;
use crate::exit_error::{codes, ExitError};
use crate::output::{format_or_json, OutputFormat};

#[derive(Args)]
pub struct ConfigureArgs {
    /// Bot token from the Discord developer portal
    #[arg(long)]
    pub token: String,

    /// Application (client) id
    #[arg(long)]
    pub client_id: String,

    /// Guild id used for guild-scoped command deploys
    #[arg(long)]
    pub guild_id: String,
}

pub async fn install(ctx: &Context, format: OutputFormat) -> Result<()> {
    let report = ctx.dependencies().install().await.map_err(ExitError::from)?;
    let env_file = ctx.paths.env_file.display().to_string();
    format_or_json(format, &report, || {
        println!("Dependencies installed");
        if report.template_created {
            println!("Wrote credentials template to {env_file}");
            println!("Fill it in with {}", color::literal("botctl configure"));
        }
    })
}

pub fn configure(ctx: &Context, args: ConfigureArgs, format: OutputFormat) -> Result<()> {
    let _lock = ctx.lock()?;
    let set = CredentialSet::new(args.token.trim(), &args.client_id, &args.guild_id);
    if !set.validate(ctx.config.strictness()) {
        return Err(ExitError::new(
            codes::INVALID_CONFIG,
            "credentials rejected: token must look like a bot token and both ids must be numeric",
        )
        .into());
    }

    set.save(&ctx.paths.env_file)?;
    tracing::info!(target: "system", path = %ctx.paths.env_file.display(), "credentials saved");

    let masked = set.masked_token();
    let obj = serde_json::json!({
        "path": ctx.paths.env_file,
        "token": masked,
        "client_id": set.client_id,
        "guild_id": set.guild_id,
    });
    format_or_json(format, &obj, || {
        println!("Credentials saved to {}", ctx.paths.env_file.display());
        println!("  token:     {masked}");
        println!("  client id: {}", set.client_id);
        println!("  guild id:  {}", set.guild_id);
    })
}

pub fn reset(ctx: &Context, format: OutputFormat) -> Result<()> {
    let _lock = ctx.lock()?;
    let removed = match std::fs::remove_file(&ctx.paths.env_file) {
        Ok(()) => true,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
        Err(e) => return Err(e.into()),
    };
    if removed {
        tracing::info!(target: "system", path = %ctx.paths.env_file.display(), "credentials removed");
    }

    let obj = serde_json::json!({ "removed": removed });
    format_or_json(format, &obj, || {
        if removed {
            println!("Removed {}", ctx.paths.env_file.display());
        } else {
            println!("No credentials file to remove");
        }
    })
}
