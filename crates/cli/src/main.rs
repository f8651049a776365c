// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! botctl - operator console for a Discord bot

mod color;
mod commands;
mod context;
mod exit_error;
mod logging;
mod output;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};

use crate::commands::{backup, bot, deploy, deps, logs, setup, status, update};
use crate::context::Context;
use crate::exit_error::{codes, ExitError};
use crate::output::OutputFormat;

#[derive(Parser)]
#[command(
    name = "botctl",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BUILD_GIT_HASH"), ")"),
    about = "Install, run and update a Discord bot",
    styles = color::styles(),
)]
struct Cli {
    /// Mirror log events to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format
    #[arg(short = 'o', long = "output", value_enum, default_value_t, global = true)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Install dependencies and write a credentials template
    Install,
    /// Write the credentials file
    Configure(setup::ConfigureArgs),
    /// Delete the credentials file
    Reset,
    /// Start the bot in the background
    Start,
    /// Stop the bot
    Stop,
    /// Stop the bot if running, then start it
    Restart,
    /// Show bot, credentials, dependency and update status
    Status,
    /// Register slash commands with Discord
    Deploy(deploy::DeployArgs),
    /// Dependency management
    Deps(deps::DepsArgs),
    /// Self-update from the configured git remote
    Update(update::UpdateArgs),
    /// Manage snapshots of local state
    Backup(backup::BackupArgs),
    /// Show or clear the manager log
    Logs(logs::LogsArgs),
}

fn main() {
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        let _ = Cli::command().print_help();
        return;
    };

    let code = match run(command, cli.output, cli.verbose) {
        Ok(()) => 0,
        Err(err) => match err.downcast_ref::<ExitError>() {
            Some(exit) => {
                eprintln!("error: {}", exit);
                exit.code
            }
            None => {
                eprintln!("error: {:#}", err);
                codes::FAILURE
            }
        },
    };
    std::process::exit(code);
}

fn run(command: Commands, format: OutputFormat, verbose: bool) -> Result<()> {
    let ctx = Context::load()?;
    // Dropped at the end of this function, before the process exits.
    let _log_guard = logging::init(&ctx.paths, verbose);

    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    runtime.block_on(dispatch(command, &ctx, format))
}

async fn dispatch(command: Commands, ctx: &Context, format: OutputFormat) -> Result<()> {
    match command {
        Commands::Install => setup::install(ctx, format).await,
        Commands::Configure(args) => setup::configure(ctx, args, format),
        Commands::Reset => setup::reset(ctx, format),
        Commands::Start => bot::start(ctx, format).await,
        Commands::Stop => bot::stop(ctx, format).await,
        Commands::Restart => bot::restart(ctx, format).await,
        Commands::Status => status::status(ctx, format).await,
        Commands::Deploy(args) => deploy::deploy(ctx, args, format).await,
        Commands::Deps(args) => deps::deps(ctx, args, format).await,
        Commands::Update(args) => update::update(ctx, args, format).await,
        Commands::Backup(args) => backup::backup(ctx, args, format),
        Commands::Logs(args) => logs::logs(ctx, args, format),
    }
}
