// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-invocation wiring: resolves the working directory and configuration,
//! then builds the engine components against the real adapters.

use anyhow::Result;
use botctl_adapters::{CommandPackageAdapter, GitAdapter, NativeController};
use botctl_core::{env, Config, Paths, SystemClock};
use botctl_engine::{BackupStore, Dependencies, ManagerLock, Supervisor, Updater};

use crate::exit_error::ExitError;

pub type BotUpdater = Updater<NativeController, GitAdapter, CommandPackageAdapter, SystemClock>;

pub struct Context {
    pub paths: Paths,
    pub config: Config,
}

impl Context {
    pub fn load() -> Result<Self> {
        let work_dir = env::work_dir()?;
        let config = Config::load(&work_dir)?;
        Ok(Self { paths: Paths::new(work_dir), config })
    }

    pub fn supervisor(&self) -> Supervisor<NativeController> {
        Supervisor::new(
            NativeController::default(),
            self.paths.clone(),
            self.config.bot.clone(),
            self.config.strictness(),
        )
    }

    pub fn vcs(&self) -> GitAdapter {
        GitAdapter::new(&self.paths.work_dir, self.config.timeouts.git())
    }

    pub fn packages(&self) -> CommandPackageAdapter {
        CommandPackageAdapter::new(
            &self.config.packages.program,
            &self.paths.work_dir,
            self.config.timeouts.install(),
        )
    }

    pub fn backups(&self) -> BackupStore<SystemClock> {
        let allow_list = self.paths.backup_allow_list(&self.config.backup);
        BackupStore::new(&self.paths, allow_list, SystemClock)
    }

    pub fn dependencies(&self) -> Dependencies<CommandPackageAdapter> {
        Dependencies::new(self.packages(), &self.config.packages, &self.paths)
    }

    pub fn updater(&self) -> BotUpdater {
        Updater::new(
            self.supervisor(),
            self.vcs(),
            self.packages(),
            self.backups(),
            SystemClock,
            self.config.update.clone(),
            self.config.timeouts.stop(),
        )
    }

    /// Take the manager lock for a mutating command.
    pub fn lock(&self) -> Result<ManagerLock, ExitError> {
        Ok(ManagerLock::acquire(&self.paths.lock_file)?)
    }
}
