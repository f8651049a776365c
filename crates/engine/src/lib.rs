// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! botctl-engine: bot supervision, backups and self-update

pub mod backup;
pub mod deploy;
pub mod deps;
pub mod lock;
pub mod supervisor;
pub mod update;

pub use backup::{BackupError, BackupStore, PruneReport, RestoreError, SnapshotInfo};
pub use deploy::{deploy_commands, DeployError, DeployTarget};
pub use deps::{Dependencies, InstallError, InstallReport};
pub use lock::{LockError, ManagerLock};
pub use supervisor::{BotState, StartError, StopError, Supervisor};
pub use update::{
    set_auto_update, CheckError, Phase, RollbackReport, StepError, UpdateCheck, UpdateError,
    UpdateReport, Updater,
};
