// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use std::path::Path;

use crate::config::{CommandSpec, Config, Timeouts};
use crate::credentials::{self, CredentialSet};

/// A token that passes strict validation.
pub const VALID_TOKEN: &str =
    "MTAxMjM0NTY3ODkwMTIzNDU2Nw.GaBcDe.abcdefghijklmnopqrstuvwxyz0123456789AB";

pub fn valid_credentials() -> CredentialSet {
    CredentialSet::new(VALID_TOKEN, "123456789012345678", "876543210987654321")
}

pub fn write_valid_credentials(env_file: &Path) {
    let _ = std::fs::write(env_file, valid_credentials().render());
}

pub fn write_placeholder_credentials(env_file: &Path) {
    let _ = std::fs::write(env_file, credentials::template());
}

/// Config whose bot is a long `sleep`, with short timeouts.
pub fn sleeping_bot_config() -> Config {
    Config {
        bot: CommandSpec::new("sleep", &["30"]),
        timeouts: Timeouts { git_secs: 10, install_secs: 10, stop_secs: 2, deploy_secs: 10 },
        ..Config::default()
    }
}
