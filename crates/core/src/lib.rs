// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! botctl-core: data model and policy for the bot manager
//!
//! Nothing in this crate spawns processes; it only reads and writes the
//! manager's small set of persisted files.

pub mod clock;
pub mod config;
pub mod credentials;
pub mod env;
pub mod fs_util;
pub mod process_record;
pub mod update_state;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{CommandSpec, Config, ConfigError, Paths};
pub use credentials::{CredentialSet, Strictness};
pub use process_record::{ProcessRecord, RecordError};
pub use update_state::{UpdateState, UpdateStateError};
