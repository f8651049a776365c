// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations

pub mod backup;
pub mod bot;
pub mod deploy;
pub mod deps;
pub mod logs;
pub mod setup;
pub mod status;
pub mod update;
