// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Adapters for external I/O: the OS process table, git, and the package manager.

pub mod package;
pub mod process;
pub mod subprocess;
pub mod vcs;

pub use package::{CommandPackageAdapter, PackageAdapter, PackageError};
pub use process::{NativeController, ProcessController, ProcessError, SpawnRequest};
pub use subprocess::{run_with_timeout, SubprocessError};
pub use vcs::{GitAdapter, VcsAdapter, VcsError};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use package::{FakePackageAdapter, PackageCall};
#[cfg(any(test, feature = "test-support"))]
pub use process::{FakeProcessController, ProcessCall};
#[cfg(any(test, feature = "test-support"))]
pub use vcs::{FakeVcsAdapter, VcsOp};
