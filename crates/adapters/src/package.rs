// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Package-manager collaborator (npm by default).
//!
//! The manager treats the package manager as a black box: each operation
//! either succeeds or fails with an opaque subprocess error.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;

use crate::subprocess::{run_checked, tool_available, SubprocessError};

#[derive(Debug, Error)]
pub enum PackageError {
    #[error("{0} is not installed")]
    Unavailable(String),

    #[error(transparent)]
    Subprocess(#[from] SubprocessError),
}

#[async_trait]
pub trait PackageAdapter: Clone + Send + Sync + 'static {
    /// Whether the package tool is installed on the host.
    async fn available(&self) -> bool;
    async fn clean_cache(&self) -> Result<(), PackageError>;
    async fn install(&self) -> Result<(), PackageError>;
    async fn update(&self) -> Result<(), PackageError>;
}

/// Runs the configured package tool in the bot's working directory.
#[derive(Clone, Debug)]
pub struct CommandPackageAdapter {
    program: String,
    work_dir: PathBuf,
    timeout: Duration,
}

impl CommandPackageAdapter {
    pub fn new(program: impl Into<String>, work_dir: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self { program: program.into(), work_dir: work_dir.into(), timeout }
    }

    fn is_npm(&self) -> bool {
        self.program == "npm" || self.program.ends_with("npm.cmd")
    }

    async fn run(&self, args: &[&str]) -> Result<(), PackageError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(args).current_dir(&self.work_dir);
        let description = format!("{} {}", self.program, args.join(" "));
        tracing::info!(command = %description, "running package manager");
        run_checked(cmd, self.timeout, &description).await?;
        Ok(())
    }
}

#[async_trait]
impl PackageAdapter for CommandPackageAdapter {
    async fn available(&self) -> bool {
        tool_available(&self.program).await
    }

    async fn clean_cache(&self) -> Result<(), PackageError> {
        if self.is_npm() {
            self.run(&["cache", "clean", "--force"]).await
        } else {
            self.run(&["cache", "clean"]).await
        }
    }

    async fn install(&self) -> Result<(), PackageError> {
        if self.is_npm() {
            self.run(&["install", "--no-fund", "--no-audit"]).await
        } else {
            self.run(&["install"]).await
        }
    }

    async fn update(&self) -> Result<(), PackageError> {
        if self.is_npm() {
            self.run(&["update", "--no-fund", "--no-audit"]).await
        } else {
            self.run(&["update"]).await
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{PackageAdapter, PackageError};
    use crate::subprocess::SubprocessError;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Recorded package-manager operation
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum PackageCall {
        CleanCache,
        Install,
        Update,
    }

    struct FakePackageState {
        available: bool,
        fail: Option<PackageCall>,
        calls: Vec<PackageCall>,
    }

    #[derive(Clone)]
    pub struct FakePackageAdapter {
        inner: Arc<Mutex<FakePackageState>>,
    }

    impl Default for FakePackageAdapter {
        fn default() -> Self {
            Self {
                inner: Arc::new(Mutex::new(FakePackageState {
                    available: true,
                    fail: None,
                    calls: Vec::new(),
                })),
            }
        }
    }

    impl FakePackageAdapter {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_available(&self, available: bool) {
            self.inner.lock().available = available;
        }

        pub fn fail_on(&self, call: PackageCall) {
            self.inner.lock().fail = Some(call);
        }

        pub fn calls(&self) -> Vec<PackageCall> {
            self.inner.lock().calls.clone()
        }

        fn record(&self, call: PackageCall) -> Result<(), PackageError> {
            let mut inner = self.inner.lock();
            inner.calls.push(call);
            if inner.fail == Some(call) {
                return Err(PackageError::Subprocess(SubprocessError::Failed {
                    description: format!("{call:?}"),
                    code: Some(1),
                    stderr: "injected failure".to_string(),
                }));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl PackageAdapter for FakePackageAdapter {
        async fn available(&self) -> bool {
            self.inner.lock().available
        }

        async fn clean_cache(&self) -> Result<(), PackageError> {
            self.record(PackageCall::CleanCache)
        }

        async fn install(&self) -> Result<(), PackageError> {
            self.record(PackageCall::Install)
        }

        async fn update(&self) -> Result<(), PackageError> {
            self.record(PackageCall::Update)
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakePackageAdapter, PackageCall};

#[cfg(test)]
#[path = "package_tests.rs"]
mod tests;
