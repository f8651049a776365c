// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dependency installation and the first-run credentials template.

use std::path::PathBuf;

use botctl_adapters::{PackageAdapter, PackageError};
use botctl_core::config::PackageConfig;
use botctl_core::{credentials, Paths};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InstallError {
    #[error("{0} is not installed")]
    ToolMissing(String),

    #[error(transparent)]
    Package(#[from] PackageError),

    #[error("failed to write credentials template: {0}")]
    Template(#[source] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InstallReport {
    /// A placeholder credentials file was written.
    pub template_created: bool,
}

pub struct Dependencies<P: PackageAdapter> {
    packages: P,
    program: String,
    /// `None` when the bot has no managed dependency directory.
    deps_dir: Option<PathBuf>,
    env_file: PathBuf,
}

impl<P: PackageAdapter> Dependencies<P> {
    pub fn new(packages: P, config: &PackageConfig, paths: &Paths) -> Self {
        Self {
            packages,
            program: config.program.clone(),
            deps_dir: (!config.deps_dir.is_empty()).then(|| paths.work_dir.join(&config.deps_dir)),
            env_file: paths.env_file.clone(),
        }
    }

    /// Whether the dependency directory exists.
    pub fn installed(&self) -> bool {
        self.deps_dir.as_ref().is_none_or(|dir| dir.is_dir())
    }

    pub async fn tool_available(&self) -> bool {
        self.packages.available().await
    }

    /// Clean the package cache, install, then make sure a credentials file exists.
    pub async fn install(&self) -> Result<InstallReport, InstallError> {
        self.require_tool().await?;

        if let Err(e) = self.packages.clean_cache().await {
            tracing::warn!(error = %e, "cache clean failed, continuing with install");
        }
        self.packages.install().await?;
        tracing::info!(target: "system", program = %self.program, "dependencies installed");

        let template_created =
            credentials::write_template_if_missing(&self.env_file).map_err(InstallError::Template)?;
        if template_created {
            tracing::info!(path = %self.env_file.display(), "wrote credentials template");
        }
        Ok(InstallReport { template_created })
    }

    /// Install only when the dependency directory is missing. Returns whether
    /// an install ran.
    pub async fn ensure_installed(&self) -> Result<bool, InstallError> {
        if self.installed() {
            return Ok(false);
        }
        tracing::info!(program = %self.program, "dependencies missing, installing");
        self.install().await?;
        Ok(true)
    }

    pub async fn update(&self) -> Result<(), InstallError> {
        self.require_tool().await?;
        self.packages.update().await?;
        tracing::info!(target: "system", program = %self.program, "dependencies updated");
        Ok(())
    }

    async fn require_tool(&self) -> Result<(), InstallError> {
        if self.packages.available().await {
            Ok(())
        } else {
            tracing::error!(program = %self.program, "package manager not found");
            Err(InstallError::ToolMissing(self.program.clone()))
        }
    }
}

#[cfg(test)]
#[path = "deps_tests.rs"]
mod tests;
