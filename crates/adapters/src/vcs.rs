// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Version-control collaborator for self-update.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;

use crate::subprocess::{run_checked, run_with_timeout, tool_available, SubprocessError};

/// Remote name the manager fetches from.
pub const REMOTE_NAME: &str = "origin";

#[derive(Debug, Error)]
pub enum VcsError {
    #[error("git is not installed")]
    Unavailable,

    #[error("no remote repository configured")]
    NoRemote,

    #[error(transparent)]
    Subprocess(#[from] SubprocessError),
}

/// Remote-tracking ref for `branch`, e.g. `origin/main`.
pub fn remote_ref(branch: &str) -> String {
    format!("{REMOTE_NAME}/{branch}")
}

/// Operations the update workflow needs from the version-control tool.
#[async_trait]
pub trait VcsAdapter: Clone + Send + Sync + 'static {
    /// Whether the tool is installed on the host.
    async fn available(&self) -> bool;

    /// Whether the working directory is already a repository.
    async fn is_repository(&self) -> bool;

    /// Initialize the working directory and point it at `remote_url`/`branch`.
    async fn init(&self, remote_url: &str, branch: &str) -> Result<(), VcsError>;

    /// Fetch remote refs.
    async fn fetch(&self) -> Result<(), VcsError>;

    /// Current `HEAD` commit.
    async fn head_revision(&self) -> Result<String, VcsError>;

    /// Make tracked files identical to `reference`.
    async fn reset_hard(&self, reference: &str) -> Result<(), VcsError>;

    /// Remove untracked files and directories, except paths matching `excludes`.
    async fn clean_untracked(&self, excludes: &[String]) -> Result<(), VcsError>;

    /// Paths that differ between two refs.
    async fn diff_names(&self, from: &str, to: &str) -> Result<Vec<String>, VcsError>;

    /// Paths with local modifications (tracked or untracked).
    async fn status_porcelain(&self) -> Result<Vec<String>, VcsError>;
}

/// Git via the `git` executable.
#[derive(Clone, Debug)]
pub struct GitAdapter {
    work_dir: PathBuf,
    timeout: Duration,
}

impl GitAdapter {
    pub fn new(work_dir: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self { work_dir: work_dir.into(), timeout }
    }

    fn git(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new("git");
        cmd.arg("-C")
            .arg(&self.work_dir)
            .args(args)
            .env_remove("GIT_DIR")
            .env_remove("GIT_WORK_TREE");
        cmd
    }

    async fn run(&self, args: &[&str]) -> Result<String, VcsError> {
        let description = format!("git {}", args.first().copied().unwrap_or_default());
        let output = run_checked(self.git(args), self.timeout, &description).await?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl VcsAdapter for GitAdapter {
    async fn available(&self) -> bool {
        tool_available("git").await
    }

    async fn is_repository(&self) -> bool {
        let cmd = self.git(&["rev-parse", "--is-inside-work-tree"]);
        match run_with_timeout(cmd, self.timeout, "git rev-parse").await {
            Ok(output) => {
                output.status.success() && String::from_utf8_lossy(&output.stdout).trim() == "true"
            }
            Err(_) => false,
        }
    }

    async fn init(&self, remote_url: &str, branch: &str) -> Result<(), VcsError> {
        if remote_url.is_empty() {
            return Err(VcsError::NoRemote);
        }
        self.run(&["init"]).await?;
        let head = format!("refs/heads/{branch}");
        self.run(&["symbolic-ref", "HEAD", &head]).await?;
        if self.run(&["remote", "get-url", REMOTE_NAME]).await.is_ok() {
            self.run(&["remote", "set-url", REMOTE_NAME, remote_url]).await?;
        } else {
            self.run(&["remote", "add", REMOTE_NAME, remote_url]).await?;
        }
        Ok(())
    }

    async fn fetch(&self) -> Result<(), VcsError> {
        self.run(&["fetch", REMOTE_NAME]).await.map(|_| ())
    }

    async fn head_revision(&self) -> Result<String, VcsError> {
        Ok(self.run(&["rev-parse", "HEAD"]).await?.trim().to_string())
    }

    async fn reset_hard(&self, reference: &str) -> Result<(), VcsError> {
        self.run(&["reset", "--hard", reference]).await.map(|_| ())
    }

    async fn clean_untracked(&self, excludes: &[String]) -> Result<(), VcsError> {
        let mut args = vec!["clean", "-fd"];
        for pattern in excludes {
            args.push("-e");
            args.push(pattern);
        }
        self.run(&args).await.map(|_| ())
    }

    async fn diff_names(&self, from: &str, to: &str) -> Result<Vec<String>, VcsError> {
        let out = self.run(&["diff", "--name-only", from, to]).await?;
        Ok(out.lines().map(str::trim).filter(|l| !l.is_empty()).map(String::from).collect())
    }

    async fn status_porcelain(&self) -> Result<Vec<String>, VcsError> {
        let out = self.run(&["status", "--porcelain"]).await?;
        Ok(parse_porcelain(&out))
    }
}

/// Extract paths from `git status --porcelain` (v1) output.
///
/// Renames (`R  old -> new`) report the new path; quoted paths are unquoted.
pub fn parse_porcelain(output: &str) -> Vec<String> {
    output
        .lines()
        .filter(|line| line.len() > 3)
        .filter_map(|line| line.get(3..))
        .map(|path| path.rsplit_once(" -> ").map_or(path, |(_, new)| new))
        .map(|path| path.trim().trim_matches('"').to_string())
        .filter(|path| !path.is_empty())
        .collect()
}

/// Whether `path` is one of `ignored` (exact match or inside an ignored directory).
pub fn is_ignored(path: &str, ignored: &[String]) -> bool {
    let path = Path::new(path);
    ignored.iter().any(|entry| path == Path::new(entry) || path.starts_with(entry))
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{is_ignored, VcsAdapter, VcsError};
    use crate::subprocess::SubprocessError;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::path::PathBuf;
    use std::sync::Arc;

    /// Operations that can be made to fail
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum VcsOp {
        Init,
        Fetch,
        Head,
        Reset,
        Clean,
        Diff,
        Status,
    }

    struct FakeVcsState {
        available: bool,
        repository: bool,
        head: String,
        remote_files: Vec<(String, String)>,
        diff: Vec<String>,
        status: Vec<String>,
        fail: Option<VcsOp>,
        calls: Vec<String>,
    }

    /// Fake repository that rewrites a real directory on reset/clean.
    ///
    /// `reset_hard` writes the configured remote files into the working
    /// directory; `clean_untracked` deletes every other top-level file that
    /// is not excluded. That is enough to wipe credentials and other local
    /// state the way a real clean checkout would.
    #[derive(Clone)]
    pub struct FakeVcsAdapter {
        work_dir: PathBuf,
        inner: Arc<Mutex<FakeVcsState>>,
    }

    impl FakeVcsAdapter {
        pub fn new(work_dir: impl Into<PathBuf>) -> Self {
            Self {
                work_dir: work_dir.into(),
                inner: Arc::new(Mutex::new(FakeVcsState {
                    available: true,
                    repository: true,
                    head: "aaaaaaa".to_string(),
                    remote_files: Vec::new(),
                    diff: Vec::new(),
                    status: Vec::new(),
                    fail: None,
                    calls: Vec::new(),
                })),
            }
        }

        pub fn set_available(&self, available: bool) {
            self.inner.lock().available = available;
        }

        pub fn set_repository(&self, repository: bool) {
            self.inner.lock().repository = repository;
        }

        /// Files present at the remote branch tip.
        pub fn set_remote_files(&self, files: &[(&str, &str)]) {
            self.inner.lock().remote_files =
                files.iter().map(|(p, c)| (p.to_string(), c.to_string())).collect();
        }

        pub fn set_diff(&self, paths: &[&str]) {
            self.inner.lock().diff = paths.iter().map(|s| s.to_string()).collect();
        }

        pub fn set_status(&self, paths: &[&str]) {
            self.inner.lock().status = paths.iter().map(|s| s.to_string()).collect();
        }

        pub fn fail_on(&self, op: VcsOp) {
            self.inner.lock().fail = Some(op);
        }

        pub fn calls(&self) -> Vec<String> {
            self.inner.lock().calls.clone()
        }

        fn record(&self, call: String, op: VcsOp) -> Result<(), VcsError> {
            let mut inner = self.inner.lock();
            inner.calls.push(call.clone());
            if inner.fail == Some(op) {
                return Err(VcsError::Subprocess(SubprocessError::Failed {
                    description: call,
                    code: Some(128),
                    stderr: "injected failure".to_string(),
                }));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl VcsAdapter for FakeVcsAdapter {
        async fn available(&self) -> bool {
            self.inner.lock().available
        }

        async fn is_repository(&self) -> bool {
            self.inner.lock().repository
        }

        async fn init(&self, remote_url: &str, branch: &str) -> Result<(), VcsError> {
            if remote_url.is_empty() {
                return Err(VcsError::NoRemote);
            }
            self.record(format!("init {remote_url} {branch}"), VcsOp::Init)?;
            self.inner.lock().repository = true;
            Ok(())
        }

        async fn fetch(&self) -> Result<(), VcsError> {
            self.record("fetch".to_string(), VcsOp::Fetch)
        }

        async fn head_revision(&self) -> Result<String, VcsError> {
            self.record("rev-parse HEAD".to_string(), VcsOp::Head)?;
            Ok(self.inner.lock().head.clone())
        }

        async fn reset_hard(&self, reference: &str) -> Result<(), VcsError> {
            self.record(format!("reset --hard {reference}"), VcsOp::Reset)?;
            let files = self.inner.lock().remote_files.clone();
            for (path, contents) in files {
                let target = self.work_dir.join(path);
                if let Some(parent) = target.parent() {
                    let _ = std::fs::create_dir_all(parent);
                }
                let _ = std::fs::write(target, contents);
            }
            Ok(())
        }

        async fn clean_untracked(&self, excludes: &[String]) -> Result<(), VcsError> {
            self.record(format!("clean -fd {}", excludes.join(" ")), VcsOp::Clean)?;
            let tracked: Vec<String> =
                self.inner.lock().remote_files.iter().map(|(p, _)| p.clone()).collect();
            let Ok(entries) = std::fs::read_dir(&self.work_dir) else {
                return Ok(());
            };
            for entry in entries.filter_map(Result::ok) {
                let name = entry.file_name().to_string_lossy().into_owned();
                let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
                if is_file && !tracked.contains(&name) && !is_ignored(&name, excludes) {
                    let _ = std::fs::remove_file(entry.path());
                }
            }
            Ok(())
        }

        async fn diff_names(&self, from: &str, to: &str) -> Result<Vec<String>, VcsError> {
            self.record(format!("diff {from} {to}"), VcsOp::Diff)?;
            Ok(self.inner.lock().diff.clone())
        }

        async fn status_porcelain(&self) -> Result<Vec<String>, VcsError> {
            self.record("status".to_string(), VcsOp::Status)?;
            Ok(self.inner.lock().status.clone())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeVcsAdapter, VcsOp};

#[cfg(test)]
#[path = "vcs_tests.rs"]
mod tests;
