//! Cloning a single repository into its owner directory

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::{Error, Repository, Result};

/// The external clone operation
#[async_trait]
pub trait Cloner: Send + Sync {
    /// Clone `repo` with `target_dir` as the working directory
    ///
    /// `target_dir` already exists when this is called.
    async fn clone_repository(&self, repo: &Repository, target_dir: &Path) -> Result<()>;
}

/// Clones by running `git clone <clone_url>`
#[derive(Debug, Clone)]
pub struct GitCloner {
    /// Path to the git executable
    git_path: String,
    /// Kill the clone if it runs longer than this
    timeout: Option<Duration>,
    /// Copy git's output to our own stdout/stderr on success
    forward_output: bool,
}

impl GitCloner {
    /// Create a cloner using `git` from PATH
    pub fn new() -> Self {
        Self {
            git_path: "git".to_string(),
            timeout: None,
            forward_output: true,
        }
    }

    /// Set a custom path to the git executable
    pub fn with_git_path(mut self, path: impl Into<String>) -> Self {
        self.git_path = path.into();
        self
    }

    /// Abort clones that take longer than `timeout`
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Enable or disable forwarding of git's output
    pub fn with_forward_output(mut self, forward: bool) -> Self {
        self.forward_output = forward;
        self
    }

    /// Path to the git executable
    pub fn git_path(&self) -> &str {
        &self.git_path
    }

    fn clone_error(repo: &Repository, message: impl Into<String>) -> Error {
        Error::Clone {
            repo: repo.full_name.clone(),
            message: message.into(),
        }
    }
}

impl Default for GitCloner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Cloner for GitCloner {
    async fn clone_repository(&self, repo: &Repository, target_dir: &Path) -> Result<()> {
        debug!(repo = %repo.full_name, dir = %target_dir.display(), "Running git clone");

        let mut cmd = Command::new(&self.git_path);
        cmd.arg("clone")
            .arg(&repo.clone_url)
            .current_dir(target_dir)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, cmd.output())
                .await
                .map_err(|_| {
                    Self::clone_error(repo, format!("git clone timed out after {:?}", limit))
                })?,
            None => cmd.output().await,
        }
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Self::clone_error(
                    repo,
                    format!("git executable not found at '{}'", self.git_path),
                )
            } else {
                Self::clone_error(repo, format!("Failed to run git clone: {}", e))
            }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Self::clone_error(repo, describe_failure(&stderr)));
        }

        if self.forward_output {
            // A closed stdout must not fail a finished clone
            let _ = std::io::stdout().write_all(&output.stdout);
            let _ = std::io::stderr().write_all(&output.stderr);
        }

        Ok(())
    }
}

/// Condense git's stderr into a one-line diagnostic with a hint for common causes
fn describe_failure(stderr: &str) -> String {
    let stderr = stderr.trim();

    let hint = if stderr.contains("already exists and is not an empty directory") {
        Some("destination already exists")
    } else if stderr.contains("Authentication failed") || stderr.contains("Permission denied") {
        Some("authentication failed")
    } else if stderr.contains("Could not resolve host") || stderr.contains("unable to access") {
        Some("network error")
    } else if stderr.contains("not found") || stderr.contains("does not exist") {
        Some("repository not found")
    } else {
        None
    };

    match (hint, stderr.is_empty()) {
        (Some(hint), _) => format!("{}: {}", hint, stderr),
        (None, true) => "git clone exited with a failure status".to_string(),
        (None, false) => stderr.to_string(),
    }
}

/// Directory a repository's owner maps to under `destination`
pub fn owner_dir(destination: &Path, repo: &Repository) -> Result<PathBuf> {
    let root = std::path::absolute(destination).map_err(|source| Error::Filesystem {
        path: destination.to_path_buf(),
        source,
    })?;
    Ok(root.join(repo.owner_login()))
}

/// Clone one repository into `<destination>/<owner>`
///
/// The owner directory is created first. Creation succeeds when the
/// directory already exists, including when another worker created it
/// concurrently.
pub async fn clone_into_owner_dir(
    cloner: &dyn Cloner,
    destination: &Path,
    repo: &Repository,
) -> Result<PathBuf> {
    let target = owner_dir(destination, repo)?;

    tokio::fs::create_dir_all(&target)
        .await
        .map_err(|source| Error::Filesystem {
            path: target.clone(),
            source,
        })?;

    cloner.clone_repository(repo, &target).await?;
    Ok(target.join(&repo.name))
}
