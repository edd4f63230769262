//! Shell-out git collaborator: staged file listing and staged diff.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use thiserror::Error;
use tokio::io::AsyncReadExt;
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum GitError {
    #[error("failed to run git: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("git exited with an error: {0}")]
    Failed(String),

    /// The output exceeded the read ceiling. Output is never truncated.
    #[error("git output exceeds {limit} bytes")]
    Oversized { limit: u64 },
}

#[async_trait]
pub trait GitService: Send + Sync {
    /// Absolute paths of the files in the index that still exist on disk.
    async fn staged_files(&self, root: &Path) -> Result<Vec<PathBuf>, GitError>;

    /// The full staged diff.
    async fn staged_diff(&self, root: &Path) -> Result<String, GitError>;
}

/// Runs the `git` binary found on `PATH`.
pub struct ShellGit {
    max_diff_bytes: u64,
}

impl ShellGit {
    pub fn new(max_diff_bytes: u64) -> Self {
        Self { max_diff_bytes }
    }
}

#[async_trait]
impl GitService for ShellGit {
    async fn staged_files(&self, root: &Path) -> Result<Vec<PathBuf>, GitError> {
        let output = Command::new("git")
            .args(["diff", "--name-only", "--cached"])
            .current_dir(root)
            .stdin(Stdio::null())
            .output()
            .await?;

        if !output.status.success() {
            return Err(GitError::Failed(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        let files: Vec<PathBuf> = String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| root.join(line))
            .filter(|path| path.exists())
            .collect();
        tracing::info!("git reports {} staged files under {:?}", files.len(), root);
        Ok(files)
    }

    async fn staged_diff(&self, root: &Path) -> Result<String, GitError> {
        let mut child = Command::new("git")
            .args(["diff", "--cached"])
            .current_dir(root)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            // Only stdout is drained; a piped stderr could fill up and stall git.
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;

        let mut buffer = Vec::new();
        if let Some(stdout) = child.stdout.take() {
            // One byte past the limit is enough to detect overflow.
            stdout
                .take(self.max_diff_bytes + 1)
                .read_to_end(&mut buffer)
                .await?;
        }

        if buffer.len() as u64 > self.max_diff_bytes {
            if let Err(e) = child.kill().await {
                tracing::debug!("Failed to kill git after oversized diff: {}", e);
            }
            tracing::warn!("Staged diff under {:?} exceeds {} bytes", root, self.max_diff_bytes);
            return Err(GitError::Oversized {
                limit: self.max_diff_bytes,
            });
        }

        let status = child.wait().await?;
        if !status.success() {
            return Err(GitError::Failed(format!("git diff --cached {status}")));
        }

        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
