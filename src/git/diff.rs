//! Staged diff query.
//!
//! Runs `git diff --cached --ignore-all-space` in the requested directory,
//! inheriting the user's git config. Whitespace-only changes are ignored so a
//! pure reformat never reaches the remote model.

use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::error::{CommitgenError, GitError};

/// Arguments for the staged diff query.
const DIFF_ARGS: &[&str] = &["diff", "--cached", "--ignore-all-space"];

/// Return the staged diff of the repository containing `cwd`.
///
/// Fails with [`GitError::NotInstalled`] when no `git` executable is on the
/// search path and with [`GitError::NonZeroExit`] when git refuses to run
/// (most commonly because `cwd` is not inside a repository).
pub async fn staged_diff(cwd: &Path) -> Result<String, GitError> {
    if which::which("git").is_err() {
        return Err(GitError::NotInstalled);
    }

    let output = Command::new("git")
        .args(DIFF_ARGS)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                GitError::NotInstalled
            } else {
                GitError::SpawnFailed(e)
            }
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(GitError::NonZeroExit {
            code: output.status.code(),
            stderr,
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Return the staged diff, rejecting change sets with nothing but whitespace.
pub async fn read_staged_diff(cwd: &Path) -> Result<String, CommitgenError> {
    let diff = staged_diff(cwd).await.map_err(CommitgenError::Execution)?;

    if diff.trim().is_empty() {
        return Err(CommitgenError::EmptyDiff);
    }

    debug!("Staged diff: {} bytes", diff.len());
    Ok(diff)
}
