//! Subprocess wrapper around the system `git` binary.
//!
//! Every call runs with an explicit working directory and environment taken
//! from the release context, so the accessor never depends on ambient
//! process state.

use std::path::PathBuf;
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::GitError;
use crate::release::EnvSnapshot;

/// Check that a `git` executable is reachable.
pub fn check_git_installed() -> Result<(), GitError> {
    which::which("git")
        .map(|_| ())
        .map_err(|_| GitError::NotInstalled)
}

/// Git accessor bound to one repository directory.
#[derive(Debug, Clone)]
pub struct GitCli {
    cwd: PathBuf,
    env: EnvSnapshot,
}

impl GitCli {
    pub fn new(cwd: impl Into<PathBuf>, env: EnvSnapshot) -> Self {
        Self {
            cwd: cwd.into(),
            env,
        }
    }

    pub fn env(&self) -> &EnvSnapshot {
        &self.env
    }

    /// Run `git <args>` and return its stdout.
    pub(crate) async fn run(&self, args: &[&str]) -> Result<String, GitError> {
        let command = format!("git {}", args.join(" "));
        debug!(%command, cwd = %self.cwd.display(), "Running git");

        let output = Command::new("git")
            .args(args)
            .current_dir(&self.cwd)
            .env_clear()
            .envs(self.env.process_env())
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| GitError::SpawnFailed {
                command: command.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(GitError::CommandFailed {
                command,
                code: output.status.code(),
                stderr,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Run a command whose output is a single value (hash, URL, ...).
    pub(crate) async fn run_line(&self, args: &[&str]) -> Result<String, GitError> {
        Ok(self.run(args).await?.trim().to_string())
    }

    /// Configured URL of `remote`.
    ///
    /// A missing or unreadable remote is logged and reported as `None`; the
    /// notes can still be rendered without repository links.
    pub async fn resolve_remote_url(&self, remote: &str) -> Option<String> {
        let key = format!("remote.{}.url", remote);
        match self.run_line(&["config", "--get", &key]).await {
            Ok(url) if !url.is_empty() => Some(url),
            Ok(_) => {
                warn!(%remote, "Remote has an empty URL");
                None
            }
            Err(e) => {
                warn!(%remote, error = %e, "Could not read remote URL");
                None
            }
        }
    }
}
