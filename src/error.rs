//! Error types for prodrel modules using thiserror.

use thiserror::Error;

/// Errors from git subprocess operations.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("git executable not found on PATH. Install git and retry.")]
    NotInstalled,

    #[error("Failed to spawn `{command}`: {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with {}: {stderr}",
            code.map_or("unknown status".to_string(), |c| format!("code {c}")))]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Repository has no tags; push a version tag before releasing")]
    NoTags,

    #[error("No version tag points at '{reference}'")]
    NoVersionTag { reference: String },

    #[error("Malformed git log entry: {0}")]
    MalformedLog(String),
}

/// Errors from remote URL parsing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteUrlError {
    #[error("Remote URL is empty")]
    Empty,

    #[error("'{0}' is a local path, not a remote URL")]
    LocalPath(String),

    #[error("Invalid remote URL '{url}': {reason}")]
    Invalid { url: String, reason: String },
}

/// Errors from GitHub API operations.
#[derive(Error, Debug)]
pub enum GitHubError {
    #[error(
        "GitHub authentication failed: no token found. Set GH_TOKEN or GITHUB_TOKEN environment variable"
    )]
    AuthenticationFailed,

    #[error("Failed to build GitHub client: {0}")]
    ClientBuild(#[source] Box<octocrab::Error>),

    #[error("No release found for tag {tag}")]
    ReleaseNotFound { tag: String },

    #[error("A release already exists for tag {tag}")]
    ReleaseAlreadyExists { tag: String },

    #[error("Failed to parse repository URL: owner and repository are unknown")]
    InvalidRepositoryUrl,

    #[error("GitHub API request failed ({operation}): {source}")]
    Api {
        operation: &'static str,
        #[source]
        source: Box<octocrab::Error>,
    },
}

/// Top-level error for a release run.
#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    GitHub(#[from] GitHubError),

    #[error("Failed to write release notes: {0}")]
    Output(#[from] std::io::Error),
}

impl ReleaseError {
    /// Process exit code for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            ReleaseError::Output(_) => 1,
            ReleaseError::Git(_) => 2,
            ReleaseError::GitHub(GitHubError::AuthenticationFailed) => 3,
            ReleaseError::GitHub(GitHubError::ReleaseAlreadyExists { .. }) => 4,
            ReleaseError::GitHub(_) => 5,
        }
    }

    /// True when creation collided with a release made by a concurrent run.
    pub fn is_already_exists(&self) -> bool {
        matches!(
            self,
            ReleaseError::GitHub(GitHubError::ReleaseAlreadyExists { .. })
        )
    }
}
