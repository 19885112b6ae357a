//! prodrel - publish a production GitHub release from conventional commits.
//!
//! # Overview
//!
//! prodrel finds the newest version tag and the commit the `Production` tag
//! points at, renders angular-style release notes for the commits between
//! them, and replaces any GitHub release for that version with a fresh one.

pub mod changelog;
pub mod commit;
pub mod convention;
pub mod error;
pub mod git;
pub mod github;
pub mod release;
pub mod remote;

// Re-export commonly used types
pub use commit::ParsedCommit;
pub use convention::Convention;
pub use error::{GitError, GitHubError, ReleaseError, RemoteUrlError};
pub use git::{GitCli, RawCommit};
pub use release::{
    EnvSnapshot, PreparedRelease, ReleaseContext, ReleaseOutcome, ReleaseSettings, run_release,
};
pub use remote::RepoIdentity;
