//! GitHub token resolution.
//!
//! Tokens come from the captured environment, in order:
//! 1. `GH_TOKEN`
//! 2. `GITHUB_TOKEN`

use crate::error::GitHubError;
use crate::release::EnvSnapshot;

/// Accepted token variables, highest priority first.
pub const TOKEN_VARS: [&str; 2] = ["GH_TOKEN", "GITHUB_TOKEN"];

/// Get a GitHub token from the environment snapshot.
pub fn get_github_token(env: &EnvSnapshot) -> Result<String, GitHubError> {
    env.first_of(&TOKEN_VARS)
        .map(str::to_string)
        .ok_or(GitHubError::AuthenticationFailed)
}
