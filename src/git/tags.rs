//! Tag and commit resolution.

use semver::Version;
use tracing::debug;

use crate::error::GitError;

use super::cli::GitCli;

impl GitCli {
    /// Commit hash that `tag` (or any ref) resolves to.
    ///
    /// Fails with `CommandFailed` when the ref does not exist; callers decide
    /// whether that is fatal.
    pub async fn commit_at_tag(&self, tag: &str) -> Result<String, GitError> {
        self.run_line(&["rev-list", "-1", tag]).await
    }

    /// Oldest root commit reachable from HEAD.
    pub async fn first_commit(&self) -> Result<String, GitError> {
        self.root_commit("HEAD").await
    }

    /// Oldest root commit reachable from `rev`.
    pub(crate) async fn root_commit(&self, rev: &str) -> Result<String, GitError> {
        let out = self.run(&["rev-list", "--max-parents=0", rev]).await?;
        out.lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .last()
            .map(str::to_string)
            .ok_or_else(|| GitError::MalformedLog(format!("{} has no root commit", rev)))
    }

    /// Hash of the most recently tagged commit.
    ///
    /// The commit of a CI-supplied tag wins; otherwise the newest tagged
    /// commit across all tags is used.
    pub async fn latest_tagged_commit(&self) -> Result<String, GitError> {
        if let Some(tag) = self.env().ci_tag() {
            debug!(%tag, "Using CI-supplied tag");
            return self.commit_at_tag(tag).await;
        }

        let commit = self.run_line(&["rev-list", "--tags", "--max-count=1"]).await?;
        if commit.is_empty() {
            return Err(GitError::NoTags);
        }
        Ok(commit)
    }

    /// Tags pointing exactly at `commit` whose names start with `prefix`.
    pub async fn tags_pointing_at(
        &self,
        commit: &str,
        prefix: &str,
    ) -> Result<Vec<String>, GitError> {
        let out = self.run(&["tag", "--points-at", commit]).await?;
        Ok(out
            .lines()
            .map(str::trim)
            .filter(|t| !t.is_empty() && t.starts_with(prefix))
            .map(str::to_string)
            .collect())
    }

    /// Version tag of the most recently tagged commit.
    pub async fn latest_version_tag(&self, prefix: &str) -> Result<String, GitError> {
        let commit = self.latest_tagged_commit().await?;
        let tags = self.tags_pointing_at(&commit, prefix).await?;
        select_version_tag(&tags, prefix).ok_or(GitError::NoVersionTag { reference: commit })
    }
}

/// Pick the release tag among several pointing at one commit.
///
/// The highest semver wins; tags that do not parse rank below those that do
/// and otherwise keep their listing order.
pub fn select_version_tag(tags: &[String], prefix: &str) -> Option<String> {
    let mut best: Option<(&String, Option<Version>)> = None;

    for tag in tags {
        let version = tag
            .strip_prefix(prefix)
            .and_then(|raw| Version::parse(raw).ok());
        let better = match &best {
            None => true,
            Some((_, None)) => version.is_some(),
            Some((_, Some(current))) => version.as_ref().is_some_and(|v| v > current),
        };
        if better {
            best = Some((tag, version));
        }
    }

    best.map(|(tag, _)| tag.clone())
}

/// Extract semver version from a tag name.
/// Handles both "v1.2.3" and "1.2.3" formats.
pub fn get_version_from_tag(tag_name: &str) -> Option<Version> {
    let version_str = tag_name.strip_prefix('v').unwrap_or(tag_name);
    Version::parse(version_str).ok()
}
