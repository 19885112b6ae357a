//! Release lookup, deletion and creation via octocrab.

use async_trait::async_trait;
use octocrab::Octocrab;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::GitHubError;
use crate::release::EnvSnapshot;

use super::auth::get_github_token;

const CREATE_RELEASE: &str = "create release";

/// Payload for creating a release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseDescriptor {
    pub owner: String,
    pub repo: String,
    pub tag_name: String,
    pub target_commitish: String,
    pub name: String,
    pub body: String,
    pub prerelease: bool,
}

/// A release as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedRelease {
    pub id: u64,
    pub tag_name: String,
    pub html_url: String,
}

/// Release operations against the hosting API.
///
/// This abstraction allows mocking the API in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReleasePublisher: Send + Sync {
    /// Id of the release tagged `tag`; `ReleaseNotFound` if there is none.
    async fn find_release_by_tag(&self, owner: &str, repo: &str, tag: &str)
    -> Result<u64, GitHubError>;

    async fn delete_release(&self, owner: &str, repo: &str, release_id: u64)
    -> Result<(), GitHubError>;

    /// `ReleaseAlreadyExists` if a release for the tag was created meanwhile.
    async fn create_release(
        &self,
        descriptor: &ReleaseDescriptor,
    ) -> Result<PublishedRelease, GitHubError>;
}

/// Delete the release tagged `tag`, if there is one.
///
/// Returns whether a release was deleted. A missing release, or one that
/// disappears between lookup and deletion, is not an error.
pub async fn delete_release_for_tag<P: ReleasePublisher + ?Sized>(
    publisher: &P,
    owner: &str,
    repo: &str,
    tag: &str,
) -> Result<bool, GitHubError> {
    let release_id = match publisher.find_release_by_tag(owner, repo, tag).await {
        Ok(id) => id,
        Err(GitHubError::ReleaseNotFound { .. }) => {
            debug!(%tag, "No existing release to delete");
            return Ok(false);
        }
        Err(e) => return Err(e),
    };

    match publisher.delete_release(owner, repo, release_id).await {
        Ok(()) => {
            info!(%tag, release_id, "Deleted existing release");
            Ok(true)
        }
        Err(GitHubError::ReleaseNotFound { .. }) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Publisher backed by the GitHub REST API.
pub struct OctocrabPublisher {
    client: Octocrab,
}

impl OctocrabPublisher {
    /// Build a client authenticated with `token`, optionally against a
    /// GitHub Enterprise `api_url`.
    pub fn new(token: &str, api_url: Option<&str>) -> Result<Self, GitHubError> {
        let mut builder = Octocrab::builder().personal_token(token.to_string());
        if let Some(url) = api_url {
            builder = builder
                .base_uri(url)
                .map_err(|e| GitHubError::ClientBuild(Box::new(e)))?;
        }
        let client = builder
            .build()
            .map_err(|e| GitHubError::ClientBuild(Box::new(e)))?;
        Ok(Self { client })
    }

    /// Build a client from the token in `env`.
    pub fn from_env(env: &EnvSnapshot, api_url: Option<&str>) -> Result<Self, GitHubError> {
        let token = get_github_token(env)?;
        Self::new(&token, api_url)
    }

    /// Use a pre-configured octocrab client.
    ///
    /// This allows dependency injection for testing with mock servers.
    pub fn with_client(client: Octocrab) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ReleasePublisher for OctocrabPublisher {
    async fn find_release_by_tag(
        &self,
        owner: &str,
        repo: &str,
        tag: &str,
    ) -> Result<u64, GitHubError> {
        debug!(%owner, %repo, %tag, "Looking up release by tag");
        self.client
            .repos(owner, repo)
            .releases()
            .get_by_tag(tag)
            .await
            .map(|release| release.id.into_inner())
            .map_err(|e| classify_error(e, "get release by tag", tag))
    }

    async fn delete_release(
        &self,
        owner: &str,
        repo: &str,
        release_id: u64,
    ) -> Result<(), GitHubError> {
        debug!(%owner, %repo, release_id, "Deleting release");
        self.client
            .repos(owner, repo)
            .releases()
            .delete(release_id)
            .await
            .map_err(|e| classify_error(e, "delete release", &release_id.to_string()))
    }

    async fn create_release(
        &self,
        descriptor: &ReleaseDescriptor,
    ) -> Result<PublishedRelease, GitHubError> {
        debug!(
            owner = %descriptor.owner,
            repo = %descriptor.repo,
            tag = %descriptor.tag_name,
            target = %descriptor.target_commitish,
            "Creating release"
        );
        let release = self
            .client
            .repos(&descriptor.owner, &descriptor.repo)
            .releases()
            .create(&descriptor.tag_name)
            .target_commitish(&descriptor.target_commitish)
            .name(&descriptor.name)
            .body(&descriptor.body)
            .draft(false)
            .prerelease(descriptor.prerelease)
            .send()
            .await
            .map_err(|e| classify_error(e, CREATE_RELEASE, &descriptor.tag_name))?;

        Ok(PublishedRelease {
            id: release.id.into_inner(),
            tag_name: release.tag_name,
            html_url: release.html_url.to_string(),
        })
    }
}

/// Map an octocrab error onto the error kinds callers branch on.
///
/// Only API responses are classified: 404 on a lookup or delete means the
/// release is gone, 422 with an `already_exists` validation error means a
/// release for the tag was created meanwhile. Everything else is an `Api`
/// error for `operation`.
fn classify_error(error: octocrab::Error, operation: &'static str, tag: &str) -> GitHubError {
    if let octocrab::Error::GitHub { source, .. } = &error {
        let status = source.status_code.as_u16();
        if status == 422 && has_already_exists(source) {
            return GitHubError::ReleaseAlreadyExists {
                tag: tag.to_string(),
            };
        }
        if status == 404 && operation != CREATE_RELEASE {
            return GitHubError::ReleaseNotFound {
                tag: tag.to_string(),
            };
        }
    }
    GitHubError::Api {
        operation,
        source: Box::new(error),
    }
}

fn has_already_exists(source: &octocrab::GitHubError) -> bool {
    source.errors.iter().flatten().any(|e| {
        e.get("code").and_then(|code| code.as_str()) == Some("already_exists")
    })
}
