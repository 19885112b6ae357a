//! Production release pipeline.
//!
//! Strictly sequential: resolve the current and previous release tags, read
//! and parse the commits between them, render notes, then replace any
//! existing release for the current tag with a fresh one.

pub mod context;

use std::io::Write;

use tracing::{info, warn};

use crate::changelog::{
    NotesContext, ReleaseNotes, RepoLinks, generate_summary, render_release_notes,
    render_terminal,
};
use crate::commit::{ParsedCommit, filter_commits, parse_commits};
use crate::convention::Convention;
use crate::error::{GitError, GitHubError, ReleaseError};
use crate::git::{GitCli, select_version_tag};
use crate::github::{PublishedRelease, ReleaseDescriptor, ReleasePublisher, delete_release_for_tag};
use crate::remote::{RepoIdentity, extract_host_parts, parse_remote_url};

pub use context::{API_URL_VAR, CI_TAG_VAR, EnvSnapshot, ReleaseContext, ReleaseSettings};

/// Lower bound of the release range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeStart {
    /// Version tag, or commit hash when the boundary carries no version tag.
    pub label: String,
    /// Exclusive `git log` lower bound; `None` starts at the root commit.
    pub log_from: Option<String>,
}

/// Everything needed to publish, computed before any API call.
#[derive(Debug, Clone)]
pub struct PreparedRelease {
    pub current_tag: String,
    pub previous_tag: String,
    pub target_commitish: String,
    pub repository_url: Option<String>,
    pub repository: RepoIdentity,
    pub commits: Vec<ParsedCommit>,
    pub notes: String,
    pub summary: String,
}

#[derive(Debug, Clone)]
pub enum Preparation {
    /// Production already points at the latest tag.
    UpToDate { tag: String },
    Ready(Box<PreparedRelease>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseOutcome {
    UpToDate { tag: String },
    DryRun { tag: String },
    Published(PublishedRelease),
}

/// Find where the release range starts.
///
/// Uses the version tag on the production commit, or the production commit
/// itself when it has none. Without a production tag the repository's first
/// commit takes its place.
pub async fn resolve_range_start(
    git: &GitCli,
    settings: &ReleaseSettings,
) -> Result<RangeStart, GitError> {
    let prefix = settings.tag_prefix.as_str();

    let (commit, is_production) = match git.commit_at_tag(&settings.production_tag).await {
        Ok(commit) => (commit, true),
        Err(GitError::CommandFailed { stderr, .. }) => {
            warn!(
                tag = %settings.production_tag,
                %stderr,
                "No production tag; treating this as the first production release"
            );
            (git.first_commit().await?, false)
        }
        Err(e) => return Err(e),
    };

    let tags = git.tags_pointing_at(&commit, prefix).await?;
    let start = match select_version_tag(&tags, prefix) {
        Some(tag) => RangeStart {
            label: tag.clone(),
            log_from: Some(tag),
        },
        None if is_production => RangeStart {
            label: commit.clone(),
            log_from: Some(commit),
        },
        None => RangeStart {
            label: commit,
            log_from: None,
        },
    };
    Ok(start)
}

/// Resolve tags, collect commits and render notes.
pub async fn prepare_release(
    ctx: &ReleaseContext,
    git: &GitCli,
    convention: &Convention,
) -> Result<Preparation, ReleaseError> {
    let settings = &ctx.settings;

    let current_tag = git.latest_version_tag(&settings.tag_prefix).await?;
    let start = resolve_range_start(git, settings).await?;
    info!(current = %current_tag, previous = %start.label, "Resolved release range");

    if current_tag == start.label {
        return Ok(Preparation::UpToDate { tag: current_tag });
    }

    let raw = git.commit_log(start.log_from.as_deref(), &current_tag).await?;
    let commits = filter_commits(parse_commits(&raw, &convention.parser));
    info!(read = raw.len(), kept = commits.len(), "Parsed commits");

    let repository_url = git.resolve_remote_url(&settings.remote).await;
    let (repository, links) = match &repository_url {
        Some(url) => {
            let identity = parse_remote_url(url);
            if identity.is_empty() {
                warn!(%url, "Could not parse owner/repo from remote URL");
            }
            let links = RepoLinks::new(extract_host_parts(url).browse_base(), &identity);
            (identity, links)
        }
        None => (RepoIdentity::default(), None),
    };

    let mut notes_ctx = NotesContext::today(current_tag.clone());
    notes_ctx.previous_tag = Some(start.label.clone());
    notes_ctx.current_tag = Some(current_tag.clone());
    notes_ctx.links = links;

    let grouped = ReleaseNotes::build(&commits, &convention.writer, notes_ctx.links.as_ref());
    let notes = render_release_notes(&grouped, &convention.writer, &notes_ctx);
    let summary = generate_summary(&grouped);

    let target_commitish = git.commit_at_tag(&current_tag).await?;

    Ok(Preparation::Ready(Box::new(PreparedRelease {
        current_tag,
        previous_tag: start.label,
        target_commitish,
        repository_url,
        repository,
        commits,
        notes,
        summary,
    })))
}

/// Replace any release for the prepared tag with a new one.
pub async fn publish_release<P: ReleasePublisher + ?Sized>(
    publisher: &P,
    prepared: &PreparedRelease,
    settings: &ReleaseSettings,
) -> Result<PublishedRelease, GitHubError> {
    if prepared.repository.is_empty() {
        return Err(GitHubError::InvalidRepositoryUrl);
    }
    let RepoIdentity { owner, repo } = &prepared.repository;

    delete_release_for_tag(publisher, owner, repo, &prepared.current_tag).await?;

    let descriptor = ReleaseDescriptor {
        owner: owner.clone(),
        repo: repo.clone(),
        tag_name: prepared.current_tag.clone(),
        target_commitish: prepared.target_commitish.clone(),
        name: settings.release_name.clone(),
        body: prepared.notes.clone(),
        prerelease: false,
    };
    publisher.create_release(&descriptor).await
}

/// Run the whole pipeline, printing notes to `out`.
///
/// `connect` builds the publisher. It is only called once there is a
/// release to publish and the notes are printed, so up-to-date and dry runs
/// need no credentials.
pub async fn run_release<P, F, W>(
    ctx: &ReleaseContext,
    git: &GitCli,
    connect: F,
    out: &mut W,
    styled: bool,
) -> Result<ReleaseOutcome, ReleaseError>
where
    P: ReleasePublisher,
    F: FnOnce() -> Result<P, GitHubError>,
    W: Write,
{
    let convention = Convention::angular();

    let prepared = match prepare_release(ctx, git, &convention).await? {
        Preparation::UpToDate { tag } => {
            info!(%tag, "Production release already points at the latest tag");
            return Ok(ReleaseOutcome::UpToDate { tag });
        }
        Preparation::Ready(prepared) => prepared,
    };

    info!(summary = %prepared.summary, "Rendered release notes");
    if styled {
        write!(out, "{}", render_terminal(&prepared.notes))?;
    } else {
        write!(out, "{}", prepared.notes)?;
    }
    out.flush()?;

    if ctx.settings.dry_run {
        info!(tag = %prepared.current_tag, "Dry run; skipping release publication");
        return Ok(ReleaseOutcome::DryRun {
            tag: prepared.current_tag,
        });
    }

    let publisher = connect()?;
    let release = publish_release(&publisher, &prepared, &ctx.settings).await?;
    info!(tag = %release.tag_name, url = %release.html_url, "Created production release");
    Ok(ReleaseOutcome::Published(release))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::releases::MockReleasePublisher;

    fn prepared(identity: RepoIdentity) -> PreparedRelease {
        PreparedRelease {
            current_tag: "v1.1.0".to_string(),
            previous_tag: "v1.0.0".to_string(),
            target_commitish: "abc123".to_string(),
            repository_url: Some("git@github.com:owner/repo.git".to_string()),
            repository: identity,
            commits: Vec::new(),
            notes: "# v1.1.0\n".to_string(),
            summary: String::new(),
        }
    }

    fn identity() -> RepoIdentity {
        RepoIdentity {
            owner: "owner".to_string(),
            repo: "repo".to_string(),
        }
    }

    #[tokio::test]
    async fn test_publish_creates_after_missing_release() {
        let mut mock = MockReleasePublisher::new();
        mock.expect_find_release_by_tag().returning(|_, _, tag| {
            Err(GitHubError::ReleaseNotFound {
                tag: tag.to_string(),
            })
        });
        mock.expect_delete_release().times(0);
        mock.expect_create_release()
            .times(1)
            .withf(|d| {
                d.tag_name == "v1.1.0"
                    && d.target_commitish == "abc123"
                    && d.name == "Production"
                    && d.body == "# v1.1.0\n"
                    && !d.prerelease
            })
            .returning(|d| {
                Ok(PublishedRelease {
                    id: 7,
                    tag_name: d.tag_name.clone(),
                    html_url: "https://github.com/owner/repo/releases/tag/v1.1.0".to_string(),
                })
            });

        let release = publish_release(&mock, &prepared(identity()), &ReleaseSettings::default())
            .await
            .expect("publish");
        assert_eq!(release.id, 7);
    }

    #[tokio::test]
    async fn test_publish_requires_repository_identity() {
        let mut mock = MockReleasePublisher::new();
        mock.expect_find_release_by_tag().times(0);
        mock.expect_create_release().times(0);

        let result = publish_release(
            &mock,
            &prepared(RepoIdentity::default()),
            &ReleaseSettings::default(),
        )
        .await;
        assert!(matches!(result, Err(GitHubError::InvalidRepositoryUrl)));
    }

    #[tokio::test]
    async fn test_publish_reports_already_exists() {
        let mut mock = MockReleasePublisher::new();
        mock.expect_find_release_by_tag().returning(|_, _, _| Ok(1));
        mock.expect_delete_release().returning(|_, _, _| Ok(()));
        mock.expect_create_release().returning(|d| {
            Err(GitHubError::ReleaseAlreadyExists {
                tag: d.tag_name.clone(),
            })
        });

        let result = publish_release(&mock, &prepared(identity()), &ReleaseSettings::default()).await;
        assert!(matches!(result, Err(GitHubError::ReleaseAlreadyExists { .. })));
    }
}
