//! GitHub API operations using octocrab.

pub mod auth;
pub mod releases;

pub use auth::get_github_token;
pub use releases::{
    OctocrabPublisher, PublishedRelease, ReleaseDescriptor, ReleasePublisher,
    delete_release_for_tag,
};
