//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::path::Path;

use git2::{Oid, Repository, Signature};
use prodrel::git::GitCli;
use prodrel::release::{CI_TAG_VAR, EnvSnapshot, ReleaseContext, ReleaseSettings};
use serde_json::{Map, Value, json};

/// Process environment without a CI tag override.
pub fn clean_env() -> EnvSnapshot {
    EnvSnapshot::capture()
        .without(CI_TAG_VAR)
        .without("GH_TOKEN")
        .without("GITHUB_TOKEN")
}

/// A test git repository builder for integration tests.
pub struct TestRepo {
    pub dir: tempfile::TempDir,
    pub repo: Repository,
}

impl TestRepo {
    /// Create a new empty git repository in a temp directory.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let repo = Repository::init(dir.path()).expect("Failed to init git repo");
        Self { dir, repo }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Git accessor for this repository with `env`.
    pub fn cli_with_env(&self, env: EnvSnapshot) -> GitCli {
        GitCli::new(self.path(), env)
    }

    pub fn cli(&self) -> GitCli {
        self.cli_with_env(clean_env())
    }

    /// Release context for this repository with default settings.
    pub fn context(&self) -> ReleaseContext {
        ReleaseContext::new(self.path(), clean_env(), ReleaseSettings::default())
    }

    /// Get the test signature for commits.
    fn signature(&self) -> Signature<'_> {
        Signature::now("Test User", "test@example.com").expect("Failed to create signature")
    }

    /// Create a commit with the given message. Returns the commit OID.
    pub fn commit(&self, message: &str) -> Oid {
        let sig = self.signature();

        // Content keyed on the current HEAD so every commit has a change
        let file_path = self.path().join("test.txt");
        let head = self
            .repo
            .head()
            .ok()
            .and_then(|h| h.target())
            .map(|oid| oid.to_string())
            .unwrap_or_default();
        std::fs::write(&file_path, format!("{}\n{}\n", message, head))
            .expect("Failed to write test file");

        let mut index = self.repo.index().expect("Failed to get index");
        index
            .add_path(Path::new("test.txt"))
            .expect("Failed to add file");
        index.write().expect("Failed to write index");
        let tree_id = index.write_tree().expect("Failed to write tree");
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");

        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("Failed to create commit")
    }

    /// Create a lightweight tag pointing to the given OID.
    pub fn tag_lightweight(&self, name: &str, oid: Oid) {
        let obj = self
            .repo
            .find_object(oid, None)
            .expect("Failed to find object");
        self.repo
            .tag_lightweight(name, &obj, true)
            .expect("Failed to create lightweight tag");
    }

    /// Create an annotated tag pointing to the given OID.
    pub fn tag_annotated(&self, name: &str, oid: Oid, message: &str) {
        let sig = self.signature();
        let obj = self
            .repo
            .find_object(oid, None)
            .expect("Failed to find object");
        self.repo
            .tag(name, &obj, &sig, message, true)
            .expect("Failed to create annotated tag");
    }

    /// Point the `origin` remote at `url`.
    pub fn set_origin(&self, url: &str) {
        self.repo
            .remote("origin", url)
            .expect("Failed to add origin remote");
    }
}

/// Create a mock user object with all fields GitHub API returns.
pub fn mock_user(login: &str, id: u64) -> Value {
    let api = format!("https://api.github.com/users/{}", login);
    let mut user = Map::new();
    user.insert("login".into(), json!(login));
    user.insert("id".into(), json!(id));
    user.insert("node_id".into(), json!(format!("MDQ6VXNlcnt{}", id)));
    user.insert("avatar_url".into(), json!(format!("https://avatars.githubusercontent.com/u/{}?v=4", id)));
    user.insert("gravatar_id".into(), json!(""));
    user.insert("url".into(), json!(api));
    user.insert("html_url".into(), json!(format!("https://github.com/{}", login)));
    user.insert("followers_url".into(), json!(format!("{}/followers", api)));
    user.insert("following_url".into(), json!(format!("{}/following{{/other_user}}", api)));
    user.insert("gists_url".into(), json!(format!("{}/gists{{/gist_id}}", api)));
    user.insert("starred_url".into(), json!(format!("{}/starred{{/owner}}{{/repo}}", api)));
    user.insert("subscriptions_url".into(), json!(format!("{}/subscriptions", api)));
    user.insert("organizations_url".into(), json!(format!("{}/orgs", api)));
    user.insert("repos_url".into(), json!(format!("{}/repos", api)));
    user.insert("events_url".into(), json!(format!("{}/events{{/privacy}}", api)));
    user.insert("received_events_url".into(), json!(format!("{}/received_events", api)));
    user.insert("type".into(), json!("User"));
    user.insert("site_admin".into(), json!(false));
    Value::Object(user)
}

/// Create a mock release object as returned by the releases API.
pub fn mock_release(id: u64, tag: &str, body: &str) -> Value {
    let api = "https://api.github.com/repos/owner/repo";
    json!({
        "url": format!("{}/releases/{}", api, id),
        "html_url": format!("https://github.com/owner/repo/releases/tag/{}", tag),
        "assets_url": format!("{}/releases/{}/assets", api, id),
        "upload_url": format!("https://uploads.github.com/repos/owner/repo/releases/{}/assets{{?name,label}}", id),
        "tarball_url": format!("{}/tarball/{}", api, tag),
        "zipball_url": format!("{}/zipball/{}", api, tag),
        "id": id,
        "node_id": format!("MDc6UmVsZWFzZ{}", id),
        "tag_name": tag,
        "target_commitish": "main",
        "name": "Production",
        "body": body,
        "draft": false,
        "prerelease": false,
        "created_at": "2024-01-15T10:00:00Z",
        "published_at": "2024-01-15T10:00:00Z",
        "author": mock_user("releaser", 7),
        "assets": []
    })
}
