//! Commit log enumeration.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::error::GitError;

use super::cli::GitCli;

const FIELD_SEP: char = '\u{1f}';
const RECORD_SEP: char = '\u{1e}';

/// hash, raw body, ref decorations, strict ISO committer date.
const LOG_FORMAT: &str = "--format=%H%x1f%B%x1f%d%x1f%cI%x1e";

/// A commit as read from `git log`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCommit {
    pub hash: String,
    pub message: String,
    pub git_tags: String,
    pub committer_date: DateTime<FixedOffset>,
}

impl GitCli {
    /// Commits in `(from, to]`, newest first.
    ///
    /// With no `from`, the range starts at the root commit of `to`, which is
    /// itself excluded like any other lower bound.
    pub async fn commit_log(&self, from: Option<&str>, to: &str) -> Result<Vec<RawCommit>, GitError> {
        let from = match from {
            Some(from) if !from.is_empty() => from.to_string(),
            _ => self.root_commit(to).await?,
        };
        let range = format!("{}..{}", from, to);
        let out = self.run(&["log", LOG_FORMAT, &range, "--"]).await?;
        parse_log_output(&out)
    }
}

/// Parse the output produced by [`LOG_FORMAT`].
pub fn parse_log_output(output: &str) -> Result<Vec<RawCommit>, GitError> {
    let mut commits = Vec::new();

    for record in output.split(RECORD_SEP) {
        let record = record.trim_start_matches(['\n', '\r']);
        if record.trim().is_empty() {
            continue;
        }

        let mut fields = record.splitn(4, FIELD_SEP);
        let (Some(hash), Some(message), Some(decorations), Some(date)) =
            (fields.next(), fields.next(), fields.next(), fields.next())
        else {
            return Err(GitError::MalformedLog(record.to_string()));
        };

        let committer_date = DateTime::parse_from_rfc3339(date.trim())
            .map_err(|e| GitError::MalformedLog(format!("bad date '{}': {}", date.trim(), e)))?;

        commits.push(RawCommit {
            hash: hash.trim().to_string(),
            message: message.trim().to_string(),
            git_tags: decorations.trim().to_string(),
            committer_date,
        });
    }

    Ok(commits)
}
