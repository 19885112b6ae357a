//! Revert and duplicate filtering.

use std::collections::HashSet;

use tracing::debug;

use super::parser::{ParsedCommit, Revert};

/// Shortest hash prefix accepted when matching a revert to its target.
const MIN_HASH_PREFIX: usize = 7;

/// Remove duplicate commits and revert/reverted pairs.
///
/// Expects commits newest first, as `git log` lists them, so a revert of a
/// revert cancels the revert and leaves the original commit in place. A
/// revert whose target is outside the list is kept. Retained commits keep
/// their relative order.
pub fn filter_commits(commits: Vec<ParsedCommit>) -> Vec<ParsedCommit> {
    let mut seen = HashSet::new();
    let commits: Vec<ParsedCommit> = commits
        .into_iter()
        .filter(|c| seen.insert(c.raw.hash.clone()))
        .collect();

    let mut cancelled = vec![false; commits.len()];

    for i in 0..commits.len() {
        if cancelled[i] {
            continue;
        }
        let Some(revert) = &commits[i].revert else {
            continue;
        };

        let target = commits
            .iter()
            .enumerate()
            .find(|(j, c)| *j != i && !cancelled[*j] && reverts(revert, c));

        if let Some((j, target)) = target {
            debug!(
                revert = %commits[i].raw.hash,
                reverted = %target.raw.hash,
                "Dropping reverted commit pair"
            );
            cancelled[i] = true;
            cancelled[j] = true;
        }
    }

    commits
        .into_iter()
        .zip(cancelled)
        .filter_map(|(c, dropped)| (!dropped).then_some(c))
        .collect()
}

fn reverts(revert: &Revert, commit: &ParsedCommit) -> bool {
    if revert.hash.is_empty() {
        return !revert.header.is_empty() && revert.header == commit.header;
    }
    hash_matches(&revert.hash, &commit.raw.hash)
}

fn hash_matches(a: &str, b: &str) -> bool {
    let len = a.len().min(b.len());
    len >= MIN_HASH_PREFIX && a[..len].eq_ignore_ascii_case(&b[..len])
}
