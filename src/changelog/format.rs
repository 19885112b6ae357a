//! Release notes model: parsed commits grouped into titled sections.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex_lite::{Captures, Regex};
use serde::Serialize;

use crate::commit::parser::find_mentions;
use crate::commit::{ParsedCommit, Reference};
use crate::convention::WriterOptions;
use crate::remote::RepoIdentity;

static ISSUE_IN_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(^|[\s(\[,])#(\d+)\b").expect("static pattern")
});

/// URL builder for one hosted repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoLinks {
    /// Browsable host, e.g. `https://github.com`.
    pub base: String,
    pub owner: String,
    pub repo: String,
}

impl RepoLinks {
    /// Links for `identity` on `base`, or `None` if either is unknown.
    pub fn new(base: Option<String>, identity: &RepoIdentity) -> Option<Self> {
        let base = base?;
        if identity.is_empty() {
            return None;
        }
        Some(Self {
            base: base.trim_end_matches('/').to_string(),
            owner: identity.owner.clone(),
            repo: identity.repo.clone(),
        })
    }

    pub fn repo_url(&self) -> String {
        format!("{}/{}/{}", self.base, self.owner, self.repo)
    }

    pub fn commit_url(&self, hash: &str) -> String {
        format!("{}/commit/{}", self.repo_url(), hash)
    }

    pub fn compare_url(&self, from: &str, to: &str) -> String {
        format!("{}/compare/{}...{}", self.repo_url(), from, to)
    }

    pub fn user_url(&self, login: &str) -> String {
        format!("{}/{}", self.base, login)
    }

    pub fn issue_url(&self, issue: &str) -> String {
        format!("{}/issues/{}", self.repo_url(), issue)
    }

    pub fn reference_url(&self, reference: &Reference) -> String {
        match (&reference.owner, &reference.repository) {
            (Some(owner), Some(repo)) => {
                format!("{}/{}/{}/issues/{}", self.base, owner, repo, reference.issue)
            }
            _ => self.issue_url(&reference.issue),
        }
    }
}

/// A commit as it appears in the notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedEntry {
    pub scope: Option<String>,
    /// Subject with issues and mentions already linked.
    pub subject: String,
    pub hash: String,
    pub short_hash: String,
    pub commit_url: Option<String>,
    /// Actionable references not already named in the subject.
    pub references: Vec<RenderedReference>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedReference {
    pub action: String,
    pub label: String,
    pub url: Option<String>,
}

/// A breaking-change note as it appears in the notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteEntry {
    pub scope: Option<String>,
    pub text: String,
}

/// A titled section of entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryGroup {
    pub title: String,
    pub order: usize,
    pub entries: Vec<RenderedEntry>,
}

/// Structured release notes, ready to be written out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReleaseNotes {
    pub breaking: Vec<NoteEntry>,
    /// Groups in render order.
    pub groups: Vec<EntryGroup>,
}

impl ReleaseNotes {
    /// Group commits per the writer options.
    ///
    /// Hidden types and unknown types are dropped unless the commit carries
    /// breaking notes. Within a group, entries are sorted by scope and then
    /// subject.
    pub fn build(
        commits: &[ParsedCommit],
        writer: &WriterOptions,
        links: Option<&RepoLinks>,
    ) -> Self {
        let mut grouped: BTreeMap<(usize, String), Vec<RenderedEntry>> = BTreeMap::new();
        let mut breaking = Vec::new();

        for commit in commits {
            for note in &commit.notes {
                breaking.push(NoteEntry {
                    scope: commit.scope.clone(),
                    text: note.text.clone(),
                });
            }

            if let Some(key) = classify(commit, writer) {
                grouped
                    .entry(key)
                    .or_default()
                    .push(render_entry(commit, writer, links));
            }
        }

        let groups = grouped
            .into_iter()
            .map(|((order, title), mut entries)| {
                entries.sort_by(|a, b| {
                    a.scope
                        .as_deref()
                        .unwrap_or("")
                        .cmp(b.scope.as_deref().unwrap_or(""))
                        .then_with(|| a.subject.cmp(&b.subject))
                });
                EntryGroup {
                    title,
                    order,
                    entries,
                }
            })
            .collect();

        Self { breaking, groups }
    }

    pub fn is_empty(&self) -> bool {
        self.breaking.is_empty() && self.groups.is_empty()
    }

    /// Entry counts per group for summary output.
    pub fn count_by_group(&self) -> Vec<(String, usize)> {
        self.groups
            .iter()
            .map(|g| (g.title.clone(), g.entries.len()))
            .filter(|(_, count)| *count > 0)
            .collect()
    }
}

fn classify(commit: &ParsedCommit, writer: &WriterOptions) -> Option<(usize, String)> {
    let commit_type = commit.commit_type.as_deref();

    if commit.revert.is_some() || commit_type.is_some_and(|t| t.eq_ignore_ascii_case("revert")) {
        let title = writer
            .section_for("revert")
            .map(|(_, s)| s.title.clone())
            .unwrap_or_else(|| writer.revert_title.clone());
        return Some((writer.revert_order(), title));
    }

    let commit_type = commit_type?;
    match writer.section_for(commit_type) {
        Some((order, section)) if !section.hidden || commit.is_breaking() => {
            Some((order, section.title.clone()))
        }
        Some(_) => None,
        None if commit.is_breaking() => Some((writer.sections.len(), commit_type.to_string())),
        None => None,
    }
}

fn render_entry(
    commit: &ParsedCommit,
    writer: &WriterOptions,
    links: Option<&RepoLinks>,
) -> RenderedEntry {
    let hash = commit.raw.hash.clone();
    let short_hash = hash.chars().take(writer.hash_length).collect();
    let plain_subject = commit.subject.clone().unwrap_or_else(|| commit.header.clone());

    let references = commit
        .references
        .iter()
        .filter(|r| !plain_subject.contains(&r.raw))
        .filter_map(|r| {
            let action = r.action.clone()?;
            Some(RenderedReference {
                action,
                label: r.raw.clone(),
                url: links.map(|l| l.reference_url(r)),
            })
        })
        .collect();

    let subject = match links {
        Some(links) => link_subject(&plain_subject, links),
        None => plain_subject,
    };

    RenderedEntry {
        scope: commit.scope.clone().filter(|s| s != "*"),
        subject,
        commit_url: links.map(|l| l.commit_url(&hash)),
        hash,
        short_hash,
        references,
    }
}

/// Link `@mentions` and `#issues` inside a subject line.
pub fn link_subject(subject: &str, links: &RepoLinks) -> String {
    let mut with_mentions = String::with_capacity(subject.len());
    let mut cursor = 0;
    for (at, name) in find_mentions(subject) {
        with_mentions.push_str(&subject[cursor..at]);
        with_mentions.push_str(&format!("[@{}]({})", name, links.user_url(name)));
        cursor = at + 1 + name.len();
    }
    with_mentions.push_str(&subject[cursor..]);

    ISSUE_IN_TEXT
        .replace_all(&with_mentions, |caps: &Captures| {
            format!("{}[#{}]({})", &caps[1], &caps[2], links.issue_url(&caps[2]))
        })
        .into_owned()
}
