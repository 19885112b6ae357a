//! Conventional commit parsing.

use serde::Serialize;

use crate::convention::ParserOptions;
use crate::git::RawCommit;

/// A footer note such as `BREAKING CHANGE: ...`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Note {
    pub title: String,
    pub text: String,
}

/// An issue reference found in the message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reference {
    /// Lowercased action verb (`closes`, `fixes`, ...), if any.
    pub action: Option<String>,
    /// Set for cross-repository references (`owner/repo#12`).
    pub owner: Option<String>,
    pub repository: Option<String>,
    pub issue: String,
    /// Text as written, e.g. `#12` or `owner/repo#12`.
    pub raw: String,
}

/// What a revert commit cancels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Revert {
    pub header: String,
    pub hash: String,
}

/// A commit with its message broken down by the commit convention.
///
/// Every parsed field is optional: a message that does not follow the
/// convention still yields a record, just with empty fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedCommit {
    pub raw: RawCommit,
    pub header: String,
    pub commit_type: Option<String>,
    pub scope: Option<String>,
    pub subject: Option<String>,
    pub body: Option<String>,
    pub footer: Option<String>,
    pub notes: Vec<Note>,
    pub references: Vec<Reference>,
    pub mentions: Vec<String>,
    pub revert: Option<Revert>,
}

impl ParsedCommit {
    pub fn hash(&self) -> &str {
        &self.raw.hash
    }

    /// Texts of all breaking-change notes.
    pub fn breaking_changes(&self) -> Vec<&str> {
        self.notes.iter().map(|n| n.text.as_str()).collect()
    }

    pub fn is_breaking(&self) -> bool {
        !self.notes.is_empty()
    }
}

/// Parse one raw commit against `options`.
pub fn parse_commit(raw: &RawCommit, options: &ParserOptions) -> ParsedCommit {
    let message = raw.message.trim();
    let mut lines = message.lines();
    let header = lines.next().unwrap_or("").trim().to_string();

    let (commit_type, scope, subject, breaking_mark) =
        match options.header_pattern.captures(&header) {
            Some(caps) => (
                caps.name("type")
                    .map(|m| m.as_str().to_string())
                    .filter(|t| !t.is_empty()),
                caps.name("scope")
                    .map(|m| m.as_str().to_string())
                    .filter(|s| !s.is_empty()),
                caps.name("subject").map(|m| m.as_str().trim().to_string()),
                caps.name("breaking").is_some(),
            ),
            None => (None, None, None, false),
        };

    // Body runs until the first note keyword; everything after is footer.
    let mut body_lines = Vec::new();
    let mut footer_lines = Vec::new();
    let mut notes: Vec<Note> = Vec::new();

    for line in lines {
        if let Some((title, text)) = match_note(line, &options.note_keywords) {
            notes.push(Note {
                title,
                text: text.to_string(),
            });
            footer_lines.push(line);
        } else if let Some(note) = notes.last_mut() {
            if note.text.is_empty() {
                note.text = line.trim().to_string();
            } else {
                note.text.push('\n');
                note.text.push_str(line);
            }
            footer_lines.push(line);
        } else {
            body_lines.push(line);
        }
    }

    for note in &mut notes {
        note.text = note.text.trim().to_string();
    }

    if breaking_mark && notes.is_empty() {
        notes.push(Note {
            title: options
                .note_keywords
                .first()
                .cloned()
                .unwrap_or_else(|| "BREAKING CHANGE".to_string()),
            text: subject.clone().unwrap_or_default(),
        });
    }

    let revert = options.revert_pattern.captures(message).map(|caps| Revert {
        header: caps
            .name("header")
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default(),
        hash: caps
            .name("hash")
            .map(|m| m.as_str().to_string())
            .unwrap_or_default(),
    });

    ParsedCommit {
        raw: raw.clone(),
        header,
        commit_type,
        scope,
        subject,
        body: join_nonempty(&body_lines),
        footer: join_nonempty(&footer_lines),
        notes,
        references: extract_references(message, options),
        mentions: extract_mentions(message),
        revert,
    }
}

/// Drop blank messages, then parse the rest in order.
pub fn parse_commits(raws: &[RawCommit], options: &ParserOptions) -> Vec<ParsedCommit> {
    raws.iter()
        .filter(|c| !c.message.trim().is_empty())
        .map(|c| parse_commit(c, options))
        .collect()
}

fn match_note(line: &str, keywords: &[String]) -> Option<(String, String)> {
    keywords.iter().find_map(|keyword| {
        let rest = line.strip_prefix(keyword.as_str())?;
        let text = rest.strip_prefix(':').or_else(|| rest.strip_prefix(' '))?;
        Some((keyword.clone(), text.trim().to_string()))
    })
}

fn join_nonempty(lines: &[&str]) -> Option<String> {
    let joined = lines.join("\n");
    let trimmed = joined.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn extract_references(message: &str, options: &ParserOptions) -> Vec<Reference> {
    let mut refs: Vec<Reference> = Vec::new();

    for caps in options.reference_pattern.captures_iter(message) {
        let Some(issue) = caps.name("issue").map(|m| m.as_str().to_string()) else {
            continue;
        };
        let owner = caps.name("owner").map(|m| m.as_str().to_string());
        let repository = caps.name("repo").map(|m| m.as_str().to_string());
        let action = caps.name("action").map(|m| m.as_str().to_lowercase());

        let raw = match (&owner, &repository) {
            (Some(o), Some(r)) => format!("{}/{}#{}", o, r, issue),
            _ => format!("#{}", issue),
        };

        match refs.iter_mut().find(|r| r.raw == raw) {
            // Same issue mentioned twice: keep the first, upgrade its action.
            Some(existing) => {
                if existing.action.is_none() {
                    existing.action = action;
                }
            }
            None => refs.push(Reference {
                action,
                owner,
                repository,
                issue,
                raw,
            }),
        }
    }

    refs
}

fn extract_mentions(message: &str) -> Vec<String> {
    let mut mentions: Vec<String> = Vec::new();
    for (_, name) in find_mentions(message) {
        if !mentions.iter().any(|m| m == name) {
            mentions.push(name.to_string());
        }
    }
    mentions
}

/// Positions and names of `@user` mentions, skipping e-mail addresses.
pub(crate) fn find_mentions(text: &str) -> Vec<(usize, &str)> {
    let mut found = Vec::new();
    let bytes = text.as_bytes();

    for (i, _) in text.match_indices('@') {
        let preceded_by_word = i > 0 && {
            let prev = bytes[i - 1];
            prev.is_ascii_alphanumeric() || prev == b'_' || prev == b'.'
        };
        if preceded_by_word {
            continue;
        }
        let rest = &text[i + 1..];
        let len = rest
            .bytes()
            .take_while(|b| b.is_ascii_alphanumeric() || *b == b'-')
            .count()
            .min(39);
        let name = rest[..len].trim_end_matches('-');
        if !name.is_empty() && !name.starts_with('-') {
            found.push((i, name));
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convention::Convention;
    use chrono::DateTime;

    fn raw(hash: &str, message: &str) -> RawCommit {
        RawCommit {
            hash: hash.to_string(),
            message: message.to_string(),
            git_tags: String::new(),
            committer_date: DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z").unwrap(),
        }
    }

    fn parse(message: &str) -> ParsedCommit {
        parse_commit(&raw("abc1234def", message), &Convention::angular().parser)
    }

    #[test]
    fn test_parse_feat_commit() {
        let c = parse("feat: add new feature");
        assert_eq!(c.commit_type.as_deref(), Some("feat"));
        assert_eq!(c.scope, None);
        assert_eq!(c.subject.as_deref(), Some("add new feature"));
        assert!(!c.is_breaking());
    }

    #[test]
    fn test_parse_fix_with_scope() {
        let c = parse("fix(auth): resolve login bug");
        assert_eq!(c.commit_type.as_deref(), Some("fix"));
        assert_eq!(c.scope.as_deref(), Some("auth"));
        assert_eq!(c.subject.as_deref(), Some("resolve login bug"));
    }

    #[test]
    fn test_parse_breaking_with_exclamation() {
        let c = parse("feat(api)!: drop legacy endpoints");
        assert_eq!(c.commit_type.as_deref(), Some("feat"));
        assert_eq!(c.breaking_changes(), vec!["drop legacy endpoints"]);
    }

    #[test]
    fn test_parse_breaking_in_footer() {
        let c = parse("feat: add feature\n\nSome body text.\n\nBREAKING CHANGE: config moved\nto a new file");
        assert_eq!(c.body.as_deref(), Some("Some body text."));
        assert_eq!(c.notes.len(), 1);
        assert_eq!(c.notes[0].title, "BREAKING CHANGE");
        assert_eq!(c.notes[0].text, "config moved\nto a new file");
        assert!(c.footer.as_deref().unwrap().starts_with("BREAKING CHANGE:"));
    }

    #[test]
    fn test_parse_breaking_hyphen_keyword() {
        let c = parse("fix: x\n\nBREAKING-CHANGE: y");
        assert_eq!(c.notes[0].title, "BREAKING-CHANGE");
        assert_eq!(c.notes[0].text, "y");
    }

    #[test]
    fn test_footer_note_wins_over_exclamation() {
        let c = parse("feat!: short\n\nBREAKING CHANGE: detailed explanation");
        assert_eq!(c.breaking_changes(), vec!["detailed explanation"]);
    }

    #[test]
    fn test_parse_non_conventional() {
        let c = parse("just a normal commit message");
        assert_eq!(c.header, "just a normal commit message");
        assert_eq!(c.commit_type, None);
        assert_eq!(c.scope, None);
        assert_eq!(c.subject, None);
        assert!(!c.is_breaking());
    }

    #[test]
    fn test_parse_revert() {
        let c = parse("Revert \"feat: add thing\"\n\nThis reverts commit 0123456789abcdef.");
        let revert = c.revert.expect("revert");
        assert_eq!(revert.header, "feat: add thing");
        assert_eq!(revert.hash, "0123456789abcdef");
    }

    #[test]
    fn test_parse_revert_type_prefix() {
        let c = parse("revert: feat: add thing\n\nThis reverts commit abcdef1.");
        assert_eq!(c.commit_type.as_deref(), Some("revert"));
        assert_eq!(c.revert.unwrap().hash, "abcdef1");
    }

    #[test]
    fn test_parse_references() {
        let c = parse("fix(ui): align buttons (#7)\n\nCloses #12, fixes other/repo#3");
        let raws: Vec<&str> = c.references.iter().map(|r| r.raw.as_str()).collect();
        assert_eq!(raws, vec!["#7", "#12", "other/repo#3"]);
        assert_eq!(c.references[0].action, None);
        assert_eq!(c.references[1].action.as_deref(), Some("closes"));
        assert_eq!(c.references[2].owner.as_deref(), Some("other"));
        assert_eq!(c.references[2].action.as_deref(), Some("fixes"));
    }

    #[test]
    fn test_parse_mentions_skip_emails() {
        let c = parse("feat: thanks @octocat\n\nReported-by: dev@example.com, @other-user");
        assert_eq!(c.mentions, vec!["octocat", "other-user"]);
    }

    #[test]
    fn test_parse_commits_drops_blank_messages() {
        let raws = vec![raw("a", "feat: one"), raw("b", "   \n "), raw("c", "fix: two")];
        let parsed = parse_commits(&raws, &Convention::angular().parser);
        let hashes: Vec<&str> = parsed.iter().map(|c| c.hash()).collect();
        assert_eq!(hashes, vec!["a", "c"]);
    }
}
