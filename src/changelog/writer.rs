//! Render release notes as Markdown.

use chrono::Utc;

use crate::commit::ParsedCommit;
use crate::convention::WriterOptions;
use crate::git::get_version_from_tag;

use super::format::{EntryGroup, NoteEntry, ReleaseNotes, RenderedEntry, RepoLinks};

/// Version and link metadata for one rendering.
#[derive(Debug, Clone, Default)]
pub struct NotesContext {
    pub version: String,
    pub previous_tag: Option<String>,
    pub current_tag: Option<String>,
    /// `YYYY-MM-DD`
    pub date: String,
    pub links: Option<RepoLinks>,
}

impl NotesContext {
    /// Context dated today.
    pub fn today(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            date: Utc::now().format("%Y-%m-%d").to_string(),
            ..Self::default()
        }
    }

    /// The compare range, when both ends are known and differ.
    pub fn compare_range(&self) -> Option<(&str, &str)> {
        let previous = self.previous_tag.as_deref().filter(|t| !t.is_empty())?;
        let current = self.current_tag.as_deref().filter(|t| !t.is_empty())?;
        (previous != current).then_some((previous, current))
    }
}

/// Render commits into Markdown release notes.
pub fn render_notes(commits: &[ParsedCommit], writer: &WriterOptions, ctx: &NotesContext) -> String {
    let notes = ReleaseNotes::build(commits, writer, ctx.links.as_ref());
    render_release_notes(&notes, writer, ctx)
}

/// Render already-grouped notes.
pub fn render_release_notes(notes: &ReleaseNotes, writer: &WriterOptions, ctx: &NotesContext) -> String {
    let mut out = render_header(ctx);
    out.push('\n');

    if !notes.breaking.is_empty() {
        out.push_str(&format!("\n### {}\n\n", writer.breaking_title));
        for note in &notes.breaking {
            out.push_str(&format_note(note));
        }
    }

    for group in &notes.groups {
        out.push_str(&format_group(group));
    }

    out
}

fn render_header(ctx: &NotesContext) -> String {
    let level = heading_level(&ctx.version);
    match ctx.compare_range() {
        Some((previous, current)) => {
            let url = match &ctx.links {
                Some(links) => links.compare_url(previous, current),
                None => format!("compare/{}...{}", previous, current),
            };
            format!("{} [{}]({}) ({})\n", level, ctx.version, url, ctx.date)
        }
        None => format!("{} {} ({})\n", level, ctx.version, ctx.date),
    }
}

/// `##` for patch releases, `#` for everything else.
fn heading_level(version: &str) -> &'static str {
    match get_version_from_tag(version) {
        Some(v) if v.patch != 0 => "##",
        _ => "#",
    }
}

fn format_group(group: &EntryGroup) -> String {
    let mut section = format!("\n### {}\n\n", group.title);
    for entry in &group.entries {
        section.push_str(&format_entry(entry));
    }
    section
}

fn format_entry(entry: &RenderedEntry) -> String {
    let mut line = String::from("* ");
    if let Some(scope) = &entry.scope {
        line.push_str(&format!("**{}:** ", scope));
    }
    line.push_str(&entry.subject);

    match &entry.commit_url {
        Some(url) => line.push_str(&format!(" ([{}]({}))", entry.short_hash, url)),
        None => line.push_str(&format!(" ({})", entry.short_hash)),
    }

    for reference in &entry.references {
        let label = match &reference.url {
            Some(url) => format!("[{}]({})", reference.label, url),
            None => reference.label.clone(),
        };
        line.push_str(&format!(", {} {}", reference.action, label));
    }

    line.push('\n');
    line
}

fn format_note(note: &NoteEntry) -> String {
    let text = note.text.replace('\n', "\n  ");
    match &note.scope {
        Some(scope) if scope != "*" => format!("* **{}:** {}\n", scope, text),
        _ => format!("* {}\n", text),
    }
}

/// One-line summary of rendered notes for status output.
pub fn generate_summary(notes: &ReleaseNotes) -> String {
    let total: usize = notes.groups.iter().map(|g| g.entries.len()).sum();
    let counts = notes.count_by_group();

    if notes.is_empty() {
        return "No notable changes.".to_string();
    }

    let mut details: Vec<String> = counts
        .iter()
        .map(|(title, count)| format!("{}: {}", title, count))
        .collect();
    if !notes.breaking.is_empty() {
        details.insert(0, format!("Breaking: {}", notes.breaking.len()));
    }

    let entry_word = if total == 1 { "entry" } else { "entries" };

    format!("{} {} ({})", total, entry_word, details.join(", "))
}
