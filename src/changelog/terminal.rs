//! ANSI rendering of Markdown notes for console display.
//!
//! Only the printed copy is styled; the notes sent to the release API stay
//! plain Markdown.

use std::sync::LazyLock;

use console::style;
use regex_lite::{Captures, Regex};

static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)\s]+)\)").expect("static pattern"));
static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*([^*]+)\*\*").expect("static pattern"));

/// Style Markdown notes for a terminal.
pub fn render_terminal(markdown: &str) -> String {
    let mut out = String::with_capacity(markdown.len());

    for line in markdown.lines() {
        let styled = if let Some(title) = line.strip_prefix("### ") {
            style(inline(title)).green().bold().to_string()
        } else if let Some(title) = line.strip_prefix("## ") {
            style(inline(title)).magenta().bold().underlined().to_string()
        } else if let Some(title) = line.strip_prefix("# ") {
            style(inline(title)).magenta().bold().underlined().to_string()
        } else if let Some(item) = line.strip_prefix("* ") {
            format!("  • {}", inline(item))
        } else {
            inline(line)
        };
        out.push_str(&styled);
        out.push('\n');
    }

    out
}

// Links go first: the escape codes emitted for bold text contain `[`.
fn inline(text: &str) -> String {
    let text = LINK.replace_all(text, |caps: &Captures| {
        format!("{} ({})", style(&caps[1]).cyan(), style(&caps[2]).dim())
    });
    BOLD.replace_all(&text, |caps: &Captures| style(&caps[1]).bold().to_string())
        .into_owned()
}
