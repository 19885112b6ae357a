//! Commit convention presets: how messages are parsed and how parsed
//! commits are grouped into release notes.

use std::sync::LazyLock;

use regex_lite::Regex;

static HEADER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<type>\w*)(?:\((?P<scope>.*)\))?(?P<breaking>!)?: (?P<subject>.*)$")
        .expect("static pattern")
});

static REVERT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)^(?:Revert|revert:)\s"?(?P<header>.+?)"?\s*This reverts commit (?P<hash>\w+)\."#,
    )
    .expect("static pattern")
});

static REFERENCE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:\b(?P<action>close[sd]?|fix(?:e[sd])?|resolve[sd]?)\s+)?(?:(?P<owner>[\w.-]+)/(?P<repo>[\w.-]+))?#(?P<issue>\d+)",
    )
    .expect("static pattern")
});

/// Grammar applied to raw commit messages.
#[derive(Debug, Clone)]
pub struct ParserOptions {
    /// Header grammar with `type`, `scope`, `breaking` and `subject` groups.
    pub header_pattern: Regex,
    /// Footer tokens that open a note, e.g. `BREAKING CHANGE`.
    pub note_keywords: Vec<String>,
    /// Revert grammar with `header` and `hash` groups.
    pub revert_pattern: Regex,
    /// Issue reference grammar with `action`, `owner`, `repo` and `issue`
    /// groups, e.g. `closes owner/repo#12`.
    pub reference_pattern: Regex,
}

/// One conventional type and the notes section it lands in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSection {
    pub commit_type: String,
    pub title: String,
    /// Hidden types only appear when the commit carries breaking notes.
    pub hidden: bool,
}

impl TypeSection {
    fn new(commit_type: &str, title: &str, hidden: bool) -> Self {
        Self {
            commit_type: commit_type.to_string(),
            title: title.to_string(),
            hidden,
        }
    }
}

/// Layout of rendered notes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriterOptions {
    /// Sections in render priority order.
    pub sections: Vec<TypeSection>,
    pub breaking_title: String,
    pub revert_title: String,
    pub hash_length: usize,
}

impl WriterOptions {
    pub fn section_for(&self, commit_type: &str) -> Option<(usize, &TypeSection)> {
        self.sections
            .iter()
            .enumerate()
            .find(|(_, s)| s.commit_type.eq_ignore_ascii_case(commit_type))
    }

    /// Priority of the revert section, for reverts that have no `revert` type.
    pub fn revert_order(&self) -> usize {
        self.section_for("revert")
            .map(|(i, _)| i)
            .unwrap_or(self.sections.len())
    }
}

/// Parser and writer options that travel together.
#[derive(Debug, Clone)]
pub struct Convention {
    pub parser: ParserOptions,
    pub writer: WriterOptions,
}

impl Convention {
    /// The Angular commit convention.
    pub fn angular() -> Self {
        let parser = ParserOptions {
            header_pattern: HEADER_PATTERN.clone(),
            note_keywords: vec!["BREAKING CHANGE".to_string(), "BREAKING-CHANGE".to_string()],
            revert_pattern: REVERT_PATTERN.clone(),
            reference_pattern: REFERENCE_PATTERN.clone(),
        };

        let writer = WriterOptions {
            sections: vec![
                TypeSection::new("feat", "Features", false),
                TypeSection::new("fix", "Bug Fixes", false),
                TypeSection::new("perf", "Performance Improvements", false),
                TypeSection::new("revert", "Reverts", false),
                TypeSection::new("docs", "Documentation", true),
                TypeSection::new("style", "Styles", true),
                TypeSection::new("refactor", "Code Refactoring", true),
                TypeSection::new("test", "Tests", true),
                TypeSection::new("build", "Build System", true),
                TypeSection::new("ci", "Continuous Integration", true),
                TypeSection::new("chore", "Chores", true),
            ],
            breaking_title: "BREAKING CHANGES".to_string(),
            revert_title: "Reverts".to_string(),
            hash_length: 7,
        };

        Self { parser, writer }
    }
}

impl Default for Convention {
    fn default() -> Self {
        Self::angular()
    }
}
