//! Conventional commit parsing and filtering.

pub mod filter;
pub mod parser;

pub use filter::filter_commits;
pub use parser::{Note, ParsedCommit, Reference, Revert, parse_commit, parse_commits};
