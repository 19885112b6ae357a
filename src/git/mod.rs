//! Git operations via the system `git` binary.

pub mod cli;
pub mod log;
pub mod tags;

pub use cli::{GitCli, check_git_installed};
pub use log::{RawCommit, parse_log_output};
pub use tags::{get_version_from_tag, select_version_tag};
