//! Remote repository URL parsing.

pub mod parse;

pub use parse::{HostParts, RemoteUrl, RepoIdentity, extract_host_parts, parse_remote_url};
