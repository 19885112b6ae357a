//! Run configuration built once at process start.

use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::path::PathBuf;

/// Environment variable carrying a CI-supplied release tag.
pub const CI_TAG_VAR: &str = "CIRCLE_TAG";

/// Environment variable naming a GitHub Enterprise API base URL.
pub const API_URL_VAR: &str = "GITHUB_API_URL";

/// Immutable copy of the process environment.
///
/// Captured once in `main` and handed to every component that needs it, so
/// nothing downstream reads `std::env` on its own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSnapshot {
    vars: BTreeMap<String, String>,
    /// Pairs that are not valid UTF-8. Never looked up, only handed on to
    /// subprocesses.
    opaque: BTreeMap<OsString, OsString>,
}

impl EnvSnapshot {
    /// Capture the current process environment.
    pub fn capture() -> Self {
        let mut snapshot = Self::default();
        for (name, value) in std::env::vars_os() {
            match (name.into_string(), value.into_string()) {
                (Ok(name), Ok(value)) => {
                    snapshot.vars.insert(name, value);
                }
                (name, value) => {
                    let name = name.map_or_else(|n| n, OsString::from);
                    let value = value.map_or_else(|v| v, OsString::from);
                    snapshot.opaque.insert(name, value);
                }
            }
        }
        snapshot
    }

    /// Build a snapshot from explicit pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            opaque: BTreeMap::new(),
        }
    }

    /// Look up a variable, treating empty values as absent.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Return the value of the first of `names` that is set.
    pub fn first_of(&self, names: &[&str]) -> Option<&str> {
        names.iter().find_map(|name| self.get(name))
    }

    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.opaque.remove(OsStr::new(&name));
        self.vars.insert(name, value.into());
        self
    }

    pub fn without(mut self, name: &str) -> Self {
        self.vars.remove(name);
        self.opaque.remove(OsStr::new(name));
        self
    }

    /// Every captured variable, including non-UTF-8 ones, as a subprocess
    /// environment.
    pub fn process_env(&self) -> impl Iterator<Item = (&OsStr, &OsStr)> {
        self.vars
            .iter()
            .map(|(k, v)| (OsStr::new(k), OsStr::new(v)))
            .chain(self.opaque.iter().map(|(k, v)| (k.as_os_str(), v.as_os_str())))
    }

    /// The CI-provided tag override, if any.
    pub fn ci_tag(&self) -> Option<&str> {
        self.get(CI_TAG_VAR)
    }
}

/// User-facing knobs for a release run, derived from CLI flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseSettings {
    pub remote: String,
    pub production_tag: String,
    pub tag_prefix: String,
    pub release_name: String,
    pub api_url: Option<String>,
    pub dry_run: bool,
}

impl Default for ReleaseSettings {
    fn default() -> Self {
        Self {
            remote: "origin".to_string(),
            production_tag: "Production".to_string(),
            tag_prefix: "v".to_string(),
            release_name: "Production".to_string(),
            api_url: None,
            dry_run: false,
        }
    }
}

/// Everything a release run needs to know about where and how it runs.
#[derive(Debug, Clone)]
pub struct ReleaseContext {
    pub cwd: PathBuf,
    pub env: EnvSnapshot,
    pub settings: ReleaseSettings,
}

impl ReleaseContext {
    pub fn new(cwd: impl Into<PathBuf>, env: EnvSnapshot, settings: ReleaseSettings) -> Self {
        Self {
            cwd: cwd.into(),
            env,
            settings,
        }
    }

    /// API base URL: the CLI flag wins over the environment.
    pub fn api_url(&self) -> Option<&str> {
        self.settings
            .api_url
            .as_deref()
            .or_else(|| self.env.get(API_URL_VAR))
    }
}
