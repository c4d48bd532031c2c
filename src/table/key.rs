use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// The (organization, repository) pair that identifies a project row.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RowKey {
    org: String,
    repo: String,
}

impl RowKey {
    pub fn new(org: impl Into<String>, repo: impl Into<String>) -> Result<Self> {
        let org = org.into().trim().to_string();
        let repo = repo.into().trim().to_string();
        if org.is_empty() || repo.is_empty() {
            return Err(Error::InvalidRowKey(format!("{}/{}", org, repo)));
        }
        Ok(Self { org, repo })
    }

    pub fn org(&self) -> &str {
        &self.org
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// Case-insensitive comparison against a stored (org, repo) pair.
    pub fn matches(&self, org: &str, repo: &str) -> bool {
        fold(&self.org) == fold(org) && fold(&self.repo) == fold(repo)
    }
}

/// Trimmed, lower-cased form used by every key comparison.
fn fold(s: &str) -> String {
    s.trim().to_lowercase()
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.org, self.repo)
    }
}

impl FromStr for RowKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.split_once('/') {
            Some((org, repo)) if !repo.contains('/') => RowKey::new(org, repo),
            _ => Err(Error::InvalidRowKey(s.to_string())),
        }
    }
}

/// A `--repo` argument: either a bare repository name or `org/repo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoFilter {
    needle: String,
}

impl RepoFilter {
    pub fn new(filter: &str) -> Self {
        Self {
            needle: fold(filter),
        }
    }

    pub fn matches(&self, org: &str, repo: &str) -> bool {
        let repo = fold(repo);
        let composite = format!("{}/{}", fold(org), repo);
        self.needle == repo || self.needle == composite
    }
}

impl fmt::Display for RepoFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.needle)
    }
}
