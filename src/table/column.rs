use std::borrow::Borrow;
use std::fmt;

use crate::error::{Error, Result};

pub const GITHUB_ORG: &str = "GitHub Org";
pub const REPO: &str = "Repo";
pub const IS_FORK: &str = "Is Fork";
pub const HIDDEN: &str = "Hidden";
pub const PINNED: &str = "Pinned";
pub const RESUME_WORTHY: &str = "Resume Worthy";
pub const LOCAL: &str = "Local";
pub const STARS: &str = "Stars";
pub const HOMEPAGE: &str = "Homepage";
pub const SOCIAL_PREVIEW_URL: &str = "Social Preview URL";
pub const LAST_UPDATED: &str = "Last Updated";
pub const README_PATH: &str = "README Path";

/// A column header that is guaranteed to contain something other than
/// whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColumnName(String);

impl ColumnName {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::InvalidColumnName(name));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ColumnName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ColumnName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ColumnName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for ColumnName {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<String> for ColumnName {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}
