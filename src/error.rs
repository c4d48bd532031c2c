use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Invalid column name: {0:?}")]
    InvalidColumnName(String),

    #[error("Invalid repository key: {0:?} (expected org/repo)")]
    InvalidRowKey(String),

    #[error("Repository not found: {0}")]
    RepoNotFound(String),

    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    #[error("GitHub CLI not authenticated: {0}")]
    NotAuthenticated(String),

    #[error("Timed out after {0} seconds")]
    Timeout(u64),

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Maps a request failure, reporting an elapsed deadline as a timeout.
    pub fn from_request(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            Error::Timeout(timeout.as_secs())
        } else {
            Error::Network(err)
        }
    }

    /// Failures that a batch run records against one project and moves past.
    pub fn is_item_failure(&self) -> bool {
        matches!(
            self,
            Error::GitHubApi(_)
                | Error::NotAuthenticated(_)
                | Error::Timeout(_)
                | Error::ParseError(_)
                | Error::RepoNotFound(_)
                | Error::Network(_)
                | Error::Serialization(_)
                | Error::Image(_)
                | Error::Url(_)
        )
    }
}
