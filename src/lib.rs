pub mod config;
pub mod error;
pub mod table;
pub mod models;
pub mod github;
pub mod scrape;
pub mod images;
pub mod sync;
pub mod edits;

pub use config::Config;
pub use error::{Error, Result};
pub use github::{GhCli, GitHubClient, GitHubMetadataSource, RepoMetadataSource};
pub use scrape::{HttpPageFetcher, PageFetcher};
pub use sync::{GitHubSync, OpenGraphSync, SyncOptions, SyncReport};
pub use table::{Dataset, FieldValues, RepoFilter, RowKey, Schema};
