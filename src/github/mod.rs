pub mod transport;
pub mod client;
pub mod source;
pub mod assets;

pub use assets::AssetStore;
pub use client::GitHubClient;
pub use source::{GitHubMetadataSource, RepoMetadataSource};
pub use transport::{GhCli, GitHubTransport};
