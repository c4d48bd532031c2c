use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::Result;
use crate::github::transport::GitHubTransport;
use crate::models::{CommitItem, Readme, Release, RepoMetadata, RepoPayload, Topics};

const TOPICS_ACCEPT: &str = "application/vnd.github.mercy-preview+json";

const SOCIAL_PREVIEW_QUERY: &str = r#"
query($owner: String!, $name: String!) {
  repository(owner: $owner, name: $name) {
    openGraphImageUrl
  }
}
"#;

/// Anything that can describe a repository. The sync pipeline only sees
/// this trait, so tests never touch the network.
#[async_trait]
pub trait RepoMetadataSource: Send + Sync {
    async fn fetch_repo_metadata(&self, org: &str, repo: &str) -> Result<RepoMetadata>;
    fn name(&self) -> &str;
}

/// Builds [`RepoMetadata`] from the GitHub API over any transport.
pub struct GitHubMetadataSource<T> {
    transport: T,
}

impl<T: GitHubTransport> GitHubMetadataSource<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Auxiliary endpoints degrade to `None` instead of failing the repo.
    async fn optional<D: DeserializeOwned>(&self, endpoint: &str, accept: Option<&str>) -> Option<D> {
        let value = match self.transport.get_json(endpoint, accept).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("{} unavailable: {}", endpoint, e);
                return None;
            }
        };
        match serde_json::from_value(value) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!("Unexpected payload from {}: {}", endpoint, e);
                None
            }
        }
    }

    async fn social_preview_url(&self, org: &str, repo: &str) -> Option<String> {
        let response = match self
            .transport
            .graphql(SOCIAL_PREVIEW_QUERY, &[("owner", org), ("name", repo)])
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("GraphQL error for {}/{}: {}", org, repo, e);
                return None;
            }
        };

        response
            .pointer("/data/repository/openGraphImageUrl")
            .and_then(Value::as_str)
            .filter(|url| !url.is_empty())
            .map(str::to_string)
    }
}

#[async_trait]
impl<T: GitHubTransport> RepoMetadataSource for GitHubMetadataSource<T> {
    async fn fetch_repo_metadata(&self, org: &str, repo: &str) -> Result<RepoMetadata> {
        let base = format!("/repos/{}/{}", org, repo);
        tracing::info!("Fetching {}/{} via {}", org, repo, self.transport.name());

        let payload: RepoPayload = serde_json::from_value(self.transport.get_json(&base, None).await?)?;

        let languages: BTreeMap<String, u64> = self
            .optional(&format!("{}/languages", base), None)
            .await
            .unwrap_or_default();
        let topics: Topics = self
            .optional(&format!("{}/topics", base), Some(TOPICS_ACCEPT))
            .await
            .unwrap_or_default();
        let readme: Option<Readme> = self.optional(&format!("{}/readme", base), None).await;
        let contributors: Vec<Value> = self
            .optional(&format!("{}/contributors?per_page=1&anon=1", base), None)
            .await
            .unwrap_or_default();
        let releases: Vec<Release> = self
            .optional(&format!("{}/releases?per_page=1", base), None)
            .await
            .unwrap_or_default();
        let commits: Vec<CommitItem> = self
            .optional(&format!("{}/commits?per_page=1", base), None)
            .await
            .unwrap_or_default();
        let social_preview_url = self.social_preview_url(org, repo).await;

        Ok(RepoMetadata {
            repo: payload,
            languages,
            topics: topics.names,
            readme,
            has_contributors: !contributors.is_empty(),
            releases_count: releases.len(),
            latest_release: releases.into_iter().next(),
            latest_commit: commits.into_iter().next(),
            social_preview_url,
            readme_path: None,
        })
    }

    fn name(&self) -> &str {
        self.transport.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use serde_json::json;
    use std::collections::HashMap;

    struct FakeTransport {
        responses: HashMap<String, Value>,
    }

    #[async_trait]
    impl GitHubTransport for FakeTransport {
        async fn get_json(&self, endpoint: &str, _accept: Option<&str>) -> Result<Value> {
            self.responses
                .get(endpoint)
                .cloned()
                .ok_or_else(|| Error::GitHubApi(format!("HTTP 404: {}", endpoint)))
        }

        async fn graphql(&self, _query: &str, variables: &[(&str, &str)]) -> Result<Value> {
            assert_eq!(variables, &[("owner", "whaleen"), ("name", "earth")]);
            Ok(json!({
                "data": { "repository": { "openGraphImageUrl": "https://img.example/earth.png" } }
            }))
        }

        fn name(&self) -> &str {
            "fake"
        }
    }

    #[tokio::test]
    async fn test_assembles_metadata_from_endpoints() {
        let responses = [
            (
                "/repos/whaleen/earth",
                json!({ "full_name": "whaleen/earth", "stargazers_count": 5, "fork": false }),
            ),
            ("/repos/whaleen/earth/languages", json!({ "Rust": 900, "Shell": 100 })),
            ("/repos/whaleen/earth/topics", json!({ "names": ["maps", "rust"] })),
            (
                "/repos/whaleen/earth/releases?per_page=1",
                json!([{ "tag_name": "v1.0.0", "name": "First" }]),
            ),
            (
                "/repos/whaleen/earth/commits?per_page=1",
                json!([{ "sha": "abc", "commit": { "message": "init", "author": { "name": "Josh" } } }]),
            ),
            (
                "/repos/whaleen/earth/contributors?per_page=1&anon=1",
                json!([{ "login": "whaleen" }]),
            ),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        let source = GitHubMetadataSource::new(FakeTransport { responses });
        let meta = source.fetch_repo_metadata("whaleen", "earth").await.unwrap();

        assert_eq!(meta.repo.stargazers_count, 5);
        assert_eq!(meta.topics, vec!["maps", "rust"]);
        assert!(meta.readme.is_none());
        assert!(meta.has_contributors);
        assert_eq!(meta.releases_count, 1);
        assert_eq!(meta.latest_release.unwrap().tag_name, "v1.0.0");
        assert_eq!(meta.latest_commit.unwrap().commit.message, "init");
        assert_eq!(
            meta.social_preview_url.as_deref(),
            Some("https://img.example/earth.png")
        );
        assert_eq!(meta.languages.get("Rust"), Some(&900));
    }

    #[tokio::test]
    async fn test_missing_repo_is_an_error() {
        let source = GitHubMetadataSource::new(FakeTransport {
            responses: HashMap::new(),
        });
        let err = source.fetch_repo_metadata("whaleen", "earth").await.unwrap_err();
        assert!(err.is_item_failure());
    }
}
