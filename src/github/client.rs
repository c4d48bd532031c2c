use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde_json::{json, Map, Value};

use crate::error::{Error, Result};
use crate::github::transport::GitHubTransport;

/// Token-authenticated REST/GraphQL client, used when `GITHUB_TOKEN` is set.
pub struct GitHubClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl GitHubClient {
    pub fn new(token: &str, timeout: Duration) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {}", token))?,
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            header::HeaderValue::from_static("2022-11-28"),
        );
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static("portfolio-data/0.1"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: "https://api.github.com".to_string(),
            timeout,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn read_json(&self, what: &str, response: reqwest::Response) -> Result<Value> {
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(Error::RepoNotFound(what.to_string()));
        }
        if status == StatusCode::UNAUTHORIZED {
            return Err(Error::NotAuthenticated(format!(
                "GitHub rejected the token for {}",
                what
            )));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::GitHubApi(format!(
                "Failed to fetch {}: {} - {}",
                what, status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| Error::from_request(e, self.timeout))
    }
}

#[async_trait]
impl GitHubTransport for GitHubClient {
    async fn get_json(&self, endpoint: &str, accept: Option<&str>) -> Result<Value> {
        let url = format!("{}{}", self.base_url, endpoint);
        tracing::debug!("GET {}", url);

        let mut request = self.client.get(&url);
        if let Some(accept) = accept {
            request = request.header(header::ACCEPT, accept);
        }
        let response = request
            .send()
            .await
            .map_err(|e| Error::from_request(e, self.timeout))?;

        self.read_json(endpoint, response).await
    }

    async fn graphql(&self, query: &str, variables: &[(&str, &str)]) -> Result<Value> {
        let url = format!("{}/graphql", self.base_url);
        let variables: Map<String, Value> = variables
            .iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect();

        let response = self
            .client
            .post(&url)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await
            .map_err(|e| Error::from_request(e, self.timeout))?;

        self.read_json("graphql", response).await
    }

    fn name(&self) -> &str {
        "rest"
    }
}
