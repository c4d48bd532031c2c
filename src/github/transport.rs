use std::io::ErrorKind;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::process::Command;

use crate::error::{Error, Result};

/// Raw access to the GitHub API. Implemented by the authenticated `gh` CLI
/// and by a token-based REST client.
#[async_trait]
pub trait GitHubTransport: Send + Sync {
    /// GET a REST endpoint such as `/repos/{org}/{repo}`.
    async fn get_json(&self, endpoint: &str, accept: Option<&str>) -> Result<Value>;

    /// Run a GraphQL query with string variables.
    async fn graphql(&self, query: &str, variables: &[(&str, &str)]) -> Result<Value>;

    fn name(&self) -> &str;
}

/// Shells out to `gh api`, reusing whatever account `gh auth login` set up.
pub struct GhCli {
    bin: String,
    timeout: Duration,
}

impl GhCli {
    pub fn new(bin: impl Into<String>, timeout: Duration) -> Self {
        Self {
            bin: bin.into(),
            timeout,
        }
    }

    /// Fails unless `gh auth status` succeeds.
    pub async fn check_auth(&self) -> Result<()> {
        let output = self.output(&["auth", "status"]).await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::NotAuthenticated(format!(
                "{} (run: {} auth login)",
                stderr.trim(),
                self.bin
            )));
        }
        Ok(())
    }

    async fn output(&self, args: &[&str]) -> Result<std::process::Output> {
        let mut cmd = Command::new(&self.bin);
        cmd.args(args).kill_on_drop(true);

        let result = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| Error::Timeout(self.timeout.as_secs()))?;

        result.map_err(|e| match e.kind() {
            ErrorKind::NotFound => Error::Config(format!(
                "GitHub CLI ({}) not found; install it from https://cli.github.com",
                self.bin
            )),
            _ => Error::Io(e),
        })
    }

    async fn run_json(&self, args: &[&str]) -> Result<Value> {
        tracing::debug!("{} {}", self.bin, args.join(" "));
        let output = self.output(args).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::GitHubApi(stderr.trim().to_string()));
        }

        Ok(serde_json::from_slice(&output.stdout)?)
    }
}

#[async_trait]
impl GitHubTransport for GhCli {
    async fn get_json(&self, endpoint: &str, accept: Option<&str>) -> Result<Value> {
        let header = accept.map(|a| format!("Accept: {}", a));
        let mut args = vec!["api", endpoint];
        if let Some(ref header) = header {
            args.extend(["-H", header.as_str()]);
        }
        self.run_json(&args).await
    }

    async fn graphql(&self, query: &str, variables: &[(&str, &str)]) -> Result<Value> {
        let query_arg = format!("query={}", query);
        let variable_args: Vec<String> = variables
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect();

        let mut args = vec!["api", "graphql", "-f", query_arg.as_str()];
        for arg in &variable_args {
            args.extend(["-f", arg.as_str()]);
        }
        self.run_json(&args).await
    }

    fn name(&self) -> &str {
        "gh"
    }
}
