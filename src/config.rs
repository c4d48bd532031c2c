use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::images::LocalRepos;

#[derive(Debug, Clone)]
pub struct Config {
    pub csv_path: PathBuf,
    pub public_dir: PathBuf,
    /// Root directory holding local checkouts.
    pub projects_dir: PathBuf,
    pub org_dir_prefix: String,
    /// When set, GitHub is queried over REST instead of through `gh`.
    pub github_token: Option<String>,
    pub gh_bin: String,
    pub fetch_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let csv_path = env::var("PROJECTS_CSV")
            .unwrap_or_else(|_| "public/data/projects.csv".to_string())
            .into();

        let public_dir = env::var("PUBLIC_DIR")
            .unwrap_or_else(|_| "public".to_string())
            .into();

        let projects_dir = env::var("PROJECTS_DIR")
            .unwrap_or_else(|_| "..".to_string())
            .into();

        let org_dir_prefix = env::var("ORG_DIR_PREFIX").unwrap_or_else(|_| "_".to_string());

        let github_token = env::var("GITHUB_TOKEN")
            .ok()
            .filter(|token| !token.trim().is_empty());

        let gh_bin = env::var("GH_BIN").unwrap_or_else(|_| "gh".to_string());

        let fetch_timeout = match env::var("FETCH_TIMEOUT_SECS") {
            Ok(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    Error::Config(format!("FETCH_TIMEOUT_SECS must be a whole number, got {:?}", raw))
                })?;
                if secs == 0 {
                    return Err(Error::Config("FETCH_TIMEOUT_SECS must be positive".to_string()));
                }
                Duration::from_secs(secs)
            }
            Err(_) => Duration::from_secs(10),
        };

        Ok(Self {
            csv_path,
            public_dir,
            projects_dir,
            org_dir_prefix,
            github_token,
            gh_bin,
            fetch_timeout,
        })
    }

    pub fn local_repos(&self) -> LocalRepos {
        LocalRepos::new(&self.projects_dir, &self.org_dir_prefix)
    }
}
