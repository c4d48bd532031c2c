use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoPayload {
    pub full_name: String,
    pub description: Option<String>,
    pub homepage: Option<String>,
    pub language: Option<String>,
    pub stargazers_count: u64,
    pub forks_count: u64,
    pub watchers_count: u64,
    pub subscribers_count: u64,
    pub network_count: u64,
    pub open_issues_count: u64,
    pub size: u64,
    pub created_at: Option<DateTime<Utc>>,
    pub pushed_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub fork: bool,
    pub archived: bool,
    pub disabled: bool,
    pub private: bool,
    pub visibility: Option<String>,
    pub has_pages: bool,
    pub has_issues: bool,
    pub has_projects: bool,
    pub has_wiki: bool,
    pub has_downloads: bool,
    pub default_branch: Option<String>,
    pub license: Option<License>,
    pub html_url: String,
    pub clone_url: String,
    pub git_url: String,
    pub ssh_url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct License {
    pub spdx_id: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Topics {
    pub names: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Readme {
    pub name: String,
    pub path: String,
    pub size: u64,
    pub html_url: Option<String>,
    pub encoding: Option<String>,
    /// Base64, wrapped at 60 columns by the API.
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Release {
    pub tag_name: String,
    pub name: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitItem {
    pub sha: String,
    pub commit: CommitDetail,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitDetail {
    pub message: String,
    pub author: Option<Signature>,
    pub committer: Option<Signature>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Signature {
    pub name: Option<String>,
    pub date: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_payload_tolerates_nulls() {
        let json = r#"{
            "full_name": "whaleen/earth",
            "description": null,
            "license": null,
            "stargazers_count": 12,
            "fork": false,
            "pushed_at": "2024-03-01T10:20:30Z"
        }"#;
        let repo: RepoPayload = serde_json::from_str(json).unwrap();
        assert_eq!(repo.full_name, "whaleen/earth");
        assert_eq!(repo.stargazers_count, 12);
        assert!(repo.description.is_none());
        assert!(repo.license.is_none());
        assert!(repo.pushed_at.is_some());
        assert!(repo.created_at.is_none());
    }
}
