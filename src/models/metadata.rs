use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::github::{CommitItem, Readme, Release, RepoPayload};
use crate::table::column::{LAST_UPDATED, README_PATH};
use crate::table::FieldValues;

/// Columns the GitHub sync maintains, in the order they are appended to a
/// dataset that lacks them.
pub const GITHUB_COLUMNS: &[&str] = &[
    // Stats
    "Stars",
    "Forks",
    "Watchers",
    "Subscribers",
    "Network Count",
    "Open Issues",
    "Size (KB)",
    "Contributors Count",
    "Releases Count",
    // Dates
    "Created At",
    "Pushed At",
    "Latest Release Date",
    // Info
    "Description",
    "Homepage",
    "Full Name",
    "Primary Language",
    "Language Breakdown",
    "Topics",
    // Status
    "Is Fork",
    "Archived",
    "Disabled",
    "Private",
    "Visibility",
    // Features
    "Has Pages",
    "Has Issues",
    "Has Projects",
    "Has Wiki",
    "Has Downloads",
    // Config
    "Default Branch",
    "License",
    "License Name",
    // URLs
    "HTML URL",
    "Clone URL",
    "Git URL",
    "SSH URL",
    "Social Preview URL",
    // README
    "README URL",
    "README Size (bytes)",
    "README Name",
    "README Path",
    "Has README",
    // Latest release
    "Latest Release Tag",
    "Latest Release Name",
    // Latest commit
    "Latest Commit Message",
    "Latest Commit Date",
    "Latest Commit Author",
];

/// Everything fetched about one repository.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepoMetadata {
    pub repo: RepoPayload,
    /// Bytes of code per language.
    pub languages: BTreeMap<String, u64>,
    pub topics: Vec<String>,
    pub readme: Option<Readme>,
    pub has_contributors: bool,
    pub releases_count: usize,
    pub latest_release: Option<Release>,
    pub latest_commit: Option<CommitItem>,
    pub social_preview_url: Option<String>,
    /// Site-relative path of the saved README copy, once persisted.
    pub readme_path: Option<String>,
}

impl RepoMetadata {
    /// Top three languages by size, e.g. `Rust: 80.0%, Shell: 20.0%`.
    pub fn language_breakdown(&self) -> String {
        let total: u64 = self.languages.values().sum();
        if total == 0 {
            return String::new();
        }

        let mut langs: Vec<_> = self.languages.iter().collect();
        langs.sort_by(|a, b| b.1.cmp(a.1));
        langs
            .into_iter()
            .take(3)
            .map(|(lang, bytes)| format!("{}: {:.1}%", lang, *bytes as f64 / total as f64 * 100.0))
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn to_fields(&self) -> FieldValues {
        let repo = &self.repo;
        let license = repo.license.as_ref();
        let release = self.latest_release.as_ref();
        let commit = self.latest_commit.as_ref().map(|c| &c.commit);
        let readme = self.readme.as_ref();

        let mut fields = FieldValues::new();
        fields
            .set("Stars", repo.stargazers_count.to_string())
            .set("Forks", repo.forks_count.to_string())
            .set("Watchers", repo.watchers_count.to_string())
            .set("Subscribers", repo.subscribers_count.to_string())
            .set("Network Count", repo.network_count.to_string())
            .set("Open Issues", repo.open_issues_count.to_string())
            .set("Size (KB)", repo.size.to_string())
            .set("Contributors Count", if self.has_contributors { "1+" } else { "" })
            .set("Releases Count", self.releases_count.to_string())
            .set("Created At", timestamp(repo.created_at))
            .set("Pushed At", timestamp(repo.pushed_at))
            .set(LAST_UPDATED, timestamp(repo.updated_at))
            .set(
                "Latest Release Date",
                timestamp(release.and_then(|r| r.published_at)),
            )
            .set("Description", text(&repo.description))
            .set("Homepage", text(&repo.homepage))
            .set("Full Name", repo.full_name.as_str())
            .set("Primary Language", text(&repo.language))
            .set("Topics", self.topics.join(","))
            .set("Is Fork", yes_no(repo.fork))
            .set("Archived", yes_no(repo.archived))
            .set("Disabled", yes_no(repo.disabled))
            .set("Private", yes_no(repo.private))
            .set("Visibility", text(&repo.visibility))
            .set("Has Pages", yes_no(repo.has_pages))
            .set("Has Issues", yes_no(repo.has_issues))
            .set("Has Projects", yes_no(repo.has_projects))
            .set("Has Wiki", yes_no(repo.has_wiki))
            .set("Has Downloads", yes_no(repo.has_downloads))
            .set("Has README", yes_no(readme.is_some()))
            .set(
                "Default Branch",
                repo.default_branch.as_deref().unwrap_or("main"),
            )
            .set("License", license.map(|l| text(&l.spdx_id)).unwrap_or_default())
            .set("License Name", license.map(|l| text(&l.name)).unwrap_or_default())
            .set("HTML URL", repo.html_url.as_str())
            .set("Clone URL", repo.clone_url.as_str())
            .set("Git URL", repo.git_url.as_str())
            .set("SSH URL", repo.ssh_url.as_str())
            .set("Social Preview URL", text(&self.social_preview_url))
            .set(
                "README URL",
                readme.map(|r| text(&r.html_url)).unwrap_or_default(),
            )
            .set(
                "README Size (bytes)",
                readme.map(|r| r.size).unwrap_or(0).to_string(),
            )
            .set(
                "README Name",
                readme.map(|r| r.name.clone()).unwrap_or_default(),
            )
            .set(README_PATH, text(&self.readme_path))
            .set(
                "Latest Release Tag",
                release.map(|r| r.tag_name.clone()).unwrap_or_default(),
            )
            .set(
                "Latest Release Name",
                release.map(|r| text(&r.name)).unwrap_or_default(),
            )
            .set(
                "Latest Commit Message",
                commit.map(|c| c.message.clone()).unwrap_or_default(),
            )
            .set(
                "Latest Commit Date",
                timestamp(commit.and_then(|c| c.committer.as_ref()).and_then(|s| s.date)),
            )
            .set(
                "Latest Commit Author",
                commit
                    .and_then(|c| c.author.as_ref())
                    .map(|s| text(&s.name))
                    .unwrap_or_default(),
            )
            .set("Language Breakdown", self.language_breakdown());
        fields
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn timestamp(value: Option<DateTime<Utc>>) -> String {
    value
        .map(|ts| ts.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::github::License;

    #[test]
    fn test_language_breakdown_top_three() {
        let meta = RepoMetadata {
            languages: [("Rust", 600), ("Shell", 100), ("TypeScript", 250), ("CSS", 50)]
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
            ..Default::default()
        };
        assert_eq!(
            meta.language_breakdown(),
            "Rust: 60.0%, TypeScript: 25.0%, Shell: 10.0%"
        );
        assert_eq!(RepoMetadata::default().language_breakdown(), "");
    }

    #[test]
    fn test_fields_render_flags_and_dates() {
        let meta = RepoMetadata {
            repo: RepoPayload {
                full_name: "whaleen/earth".into(),
                stargazers_count: 42,
                fork: true,
                license: Some(License {
                    spdx_id: Some("MIT".into()),
                    name: Some("MIT License".into()),
                }),
                created_at: "2023-01-02T03:04:05Z".parse().ok(),
                ..Default::default()
            },
            topics: vec!["rust".into(), "maps".into()],
            has_contributors: true,
            ..Default::default()
        };

        let fields = meta.to_fields();
        assert_eq!(fields.get("Stars"), Some("42"));
        assert_eq!(fields.get("Is Fork"), Some("yes"));
        assert_eq!(fields.get("Archived"), Some("no"));
        assert_eq!(fields.get("License"), Some("MIT"));
        assert_eq!(fields.get("Topics"), Some("rust,maps"));
        assert_eq!(fields.get("Created At"), Some("2023-01-02T03:04:05Z"));
        assert_eq!(fields.get("Pushed At"), Some(""));
        assert_eq!(fields.get("Default Branch"), Some("main"));
        assert_eq!(fields.get("Contributors Count"), Some("1+"));
        assert_eq!(fields.get("Has README"), Some("no"));
        assert_eq!(fields.get("README Size (bytes)"), Some("0"));
    }

    #[test]
    fn test_fields_cover_every_sync_column() {
        let fields = RepoMetadata::default().to_fields();
        for column in GITHUB_COLUMNS {
            assert!(fields.get(column).is_some(), "missing {}", column);
        }
        assert!(fields.get(LAST_UPDATED).is_some());
    }
}
