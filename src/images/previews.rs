use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::table::column::LOCAL;
use crate::table::{Dataset, RowKey};

/// Where the template social preview lives inside a checkout.
pub const SOCIAL_PREVIEW_PATH: &str = ".github/social-preview.png";

/// Locations checked when scanning a checkout for a preview image.
pub const SOCIAL_PREVIEW_CANDIDATES: &[&str] = &[
    ".github/social-preview.png",
    ".github/og-image.png",
    "docs/social-preview.png",
];

/// Maps project keys to local checkouts laid out as
/// `{projects_dir}/{prefix}{org}/{repo}`, with the org lower-cased.
#[derive(Debug, Clone)]
pub struct LocalRepos {
    projects_dir: PathBuf,
    org_prefix: String,
}

impl LocalRepos {
    pub fn new(projects_dir: impl Into<PathBuf>, org_prefix: impl Into<String>) -> Self {
        Self {
            projects_dir: projects_dir.into(),
            org_prefix: org_prefix.into(),
        }
    }

    pub fn repo_dir(&self, key: &RowKey) -> PathBuf {
        self.projects_dir
            .join(format!("{}{}", self.org_prefix, key.org().to_lowercase()))
            .join(key.repo())
    }
}

fn is_local(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("yes")
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DistributeOptions {
    pub dry_run: bool,
    /// Only touch rows whose `Local` column is `yes`.
    pub local_only: bool,
}

#[derive(Debug, Default)]
pub struct DistributeReport {
    pub copied: Vec<String>,
    pub skipped: Vec<String>,
    pub not_local: Vec<String>,
    pub not_found: Vec<String>,
    pub errors: Vec<(String, String)>,
}

/// Copies a template image into `.github/social-preview.png` of every
/// checkout listed in the dataset that does not have one yet.
pub fn distribute_template(
    dataset: &Dataset,
    repos: &LocalRepos,
    template: &Path,
    options: DistributeOptions,
) -> Result<DistributeReport> {
    if !template.is_file() {
        return Err(Error::NotFound(template.to_path_buf()));
    }

    let mut report = DistributeReport::default();
    for row in dataset.rows() {
        let Some(key) = row.key() else {
            continue;
        };
        let label = key.to_string();

        if options.local_only && !is_local(row.value(LOCAL)) {
            report.not_local.push(label);
            continue;
        }

        let repo_dir = repos.repo_dir(&key);
        if !repo_dir.is_dir() {
            tracing::debug!("{} - directory not found", label);
            report.not_found.push(label);
            continue;
        }

        let dest = repo_dir.join(SOCIAL_PREVIEW_PATH);
        if dest.exists() {
            tracing::info!("{} - already exists", label);
            report.skipped.push(label);
            continue;
        }

        if options.dry_run {
            tracing::info!("{} - would copy to {}", label, SOCIAL_PREVIEW_PATH);
            report.copied.push(label);
            continue;
        }

        match copy_file(template, &dest) {
            Ok(()) => {
                tracing::info!("{} - copied to {}", label, SOCIAL_PREVIEW_PATH);
                report.copied.push(label);
            }
            Err(e) => {
                tracing::warn!("{} - {}", label, e);
                report.errors.push((label, e.to_string()));
            }
        }
    }

    Ok(report)
}

#[derive(Debug, Default)]
pub struct CollectReport {
    pub copied: Vec<String>,
    pub missing: Vec<String>,
    pub errors: Vec<(String, String)>,
}

/// Copies each checkout's `.github/social-preview.png` into
/// `{public_dir}/social-previews/{org}/{repo}.png`.
pub fn collect_previews(dataset: &Dataset, repos: &LocalRepos, public_dir: &Path) -> CollectReport {
    let mut report = CollectReport::default();

    for key in dataset.rows().filter_map(|row| row.key()) {
        let repo_dir = repos.repo_dir(&key);
        if !repo_dir.is_dir() {
            continue;
        }

        let label = key.to_string();
        let source = repo_dir.join(SOCIAL_PREVIEW_PATH);
        if !source.is_file() {
            tracing::warn!("{} - source image not found", label);
            report.missing.push(label);
            continue;
        }

        let dest = public_dir
            .join("social-previews")
            .join(key.org())
            .join(format!("{}.png", key.repo()));
        match copy_file(&source, &dest) {
            Ok(()) => {
                tracing::info!("{} - copied", label);
                report.copied.push(label);
            }
            Err(e) => {
                tracing::warn!("{} - {}", label, e);
                report.errors.push((label, e.to_string()));
            }
        }
    }

    report
}

#[derive(Debug, Clone)]
pub struct FoundPreview {
    pub repo: String,
    pub path: PathBuf,
    pub relative_path: &'static str,
    /// GitHub offers no upload API; the image has to be set here by hand.
    pub settings_url: String,
}

#[derive(Debug, Default)]
pub struct ScanReport {
    pub found: Vec<FoundPreview>,
    pub missing: Vec<String>,
}

/// Looks for a preview image in every local checkout flagged `Local = yes`.
pub fn scan_previews(dataset: &Dataset, repos: &LocalRepos, only: Option<&RowKey>) -> ScanReport {
    let mut report = ScanReport::default();

    for row in dataset.rows() {
        let Some(key) = row.key() else {
            continue;
        };
        if only.is_some_and(|target| !target.matches(key.org(), key.repo())) {
            continue;
        }
        if !is_local(row.value(LOCAL)) {
            continue;
        }

        let repo_dir = repos.repo_dir(&key);
        if !repo_dir.is_dir() {
            continue;
        }

        let found = SOCIAL_PREVIEW_CANDIDATES
            .iter()
            .map(|relative| (*relative, repo_dir.join(relative)))
            .find(|(_, path)| path.is_file());

        match found {
            Some((relative_path, path)) => {
                tracing::info!("{} - found {}", key, relative_path);
                report.found.push(FoundPreview {
                    repo: key.to_string(),
                    path,
                    relative_path,
                    settings_url: format!("https://github.com/{}/{}/settings", key.org(), key.repo()),
                });
            }
            None => {
                tracing::info!("{} - no social preview image", key);
                report.missing.push(key.to_string());
            }
        }
    }

    report
}

fn copy_file(source: &Path, dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(source, dest)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{ColumnName, Record, Schema};
    use tempfile::tempdir;

    fn dataset(rows: &[(&str, &str, &str)]) -> Dataset {
        let schema: Schema = ["GitHub Org", "Repo", "Local"]
            .into_iter()
            .map(|c| ColumnName::new(c).unwrap())
            .collect();
        let records = rows.iter().map(|(org, repo, local)| {
            [("GitHub Org", *org), ("Repo", *repo), ("Local", *local)]
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<Record>()
        });
        Dataset::reconcile(schema, records)
    }

    #[test]
    fn test_repo_dir_layout() {
        let repos = LocalRepos::new("/projects", "_");
        let key = RowKey::new("NothingDAO", "earth").unwrap();
        assert_eq!(repos.repo_dir(&key), PathBuf::from("/projects/_nothingdao/earth"));
    }

    #[test]
    fn test_distribute_skips_existing_and_missing() {
        let dir = tempdir().unwrap();
        let template = dir.path().join("template.png");
        fs::write(&template, b"png").unwrap();

        let repos = LocalRepos::new(dir.path(), "_");
        fs::create_dir_all(dir.path().join("_whaleen/earth")).unwrap();
        fs::create_dir_all(dir.path().join("_whaleen/moon/.github")).unwrap();
        fs::write(dir.path().join("_whaleen/moon/.github/social-preview.png"), b"old").unwrap();

        let ds = dataset(&[
            ("whaleen", "earth", "yes"),
            ("whaleen", "moon", "yes"),
            ("whaleen", "mars", "yes"),
            ("whaleen", "venus", "no"),
        ]);
        let report = distribute_template(
            &ds,
            &repos,
            &template,
            DistributeOptions {
                dry_run: false,
                local_only: true,
            },
        )
        .unwrap();

        assert_eq!(report.copied, vec!["whaleen/earth"]);
        assert_eq!(report.skipped, vec!["whaleen/moon"]);
        assert_eq!(report.not_found, vec!["whaleen/mars"]);
        assert_eq!(report.not_local, vec!["whaleen/venus"]);
        assert_eq!(
            fs::read(dir.path().join("_whaleen/earth/.github/social-preview.png")).unwrap(),
            b"png"
        );
        assert_eq!(
            fs::read(dir.path().join("_whaleen/moon/.github/social-preview.png")).unwrap(),
            b"old"
        );
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let dir = tempdir().unwrap();
        let template = dir.path().join("template.png");
        fs::write(&template, b"png").unwrap();
        fs::create_dir_all(dir.path().join("_whaleen/earth")).unwrap();

        let repos = LocalRepos::new(dir.path(), "_");
        let ds = dataset(&[("whaleen", "earth", "")]);
        let report = distribute_template(
            &ds,
            &repos,
            &template,
            DistributeOptions {
                dry_run: true,
                local_only: false,
            },
        )
        .unwrap();

        assert_eq!(report.copied, vec!["whaleen/earth"]);
        assert!(!dir.path().join("_whaleen/earth/.github").exists());
    }

    #[test]
    fn test_collect_and_scan() {
        let dir = tempdir().unwrap();
        let projects = dir.path().join("projects");
        let public = dir.path().join("public");
        fs::create_dir_all(projects.join("_whaleen/earth/.github")).unwrap();
        fs::write(projects.join("_whaleen/earth/.github/social-preview.png"), b"img").unwrap();
        fs::create_dir_all(projects.join("_whaleen/moon/docs")).unwrap();
        fs::write(projects.join("_whaleen/moon/docs/social-preview.png"), b"img").unwrap();
        fs::create_dir_all(projects.join("_orthfx/jpb")).unwrap();

        let repos = LocalRepos::new(&projects, "_");
        let ds = dataset(&[
            ("whaleen", "earth", "yes"),
            ("whaleen", "moon", "yes"),
            ("orthfx", "jpb", "yes"),
        ]);

        let collected = collect_previews(&ds, &repos, &public);
        assert_eq!(collected.copied, vec!["whaleen/earth"]);
        assert_eq!(collected.missing, vec!["whaleen/moon", "orthfx/jpb"]);
        assert!(public.join("social-previews/whaleen/earth.png").is_file());

        let scan = scan_previews(&ds, &repos, None);
        let found: Vec<_> = scan.found.iter().map(|f| (f.repo.as_str(), f.relative_path)).collect();
        assert_eq!(
            found,
            vec![
                ("whaleen/earth", ".github/social-preview.png"),
                ("whaleen/moon", "docs/social-preview.png"),
            ]
        );
        assert_eq!(scan.missing, vec!["orthfx/jpb"]);
        assert_eq!(
            scan.found[0].settings_url,
            "https://github.com/whaleen/earth/settings"
        );

        let only = RowKey::new("whaleen", "moon").unwrap();
        let scan = scan_previews(&ds, &repos, Some(&only));
        assert_eq!(scan.found.len(), 1);
        assert!(scan.missing.is_empty());
    }
}
