use std::path::Path;

use crate::error::Result;
use crate::github::{AssetStore, RepoMetadataSource};
use crate::models::{RepoMetadata, GITHUB_COLUMNS};
use crate::table::column::{LAST_UPDATED, README_PATH};
use crate::table::{store, Dataset, FieldValues, RowKey};

use super::{column_names, progress_bar, select_targets, SyncOptions, SyncReport};

/// Columns whose changes are worth a log line when a row is refreshed.
const WATCHED_COLUMNS: &[&str] = &["Description", "Topics", "Stars", "Forks", LAST_UPDATED];

/// Merges repository metadata into the projects table, one repository at a
/// time.
pub struct GitHubSync<S> {
    source: S,
    assets: Option<AssetStore>,
}

impl<S: RepoMetadataSource> GitHubSync<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            assets: None,
        }
    }

    /// Also persist READMEs and social preview images under the public dir.
    pub fn with_assets(mut self, assets: AssetStore) -> Self {
        self.assets = Some(assets);
        self
    }

    pub async fn run(&self, dataset: &mut Dataset, options: &SyncOptions) -> Result<SyncReport> {
        let mut report = SyncReport::default();
        report.added_columns = dataset.add_columns(column_names(GITHUB_COLUMNS)?);

        let targets = select_targets(dataset, options.filter.as_ref(), &mut report);
        tracing::info!(
            "Processing {} repos via {}",
            targets.len(),
            self.source.name()
        );

        let pb = progress_bar(targets.len(), options.show_progress);
        for target in targets {
            pb.set_message(target.key.to_string());

            match self.fetch(&target.key).await {
                Ok(meta) => {
                    let mut fields = meta.to_fields();
                    if self.assets.is_none() {
                        // Nothing was saved this run; keep the link to the earlier copy.
                        fields.remove(README_PATH);
                    }
                    log_changes(dataset, target.idx, &target.key, &fields);

                    let width = dataset.schema().len();
                    dataset.set_fields(target.idx, &fields)?;
                    report
                        .added_columns
                        .extend(dataset.schema().iter().skip(width).cloned());

                    tracing::info!(
                        "{} updated: {} stars, {} forks, {} open issues",
                        target.key,
                        meta.repo.stargazers_count,
                        meta.repo.forks_count,
                        meta.repo.open_issues_count
                    );
                    report.updated += 1;
                }
                Err(e) if e.is_item_failure() => {
                    tracing::warn!("{} failed: {}", target.key, e);
                    report.failures.push((target.key.to_string(), e.to_string()));
                }
                Err(e) => {
                    pb.finish_and_clear();
                    return Err(e);
                }
            }
            pb.inc(1);
        }
        pb.finish_and_clear();

        tracing::info!(
            "Done: {} updated, {} skipped, {} errors",
            report.updated,
            report.skipped,
            report.errors()
        );
        Ok(report)
    }

    /// Load, sync, back up and write `path`. The file is left alone when the
    /// run changed nothing.
    pub async fn sync_file(&self, path: &Path, options: &SyncOptions) -> Result<SyncReport> {
        let mut dataset = store::load(path)?;
        let report = self.run(&mut dataset, options).await?;

        if report.updated > 0 || !report.added_columns.is_empty() {
            let backup = store::backup_and_write(path, &dataset)?;
            tracing::info!("Backup created: {}", backup.display());
        }
        Ok(report)
    }

    async fn fetch(&self, key: &RowKey) -> Result<RepoMetadata> {
        let mut meta = self.source.fetch_repo_metadata(key.org(), key.repo()).await?;

        if let Some(assets) = &self.assets {
            if let Some(readme) = &meta.readme {
                meta.readme_path = match assets.save_readme(key, readme) {
                    Ok(path) => path,
                    Err(e) => {
                        tracing::warn!("Could not save README for {}: {}", key, e);
                        None
                    }
                };
            }
            if let Some(url) = meta.social_preview_url.as_deref() {
                if let Err(e) = assets.save_social_preview(key, url).await {
                    tracing::warn!("Could not save social preview for {}: {}", key, e);
                }
            }
        }

        Ok(meta)
    }
}

fn log_changes(dataset: &Dataset, idx: usize, key: &RowKey, fields: &FieldValues) {
    let Some(row) = dataset.row(idx) else {
        return;
    };
    for column in WATCHED_COLUMNS {
        let Some(new) = fields.get(column) else {
            continue;
        };
        let old = row.value(column);
        if old != new {
            tracing::info!("{} {}: '{}' -> '{}'", key, column, old, new);
        }
    }
}
