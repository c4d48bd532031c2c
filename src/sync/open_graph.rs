use std::path::Path;

use url::Url;

use crate::error::Result;
use crate::models::{OpenGraphData, OG_COLUMNS};
use crate::scrape::{parse_open_graph, PageFetcher};
use crate::table::column::HOMEPAGE;
use crate::table::{store, Dataset};

use super::{column_names, progress_bar, select_targets, SyncOptions, SyncReport};

/// Scrapes each project's homepage for Open Graph tags and a favicon.
pub struct OpenGraphSync<F> {
    fetcher: F,
}

impl<F: PageFetcher> OpenGraphSync<F> {
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    pub async fn run(&self, dataset: &mut Dataset, options: &SyncOptions) -> Result<SyncReport> {
        let mut report = SyncReport::default();
        report.added_columns = dataset.add_columns(column_names(OG_COLUMNS)?);

        let targets = select_targets(dataset, options.filter.as_ref(), &mut report);
        let pb = progress_bar(targets.len(), options.show_progress);

        for target in targets {
            pb.inc(1);
            let homepage = dataset
                .row(target.idx)
                .map(|row| row.value(HOMEPAGE).trim().to_string())
                .unwrap_or_default();
            if homepage.is_empty() || homepage == "none" {
                tracing::info!("{} - no homepage URL", target.key);
                report.skipped += 1;
                report
                    .passed_over
                    .push((target.key.to_string(), "no homepage URL".to_string()));
                continue;
            }

            pb.set_message(target.key.to_string());
            match self.scrape(&homepage).await {
                Ok(og) => {
                    tracing::info!(
                        "{} - title {:?}, image {:?}",
                        target.key,
                        og.title.as_deref().unwrap_or(""),
                        og.image.as_deref().unwrap_or("")
                    );
                    dataset.set_fields(target.idx, &og.to_fields())?;
                    report.updated += 1;
                }
                Err(e) if e.is_item_failure() => {
                    tracing::warn!("{} - could not fetch {}: {}", target.key, homepage, e);
                    report.failures.push((target.key.to_string(), e.to_string()));
                }
                Err(e) => {
                    pb.finish_and_clear();
                    return Err(e);
                }
            }
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

    pub async fn sync_file(&self, path: &Path, options: &SyncOptions) -> Result<SyncReport> {
        let mut dataset = store::load(path)?;
        let report = self.run(&mut dataset, options).await?;

        if report.updated > 0 || !report.added_columns.is_empty() {
            let backup = store::backup_and_write(path, &dataset)?;
            tracing::info!("Backup created: {}", backup.display());
        }
        Ok(report)
    }

    async fn scrape(&self, homepage: &str) -> Result<OpenGraphData> {
        let url = Url::parse(homepage)?;
        let html = self.fetcher.fetch_html(&url).await?;
        parse_open_graph(&html, &url)
    }
}
