pub mod github;
pub mod open_graph;

use indicatif::{ProgressBar, ProgressStyle};

use crate::error::Result;
use crate::table::{ColumnName, Dataset, RepoFilter, RowKey};

pub use github::GitHubSync;
pub use open_graph::OpenGraphSync;

#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Restrict the run to rows matching this filter.
    pub filter: Option<RepoFilter>,
    pub show_progress: bool,
}

#[derive(Debug, Default)]
pub struct SyncReport {
    /// Rows the filter selected (or every keyed row when unfiltered).
    pub matched: usize,
    pub updated: usize,
    pub skipped: usize,
    /// `org/repo` and the error that made the item fail.
    pub failures: Vec<(String, String)>,
    /// Selected rows that were passed over, with the reason.
    pub passed_over: Vec<(String, String)>,
    pub added_columns: Vec<ColumnName>,
}

impl SyncReport {
    pub fn errors(&self) -> usize {
        self.failures.len()
    }
}

/// A row selected for processing.
#[derive(Debug, Clone)]
pub(crate) struct Target {
    pub idx: usize,
    pub key: RowKey,
}

/// Picks the rows a run should visit. Rows without a complete key are never
/// offered to the filter; they and the rows it rejects count as skipped.
pub(crate) fn select_targets(
    dataset: &Dataset,
    filter: Option<&RepoFilter>,
    report: &mut SyncReport,
) -> Vec<Target> {
    let mut targets = Vec::new();
    for (idx, row) in dataset.rows().enumerate() {
        let Some(key) = row.key() else {
            report.skipped += 1;
            continue;
        };
        if filter.is_some_and(|f| !f.matches(key.org(), key.repo())) {
            report.skipped += 1;
            continue;
        }
        targets.push(Target { idx, key });
    }
    report.matched = targets.len();
    targets
}

pub(crate) fn column_names(names: &[&str]) -> Result<Vec<ColumnName>> {
    names.iter().map(|name| ColumnName::new(*name)).collect()
}

pub(crate) fn progress_bar(len: usize, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Record, Schema};

    fn dataset() -> Dataset {
        let schema: Schema = ["GitHub Org", "Repo"]
            .into_iter()
            .map(|c| ColumnName::new(c).unwrap())
            .collect();
        let rows = [("whaleen", "earth"), ("", "orphan"), ("nothingdao", "earth"), ("whaleen", "moon")];
        Dataset::reconcile(
            schema,
            rows.into_iter().map(|(org, repo)| {
                Record::from([
                    ("GitHub Org".to_string(), org.to_string()),
                    ("Repo".to_string(), repo.to_string()),
                ])
            }),
        )
    }

    #[test]
    fn test_unfiltered_selection_skips_incomplete_keys() {
        let mut report = SyncReport::default();
        let targets = select_targets(&dataset(), None, &mut report);
        let idx: Vec<_> = targets.iter().map(|t| t.idx).collect();
        assert_eq!(idx, vec![0, 2, 3]);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.matched, 3);
    }

    #[test]
    fn test_bare_repo_filter_matches_every_org() {
        let mut report = SyncReport::default();
        let filter = RepoFilter::new("earth");
        let targets = select_targets(&dataset(), Some(&filter), &mut report);
        let keys: Vec<_> = targets.iter().map(|t| t.key.to_string()).collect();
        assert_eq!(keys, vec!["whaleen/earth", "nothingdao/earth"]);
        assert_eq!(report.skipped, 2);
        assert_eq!(report.matched, 2);
    }
}
