//! One-shot edits of the projects table. Each loads the file, changes it in
//! memory and, only if something changed, backs it up and writes it back.

use std::path::Path;

use crate::error::Result;
use crate::table::column::{HIDDEN, IS_FORK, SOCIAL_PREVIEW_URL, STARS};
use crate::table::{store, RenameOutcome, RepoFilter, RowKey};

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

#[derive(Debug, Default)]
pub struct CleanReport {
    /// `org/repo` of every removed fork, in file order.
    pub removed: Vec<String>,
    pub remaining: usize,
    pub columns: usize,
}

/// Drops every row whose `Is Fork` column is `yes`.
pub fn remove_forks(path: &Path) -> Result<CleanReport> {
    let mut dataset = store::load(path)?;
    tracing::info!(
        "Loaded {} projects with {} columns",
        dataset.len(),
        dataset.schema().len()
    );

    let removed = dataset.delete_rows(|row| row.value(IS_FORK).trim().eq_ignore_ascii_case("yes"));
    if !removed.is_empty() {
        store::backup_and_write(path, &dataset)?;
    }

    Ok(CleanReport {
        removed,
        remaining: dataset.len(),
        columns: dataset.schema().len(),
    })
}

/// Sets `Hidden` on the first row the filter matches, adding the column if
/// needed. Returns the updated row's `org/repo`, or `None` if nothing matched.
pub fn toggle_hidden(path: &Path, filter: &RepoFilter, hidden: bool) -> Result<Option<String>> {
    let mut dataset = store::load(path)?;
    let Some(idx) = dataset.find_filtered(filter) else {
        tracing::warn!("No project matches {}", filter);
        return Ok(None);
    };

    dataset.ensure_column(HIDDEN)?;
    dataset.set(idx, HIDDEN, yes_no(hidden))?;
    store::backup_and_write(path, &dataset)?;

    Ok(dataset.row(idx).map(|row| row.label()))
}

/// Removes the project with the given key. Returns how many projects remain,
/// or `None` when the key matched nothing.
pub fn delete_project(path: &Path, key: &RowKey) -> Result<Option<usize>> {
    let mut dataset = store::load(path)?;
    let removed = dataset.delete_by_key(key);
    if removed.is_empty() {
        return Ok(None);
    }

    tracing::info!("Deleted {}", removed.join(", "));
    store::backup_and_write(path, &dataset)?;
    Ok(Some(dataset.len()))
}

pub fn rename_column(path: &Path, old: &str, new: &str) -> Result<RenameOutcome> {
    let mut dataset = store::load(path)?;
    let outcome = dataset.rename_column(old, new)?;
    if outcome == RenameOutcome::Renamed {
        store::backup_and_write(path, &dataset)?;
    }
    Ok(outcome)
}

/// Marks every project lacking fetched GitHub data (no `Stars` or no
/// `Social Preview URL`) as hidden. Returns the labels of those rows.
pub fn hide_unfetched(path: &Path) -> Result<Vec<String>> {
    let mut dataset = store::load(path)?;

    let unfetched: Vec<(usize, String)> = dataset
        .rows()
        .enumerate()
        .filter(|(_, row)| {
            row.value(STARS).trim().is_empty() || row.value(SOCIAL_PREVIEW_URL).trim().is_empty()
        })
        .map(|(idx, row)| (idx, row.label()))
        .collect();

    if unfetched.is_empty() {
        return Ok(Vec::new());
    }

    dataset.ensure_column(HIDDEN)?;
    for (idx, _) in &unfetched {
        dataset.set(*idx, HIDDEN, "yes")?;
    }
    store::backup_and_write(path, &dataset)?;

    Ok(unfetched.into_iter().map(|(_, label)| label).collect())
}
