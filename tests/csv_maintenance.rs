use std::fs;
use std::path::PathBuf;

use tempfile::{tempdir, TempDir};

use portfolio_data::edits;
use portfolio_data::table::{store, FieldValues, RenameOutcome};
use portfolio_data::{Error, RepoFilter, RowKey};

fn projects_csv(contents: &str) -> (TempDir, PathBuf) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("projects.csv");
    fs::write(&path, contents).unwrap();
    (dir, path)
}

#[test]
fn fork_removal_keeps_originals() {
    let (_dir, path) = projects_csv("GitHub Org,Repo,Is Fork\nwhaleen,earth,no\nwhaleen,mirror,yes\n");

    let report = edits::remove_forks(&path).unwrap();
    assert_eq!(report.removed, vec!["whaleen/mirror"]);

    let ds = store::load(&path).unwrap();
    assert_eq!(ds.len(), 1);
    let row = ds.row(0).unwrap();
    assert_eq!(row.value("GitHub Org"), "whaleen");
    assert_eq!(row.value("Repo"), "earth");
    assert_eq!(row.value("Is Fork"), "no");
}

#[test]
fn backup_holds_exact_prior_bytes() {
    let original = "GitHub Org,Repo,Description\r\n\
        whaleen,earth,\"Globe, \"\"tiny\"\"\"\r\n\
        orthfx,jpb,\"multi\nline\"\r\n";
    let (_dir, path) = projects_csv(original);

    let updated = edits::toggle_hidden(&path, &RepoFilter::new("orthfx/jpb"), true).unwrap();
    assert_eq!(updated.as_deref(), Some("orthfx/jpb"));

    let backup = store::backup_path(&path);
    assert_eq!(fs::read(&backup).unwrap(), original.as_bytes());

    let ds = store::load(&path).unwrap();
    assert_eq!(ds.row(0).unwrap().value("Description"), "Globe, \"tiny\"");
    assert_eq!(ds.row(0).unwrap().value("Hidden"), "");
    assert_eq!(ds.row(1).unwrap().value("Hidden"), "yes");
}

#[test]
fn rename_is_idempotent_on_disk() {
    let (_dir, path) = projects_csv("GitHub Org,Repo,Resume Worthy,Stars\nwhaleen,earth,yes,4\n");

    assert_eq!(
        edits::rename_column(&path, "Resume Worthy", "Pinned").unwrap(),
        RenameOutcome::Renamed
    );
    let first = fs::read(&path).unwrap();

    assert_eq!(
        edits::rename_column(&path, "Resume Worthy", "Pinned").unwrap(),
        RenameOutcome::AlreadyMigrated
    );
    assert_eq!(fs::read(&path).unwrap(), first);

    let ds = store::load(&path).unwrap();
    assert_eq!(ds.schema().names(), vec!["GitHub Org", "Repo", "Pinned", "Stars"]);
    assert_eq!(ds.row(0).unwrap().value("Pinned"), "yes");
}

#[test]
fn unmatched_filter_writes_nothing() {
    let original = "GitHub Org,Repo,Hidden\nwhaleen,earth,no\n";
    let (_dir, path) = projects_csv(original);

    let updated = edits::toggle_hidden(&path, &RepoFilter::new("whaleen/moon"), true).unwrap();

    assert!(updated.is_none());
    assert_eq!(fs::read_to_string(&path).unwrap(), original);
    assert!(!store::backup_path(&path).exists());
}

#[test]
fn update_grows_schema_for_every_row() {
    let (_dir, path) = projects_csv("GitHub Org,Repo\nwhaleen,earth\nwhaleen,moon\n");
    let mut ds = store::load(&path).unwrap();

    let mut fields = FieldValues::new();
    fields.set("Stars", "12").set("Topics", "maps,rust");
    let key: RowKey = "whaleen/moon".parse().unwrap();
    assert!(ds.update_row(&key, &fields).unwrap());

    store::backup_and_write(&path, &ds).unwrap();
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "GitHub Org,Repo,Stars,Topics\nwhaleen,earth,,\nwhaleen,moon,12,\"maps,rust\"\n"
    );
}

#[test]
fn missing_file_is_reported() {
    let dir = tempdir().unwrap();
    let err = edits::remove_forks(&dir.path().join("projects.csv")).unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}
