use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, WriterBuilder};
use tempfile::NamedTempFile;

use super::dataset::Dataset;
use super::schema::Schema;
use crate::error::{Error, Result};

/// Reads a projects CSV. The first record is the header; blank header cells
/// are dropped together with their column of values.
pub fn load(path: &Path) -> Result<Dataset> {
    if !path.is_file() {
        return Err(Error::NotFound(path.to_path_buf()));
    }

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let header = rdr.headers()?.clone();
    let (schema, source_indices) = Schema::from_header(header.iter());

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let cells: Vec<String> = source_indices
            .iter()
            .map(|&idx| record.get(idx).unwrap_or("").to_string())
            .collect();
        rows.push(cells);
    }

    tracing::debug!(
        "Loaded {} rows with {} columns from {}",
        rows.len(),
        schema.len(),
        path.display()
    );
    Ok(Dataset::from_positional(schema, rows))
}

/// `projects.csv` -> `projects.csv.backup`
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("projects.csv"));
    name.push(".backup");
    path.with_file_name(name)
}

/// Copies the file to its backup path, replacing any earlier backup.
pub fn backup(path: &Path) -> Result<PathBuf> {
    if !path.is_file() {
        return Err(Error::NotFound(path.to_path_buf()));
    }
    let target = backup_path(path);
    fs::copy(path, &target)?;
    tracing::info!("Backup created: {}", target.display());
    Ok(target)
}

/// Serialises the dataset to `path`.
///
/// Output is staged in a temporary file in the same directory and renamed
/// over the target once complete, so a failure never leaves a truncated file.
pub fn write(path: &Path, dataset: &Dataset) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let staged = NamedTempFile::new_in(dir)?;

    {
        let mut writer = WriterBuilder::new().from_writer(staged.as_file());
        if !dataset.schema().is_empty() {
            writer.write_record(dataset.schema().names())?;
            for row in dataset.rows() {
                writer.write_record(row.cells())?;
            }
        }
        writer.flush()?;
    }

    if let Ok(meta) = fs::metadata(path) {
        fs::set_permissions(staged.path(), meta.permissions())?;
    }
    staged.persist(path).map_err(|e| Error::Io(e.error))?;

    tracing::info!("Wrote {} rows to {}", dataset.len(), path.display());
    Ok(())
}

/// Backup followed by write: the last step of every edit.
pub fn backup_and_write(path: &Path, dataset: &Dataset) -> Result<PathBuf> {
    let backup = backup(path)?;
    write(path, dataset)?;
    Ok(backup)
}
