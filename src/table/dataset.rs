use std::collections::HashMap;

use super::column::{ColumnName, GITHUB_ORG, REPO};
use super::key::{RepoFilter, RowKey};
use super::schema::Schema;
use crate::error::{Error, Result};

/// A loosely shaped row, keyed by column name. Only used at the boundary;
/// [`Dataset::reconcile`] turns a batch of these into a rectangular dataset.
pub type Record = HashMap<String, String>;

/// In-memory projects table.
///
/// Cells are stored positionally against the schema, so every row always has
/// exactly one value per schema column. All schema changes go through the
/// dataset, which pads or relabels rows in the same step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    schema: Schema,
    rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameOutcome {
    Renamed,
    AlreadyMigrated,
}

impl Dataset {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            rows: Vec::new(),
        }
    }

    /// Builds a dataset from arbitrary records. Missing cells become empty
    /// strings; keys outside the schema are dropped.
    pub fn reconcile<I>(schema: Schema, records: I) -> Self
    where
        I: IntoIterator<Item = Record>,
    {
        let rows = records
            .into_iter()
            .map(|mut record| {
                schema
                    .iter()
                    .map(|name| record.remove(name.as_str()).unwrap_or_default())
                    .collect()
            })
            .collect();
        Self { schema, rows }
    }

    /// Builds a dataset from positional cells, padding short rows and
    /// truncating long ones to the schema width.
    pub(crate) fn from_positional(schema: Schema, rows: Vec<Vec<String>>) -> Self {
        let width = schema.len();
        let rows = rows
            .into_iter()
            .map(|mut cells| {
                cells.resize(width, String::new());
                cells
            })
            .collect();
        Self { schema, rows }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, idx: usize) -> Option<Row<'_>> {
        self.rows.get(idx).map(|cells| Row {
            schema: &self.schema,
            cells,
        })
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().map(|cells| Row {
            schema: &self.schema,
            cells,
        })
    }

    /// Appends the given columns to the schema and pads every row with an
    /// empty cell for each one actually added.
    pub fn add_columns<I>(&mut self, names: I) -> Vec<ColumnName>
    where
        I: IntoIterator<Item = ColumnName>,
    {
        let added = self.schema.add_columns(names);
        if !added.is_empty() {
            let width = self.schema.len();
            for cells in &mut self.rows {
                cells.resize(width, String::new());
            }
        }
        added
    }

    /// Index of `name`, adding the column if it does not exist yet.
    pub fn ensure_column(&mut self, name: &str) -> Result<usize> {
        if let Some(idx) = self.schema.position(name) {
            return Ok(idx);
        }
        self.add_columns([ColumnName::new(name)?]);
        Ok(self.schema.len() - 1)
    }

    /// First row whose (org, repo) equals `key`, ignoring case.
    pub fn find_row(&self, key: &RowKey) -> Option<usize> {
        self.rows().position(|row| key.matches(row.value(GITHUB_ORG), row.value(REPO)))
    }

    /// First row with a non-blank key that `filter` matches.
    pub fn find_filtered(&self, filter: &RepoFilter) -> Option<usize> {
        self.rows()
            .position(|row| row.key().is_some_and(|k| filter.matches(k.org(), k.repo())))
    }

    pub fn set(&mut self, idx: usize, column: &str, value: impl Into<String>) -> Result<()> {
        let col = self
            .schema
            .position(column)
            .ok_or_else(|| Error::ColumnNotFound(column.to_string()))?;
        let cells = self
            .rows
            .get_mut(idx)
            .ok_or_else(|| Error::RepoNotFound(format!("row {}", idx)))?;
        cells[col] = value.into();
        Ok(())
    }

    /// Overwrites the given fields on row `idx`, growing the schema for any
    /// field it does not have yet.
    pub fn set_fields(&mut self, idx: usize, fields: &FieldValues) -> Result<()> {
        if idx >= self.rows.len() {
            return Err(Error::RepoNotFound(format!("row {}", idx)));
        }
        let names = fields
            .iter()
            .map(|(name, _)| ColumnName::new(name))
            .collect::<Result<Vec<_>>>()?;
        self.add_columns(names);

        for (name, value) in fields.iter() {
            self.set(idx, name, value)?;
        }
        Ok(())
    }

    /// Updates the first row matching `key`. Returns `false` when no row
    /// matches; that is not an error at this level.
    pub fn update_row(&mut self, key: &RowKey, fields: &FieldValues) -> Result<bool> {
        match self.find_row(key) {
            Some(idx) => {
                self.set_fields(idx, fields)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Removes every row the predicate selects and returns their
    /// `org/repo` labels in original order.
    pub fn delete_rows<F>(&mut self, mut predicate: F) -> Vec<String>
    where
        F: FnMut(&Row<'_>) -> bool,
    {
        let schema = &self.schema;
        let mut removed = Vec::new();
        self.rows.retain(|cells| {
            let row = Row { schema, cells };
            if predicate(&row) {
                removed.push(row.label());
                false
            } else {
                true
            }
        });
        removed
    }

    pub fn delete_by_key(&mut self, key: &RowKey) -> Vec<String> {
        self.delete_rows(|row| key.matches(row.value(GITHUB_ORG), row.value(REPO)))
    }

    /// Renames a column in place, keeping its position and every row's value.
    ///
    /// A dataset that already has `new` is treated as migrated and left
    /// untouched, which makes repeated renames harmless.
    pub fn rename_column(&mut self, old: &str, new: &str) -> Result<RenameOutcome> {
        if self.schema.contains(new) {
            return Ok(RenameOutcome::AlreadyMigrated);
        }
        let idx = self
            .schema
            .position(old)
            .ok_or_else(|| Error::ColumnNotFound(old.to_string()))?;
        self.schema.replace_at(idx, ColumnName::new(new)?);
        Ok(RenameOutcome::Renamed)
    }
}

/// Read-only view of one row.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    schema: &'a Schema,
    cells: &'a [String],
}

impl<'a> Row<'a> {
    pub fn get(&self, column: &str) -> Option<&'a str> {
        let cells = self.cells;
        self.schema.position(column).map(|idx| cells[idx].as_str())
    }

    /// Cell value, or the empty string when the column does not exist.
    pub fn value(&self, column: &str) -> &'a str {
        self.get(column).unwrap_or("")
    }

    /// The row's key, if both org and repo are filled in.
    pub fn key(&self) -> Option<RowKey> {
        RowKey::new(self.value(GITHUB_ORG), self.value(REPO)).ok()
    }

    /// `org/repo` for reports, with `?` standing in for a blank half.
    pub fn label(&self) -> String {
        let org = self.value(GITHUB_ORG).trim();
        let repo = self.value(REPO).trim();
        format!(
            "{}/{}",
            if org.is_empty() { "?" } else { org },
            if repo.is_empty() { "?" } else { repo }
        )
    }

    pub fn cells(&self) -> &'a [String] {
        self.cells
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        let schema = self.schema;
        let cells = self.cells;
        schema
            .iter()
            .zip(cells.iter())
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

/// Ordered set of column updates to apply to one row. Setting the same
/// column twice keeps the last value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldValues {
    fields: Vec<(String, String)>,
}

impl FieldValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, column: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let column = column.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| *name == column) {
            Some(existing) => existing.1 = value,
            None => self.fields.push((column, value)),
        }
        self
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, v)| v.as_str())
    }

    /// Drops `column`, returning its value if it was set.
    pub fn remove(&mut self, column: &str) -> Option<String> {
        let idx = self.fields.iter().position(|(name, _)| name == column)?;
        Some(self.fields.remove(idx).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for FieldValues
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut fields = FieldValues::new();
        for (k, v) in iter {
            fields.set(k, v);
        }
        fields
    }
}
