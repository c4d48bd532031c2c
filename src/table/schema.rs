use super::column::ColumnName;

/// Ordered set of column names. Never holds a blank or duplicate name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    columns: Vec<ColumnName>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a schema from a raw header row.
    ///
    /// Returns the schema together with, for every kept column, the index it
    /// occupied in the raw header. Blank names are discarded; a repeated name
    /// keeps its first position.
    pub fn from_header<I, S>(header: I) -> (Self, Vec<usize>)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut schema = Self::new();
        let mut source_indices = Vec::new();

        for (idx, raw) in header.into_iter().enumerate() {
            let Ok(name) = ColumnName::new(raw.as_ref()) else {
                tracing::debug!("Dropping blank column at position {}", idx);
                continue;
            };
            if schema.contains(name.as_str()) {
                tracing::warn!("Ignoring duplicate column '{}'", name);
                continue;
            }
            schema.columns.push(name);
            source_indices.push(idx);
        }

        (schema, source_indices)
    }

    /// Appends every name not already present, in the order given. Returns
    /// the names that were actually added.
    pub fn add_columns<I>(&mut self, names: I) -> Vec<ColumnName>
    where
        I: IntoIterator<Item = ColumnName>,
    {
        let mut added = Vec::new();
        for name in names {
            if !self.contains(name.as_str()) {
                self.columns.push(name.clone());
                added.push(name);
            }
        }
        added
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.as_str() == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnName> {
        self.columns.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(ColumnName::as_str).collect()
    }

    pub(crate) fn replace_at(&mut self, idx: usize, name: ColumnName) {
        self.columns[idx] = name;
    }
}

impl FromIterator<ColumnName> for Schema {
    fn from_iter<T: IntoIterator<Item = ColumnName>>(iter: T) -> Self {
        let mut schema = Schema::new();
        schema.add_columns(iter);
        schema
    }
}
