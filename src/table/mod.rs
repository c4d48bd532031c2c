pub mod column;
pub mod schema;
pub mod key;
pub mod dataset;
pub mod store;

pub use column::ColumnName;
pub use dataset::{Dataset, FieldValues, Record, RenameOutcome, Row};
pub use key::{RepoFilter, RowKey};
pub use schema::Schema;
