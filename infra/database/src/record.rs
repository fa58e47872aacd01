use std::fmt::Debug;
use surrealdb::types::SurrealValue;

/// Integer key of a record (`<table>:<id>`), assigned on insert; `0` means "not saved yet".
pub type RecordId = u64;

/// A row type stored in its own `SurrealDB` table.
pub trait Record: SurrealValue + Clone + Debug + Send + Sync + 'static {
    /// Table name. Also the prefix of the table's index names.
    const TABLE: &'static str;

    /// Columns backed by a `UNIQUE` index.
    const UNIQUE: &'static [&'static str] = &[];

    fn id(&self) -> RecordId;

    fn set_id(&mut self, id: RecordId);
}
