//! Table mapping contract between entities and SQLite rows.
//!
//! # Responsibility
//! - Describe where an entity type is stored and how its columns bind.
//! - Decode rows back into entities.
//!
//! # Invariants
//! - Every mapped table has `id`, `created_at` and `last_modified_at`
//!   columns owned by the repository, not by the entity mapping.
//! - `DATA_COLUMNS` lists exactly the columns overwritten by an update.

use crate::model::entity::{Entity, EntityMeta};
use crate::repo::filter::Column;
use rusqlite::types::Value;
use rusqlite::Row;

pub const ID_COLUMN: &str = "id";
pub const CREATED_AT_COLUMN: &str = "created_at";
pub const LAST_MODIFIED_AT_COLUMN: &str = "last_modified_at";

/// Entity stored in one SQLite table.
pub trait TableEntity: Entity + Sized {
    /// Columns that filters may reference.
    type Column: Column;

    /// Table name.
    const TABLE: &'static str;

    /// Mutable columns, in bind order.
    const DATA_COLUMNS: &'static [Self::Column];

    /// Value bound for `column` on insert/update.
    fn column_value(&self, column: Self::Column) -> Value;

    /// Builds an entity from a row selected with [`select_list`].
    fn from_row(meta: EntityMeta, row: &Row<'_>) -> rusqlite::Result<Self>;
}

/// Comma-separated list of every column the repository selects for `T`.
pub fn select_list<T: TableEntity>() -> String {
    let mut columns = vec![ID_COLUMN, CREATED_AT_COLUMN, LAST_MODIFIED_AT_COLUMN];
    columns.extend(T::DATA_COLUMNS.iter().map(|column| column.name()));
    columns.join(", ")
}

/// Reads repository-owned metadata columns from `row`.
pub fn read_meta(row: &Row<'_>) -> rusqlite::Result<EntityMeta> {
    Ok(EntityMeta {
        id: row.get(ID_COLUMN)?,
        created_at: row.get(CREATED_AT_COLUMN)?,
        last_modified_at: row.get(LAST_MODIFIED_AT_COLUMN)?,
    })
}
