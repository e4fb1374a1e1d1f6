//! `authors` table mapping.

use crate::model::author::Author;
use crate::model::entity::EntityMeta;
use crate::repo::filter::Column;
use crate::repo::mapping::TableEntity;
use rusqlite::types::Value;
use rusqlite::Row;

/// Filterable columns of the `authors` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorColumn {
    Id,
    Name,
    Biography,
    CreatedAt,
    LastModifiedAt,
}

impl Column for AuthorColumn {
    fn name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Biography => "biography",
            Self::CreatedAt => "created_at",
            Self::LastModifiedAt => "last_modified_at",
        }
    }
}

impl TableEntity for Author {
    type Column = AuthorColumn;

    const TABLE: &'static str = "authors";
    const DATA_COLUMNS: &'static [AuthorColumn] = &[AuthorColumn::Name, AuthorColumn::Biography];

    fn column_value(&self, column: AuthorColumn) -> Value {
        match column {
            AuthorColumn::Id => Value::Integer(self.meta.id),
            AuthorColumn::Name => Value::Text(self.name.clone()),
            AuthorColumn::Biography => Value::Text(self.biography.clone()),
            AuthorColumn::CreatedAt => Value::Integer(self.meta.created_at),
            AuthorColumn::LastModifiedAt => Value::Integer(self.meta.last_modified_at),
        }
    }

    fn from_row(meta: EntityMeta, row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            meta,
            name: row.get("name")?,
            biography: row.get("biography")?,
        })
    }
}
