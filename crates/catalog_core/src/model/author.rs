//! Author domain model.
//!
//! # Responsibility
//! - Define the catalog author record and its validation rules.
//!
//! # Invariants
//! - `name` must contain at least one non-whitespace character.
//! - `biography` is never null; absence is the empty string.

use crate::model::entity::{Entity, EntityId, EntityMeta, ValidationError};
use serde::{Deserialize, Serialize};

/// Catalog author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "AuthorWire")]
pub struct Author {
    /// Identity and timestamps, flattened on the wire.
    #[serde(flatten)]
    pub meta: EntityMeta,
    /// Display name. Required.
    pub name: String,
    /// Free-form biography, empty when unknown.
    pub biography: String,
}

impl Author {
    /// Creates an unsaved author; storage assigns the id on insert.
    pub fn new(name: impl Into<String>, biography: impl Into<String>) -> Self {
        Self {
            meta: EntityMeta::default(),
            name: name.into(),
            biography: biography.into(),
        }
    }

    /// Creates an author with an explicit id.
    ///
    /// Used for fixed rows (seed/import) and for building update payloads
    /// that target an existing row.
    pub fn with_id(id: EntityId, name: impl Into<String>, biography: impl Into<String>) -> Self {
        Self {
            meta: EntityMeta::with_id(id),
            name: name.into(),
            biography: biography.into(),
        }
    }
}

impl Entity for Author {
    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::Required { field: "Name" });
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct AuthorWire {
    #[serde(flatten)]
    meta: EntityMeta,
    #[serde(default)]
    name: String,
    #[serde(default)]
    biography: String,
}

impl TryFrom<AuthorWire> for Author {
    type Error = ValidationError;

    fn try_from(value: AuthorWire) -> Result<Self, Self::Error> {
        let author = Self {
            meta: value.meta,
            name: value.name,
            biography: value.biography,
        };
        author.validate()?;
        Ok(author)
    }
}
