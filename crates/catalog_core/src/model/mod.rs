//! Catalog domain model.
//!
//! # Responsibility
//! - Define the records persisted by the catalog and their validation rules.
//! - Carry the identity/timestamp metadata shared by every stored entity.
//!
//! # Invariants
//! - Every stored entity is identified by a unique, never reused `EntityId`.
//! - Deletion is a hard delete; there is no tombstone state.

pub mod author;
pub mod entity;
