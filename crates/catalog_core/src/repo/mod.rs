//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the generic CRUD contract used by services.
//! - Map entity types to SQLite tables and translate filters into SQL.
//!
//! # Invariants
//! - Repository writes must enforce `Entity::validate()` before persistence.
//! - Repository APIs return semantic errors (`NotFound`, `IdentityMismatch`,
//!   `MissingFilter`) in addition to DB transport errors.

pub mod author_mapping;
pub mod filter;
pub mod mapping;
pub mod repository;
