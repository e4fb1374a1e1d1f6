//! Core data layer for the library catalog.
//! This crate is the single source of truth for catalog invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{CatalogConfig, ConfigError, DatabaseTarget};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::author::Author;
pub use model::entity::{Entity, EntityId, EntityMeta, ValidationError, UNASSIGNED_ID};
pub use repo::author_mapping::AuthorColumn;
pub use repo::filter::{Column, Condition, Filter};
pub use repo::mapping::TableEntity;
pub use repo::repository::{RepoError, RepoResult, Repository, SqliteRepository};
pub use service::author_service::AuthorService;

/// Repository over the `authors` table.
pub type SqliteAuthorRepository<'conn> = SqliteRepository<'conn, Author>;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
