//! Author use-case service.
//!
//! # Responsibility
//! - Provide catalog-level entry points for author management.
//! - Delegate persistence to any `Repository<Author>` implementation.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Registration never creates two authors with the same exact name.

use crate::model::author::Author;
use crate::model::entity::{Entity, EntityId};
use crate::repo::author_mapping::AuthorColumn;
use crate::repo::filter::Filter;
use crate::repo::repository::{RepoError, RepoResult, Repository};

/// Use-case service wrapper for author CRUD operations.
pub struct AuthorService<R: Repository<Author>> {
    repo: R,
}

impl<R: Repository<Author>> AuthorService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers a new author unless one with the same name exists.
    ///
    /// # Contract
    /// - Returns `Ok(None)` when the name is already registered.
    /// - Returns the stored author with its assigned id otherwise.
    pub fn register(
        &self,
        name: impl Into<String>,
        biography: impl Into<String>,
    ) -> RepoResult<Option<Author>> {
        let author = Author::new(name, biography);
        let same_name = Filter::eq(AuthorColumn::Name, author.name.clone());
        self.repo.add(&author, Some(&same_name))
    }

    /// Stores `author` as-is, without a duplicate check.
    pub fn add(&self, author: &Author) -> RepoResult<Author> {
        self.repo.add(author, None)?.ok_or_else(|| {
            RepoError::InvalidData(format!(
                "unchecked add of author {} reported a duplicate",
                author.id()
            ))
        })
    }

    /// Looks up one author by exact name.
    pub fn find_by_name(&self, name: &str) -> RepoResult<Option<Author>> {
        self.repo.get(&Filter::eq(AuthorColumn::Name, name.to_string()))
    }

    /// Looks up one author by id.
    pub fn find_by_id(&self, id: EntityId) -> RepoResult<Option<Author>> {
        self.repo.get(&Filter::eq(AuthorColumn::Id, id))
    }

    /// Lists authors whose name contains `fragment` (case-sensitive).
    ///
    /// An empty fragment lists every author.
    pub fn search(&self, fragment: &str) -> RepoResult<Vec<Author>> {
        if fragment.is_empty() {
            return self.list();
        }
        self.repo.get_all(&Filter::contains(AuthorColumn::Name, fragment))
    }

    /// Lists every author ordered by id.
    pub fn list(&self) -> RepoResult<Vec<Author>> {
        self.repo.get_all(&Filter::all())
    }

    /// Returns the number of stored authors.
    pub fn count(&self) -> RepoResult<u64> {
        self.repo.count(&Filter::all())
    }

    /// Overwrites author `id` with the fields of `author`.
    pub fn update(&self, id: EntityId, author: &Author) -> RepoResult<Author> {
        self.repo.update(id, author)
    }

    /// Removes `author` and returns the deleted row.
    pub fn remove(&self, author: &Author) -> RepoResult<Author> {
        self.repo.remove(author)
    }
}
