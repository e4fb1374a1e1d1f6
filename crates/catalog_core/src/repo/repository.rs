//! Generic repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over any [`TableEntity`] with filter-based reads.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Write paths call `Entity::validate()` before any SQL runs.
//! - `update` rejects an id/entity mismatch before any SQL runs.
//! - `get` rejects the empty filter before any SQL runs.
//! - Read paths reject invalid persisted rows instead of masking them.
//! - Every call is its own implicit transaction; nothing is batched.

use crate::db::migrations::{current_version, latest_version};
use crate::db::DbError;
use crate::model::entity::{now_epoch_ms, EntityId, ValidationError};
use crate::repo::filter::{Column, Filter};
use crate::repo::mapping::{
    read_meta, select_list, TableEntity, CREATED_AT_COLUMN, ID_COLUMN, LAST_MODIFIED_AT_COLUMN,
};
use log::{debug, info, warn};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, ErrorCode, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::marker::PhantomData;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for entity persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    Db(DbError),
    /// The store refused the insert (key or constraint conflict).
    CannotAdd {
        table: &'static str,
        source: rusqlite::Error,
    },
    NotFound(EntityId),
    /// `update` was called with an id that differs from the entity's id.
    IdentityMismatch {
        expected: EntityId,
        actual: EntityId,
    },
    /// A single-row lookup was called without a predicate.
    MissingFilter,
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::CannotAdd { table, source } => {
                write!(f, "cannot add entity to `{table}`: {source}")
            }
            Self::NotFound(id) => write!(f, "entity not found: {id}"),
            Self::IdentityMismatch { expected, actual } => write!(
                f,
                "entity id {actual} does not match target id {expected}"
            ),
            Self::MissingFilter => write!(f, "a filter predicate is required"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} is behind required {expected_version}; open it with db::open_db"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::CannotAdd { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// CRUD contract over entities of type `T`.
pub trait Repository<T: TableEntity> {
    /// Inserts `entity` and returns the stored row.
    ///
    /// When `duplicate_check` is a non-empty filter that matches an existing
    /// row, nothing is inserted and `Ok(None)` is returned.
    fn add(&self, entity: &T, duplicate_check: Option<&Filter<T::Column>>)
        -> RepoResult<Option<T>>;

    /// Returns rows matching `filter` ordered by id; the empty filter returns all.
    fn get_all(&self, filter: &Filter<T::Column>) -> RepoResult<Vec<T>>;

    /// Returns the first row (lowest id) matching `filter`.
    ///
    /// The empty filter is rejected with [`RepoError::MissingFilter`].
    fn get(&self, filter: &Filter<T::Column>) -> RepoResult<Option<T>>;

    /// Counts rows matching `filter`.
    fn count(&self, filter: &Filter<T::Column>) -> RepoResult<u64>;

    /// Overwrites the mutable columns of row `id` with `entity`'s values.
    fn update(&self, id: EntityId, entity: &T) -> RepoResult<T>;

    /// Hard-deletes the row with `entity`'s id and returns it.
    fn remove(&self, entity: &T) -> RepoResult<T>;
}

/// SQLite-backed repository borrowing a migrated connection.
pub struct SqliteRepository<'conn, T> {
    conn: &'conn Connection,
    _entity: PhantomData<fn() -> T>,
}

impl<'conn, T: TableEntity> SqliteRepository<'conn, T> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready::<T>(conn)?;
        Ok(Self {
            conn,
            _entity: PhantomData,
        })
    }

    fn fetch_all(&self, sql: &str, params: Vec<Value>) -> RepoResult<Vec<T>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params_from_iter(params))?;
        let mut entities = Vec::new();
        while let Some(row) = rows.next()? {
            entities.push(decode_row(row)?);
        }
        Ok(entities)
    }

    fn fetch_optional(&self, sql: &str, params: Vec<Value>) -> RepoResult<Option<T>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params_from_iter(params))?;
        match rows.next()? {
            Some(row) => Ok(Some(decode_row(row)?)),
            None => Ok(None),
        }
    }

    fn exists(&self, filter: &Filter<T::Column>) -> RepoResult<bool> {
        let Some(fragment) = filter.to_sql() else {
            return Ok(false);
        };
        let exists = self.conn.query_row(
            &format!(
                "SELECT EXISTS(SELECT 1 FROM {} WHERE {});",
                T::TABLE,
                fragment.sql
            ),
            params_from_iter(fragment.params),
            |row| row.get::<_, bool>(0),
        )?;
        Ok(exists)
    }
}

impl<T: TableEntity> Repository<T> for SqliteRepository<'_, T> {
    fn add(
        &self,
        entity: &T,
        duplicate_check: Option<&Filter<T::Column>>,
    ) -> RepoResult<Option<T>> {
        entity.validate()?;

        if let Some(check) = duplicate_check {
            if self.exists(check)? {
                info!(
                    "event=repo_add module=repo status=skip table={} reason=duplicate",
                    T::TABLE
                );
                return Ok(None);
            }
        }

        let now = now_epoch_ms();
        let mut columns = Vec::with_capacity(T::DATA_COLUMNS.len() + 3);
        let mut values = Vec::with_capacity(T::DATA_COLUMNS.len() + 3);
        if entity.meta().is_assigned() {
            columns.push(ID_COLUMN);
            values.push(Value::Integer(entity.id()));
        }
        for column in T::DATA_COLUMNS {
            columns.push(column.name());
            values.push(entity.column_value(*column));
        }
        columns.push(CREATED_AT_COLUMN);
        values.push(Value::Integer(now));
        columns.push(LAST_MODIFIED_AT_COLUMN);
        values.push(Value::Integer(now));

        let placeholders = (1..=values.len())
            .map(|index| format!("?{index}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({placeholders}) RETURNING {};",
            T::TABLE,
            columns.join(", "),
            select_list::<T>()
        );

        let stored = match self.fetch_optional(&sql, values) {
            Ok(Some(stored)) => stored,
            Ok(None) => {
                return Err(RepoError::InvalidData(format!(
                    "insert into {} returned no row",
                    T::TABLE
                )))
            }
            Err(RepoError::Db(DbError::Sqlite(err))) if is_constraint_violation(&err) => {
                warn!(
                    "event=repo_add module=repo status=error table={} error_code=constraint_violation",
                    T::TABLE
                );
                return Err(RepoError::CannotAdd {
                    table: T::TABLE,
                    source: err,
                });
            }
            Err(err) => return Err(err),
        };

        info!(
            "event=repo_add module=repo status=ok table={} id={}",
            T::TABLE,
            stored.id()
        );
        Ok(Some(stored))
    }

    fn get_all(&self, filter: &Filter<T::Column>) -> RepoResult<Vec<T>> {
        let mut sql = format!("SELECT {} FROM {}", select_list::<T>(), T::TABLE);
        let mut params = Vec::new();
        if let Some(fragment) = filter.to_sql() {
            sql.push_str(" WHERE ");
            sql.push_str(&fragment.sql);
            params = fragment.params;
        }
        sql.push_str(" ORDER BY id ASC;");

        let entities = self.fetch_all(&sql, params)?;
        debug!(
            "event=repo_get_all module=repo status=ok table={} rows={}",
            T::TABLE,
            entities.len()
        );
        Ok(entities)
    }

    fn get(&self, filter: &Filter<T::Column>) -> RepoResult<Option<T>> {
        let Some(fragment) = filter.to_sql() else {
            return Err(RepoError::MissingFilter);
        };

        let sql = format!(
            "SELECT {} FROM {} WHERE {} ORDER BY id ASC LIMIT 1;",
            select_list::<T>(),
            T::TABLE,
            fragment.sql
        );
        self.fetch_optional(&sql, fragment.params)
    }

    fn count(&self, filter: &Filter<T::Column>) -> RepoResult<u64> {
        let (where_sql, params) = match filter.to_sql() {
            Some(fragment) => (format!(" WHERE {}", fragment.sql), fragment.params),
            None => (String::new(), Vec::new()),
        };
        let count = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}{where_sql};", T::TABLE),
            params_from_iter(params),
            |row| row.get::<_, i64>(0),
        )?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative row count `{count}`")))
    }

    fn update(&self, id: EntityId, entity: &T) -> RepoResult<T> {
        if id != entity.id() {
            warn!(
                "event=repo_update module=repo status=error table={} id={id} error_code=identity_mismatch",
                T::TABLE
            );
            return Err(RepoError::IdentityMismatch {
                expected: id,
                actual: entity.id(),
            });
        }
        entity.validate()?;

        let mut assignments = Vec::with_capacity(T::DATA_COLUMNS.len() + 1);
        let mut values = Vec::with_capacity(T::DATA_COLUMNS.len() + 2);
        for column in T::DATA_COLUMNS {
            values.push(entity.column_value(*column));
            assignments.push(format!("{} = ?{}", column.name(), values.len()));
        }
        values.push(Value::Integer(now_epoch_ms()));
        let now_index = values.len();
        // Strictly increasing even when two writes land in the same millisecond.
        assignments.push(format!(
            "{LAST_MODIFIED_AT_COLUMN} = MAX(?{now_index}, {LAST_MODIFIED_AT_COLUMN} + 1)"
        ));
        values.push(Value::Integer(id));

        let sql = format!(
            "UPDATE {} SET {} WHERE {ID_COLUMN} = ?{} RETURNING {};",
            T::TABLE,
            assignments.join(", "),
            values.len(),
            select_list::<T>()
        );

        match self.fetch_optional(&sql, values)? {
            Some(stored) => {
                info!(
                    "event=repo_update module=repo status=ok table={} id={id}",
                    T::TABLE
                );
                Ok(stored)
            }
            None => {
                warn!(
                    "event=repo_update module=repo status=error table={} id={id} error_code=not_found",
                    T::TABLE
                );
                Err(RepoError::NotFound(id))
            }
        }
    }

    fn remove(&self, entity: &T) -> RepoResult<T> {
        let id = entity.id();
        let sql = format!(
            "DELETE FROM {} WHERE {ID_COLUMN} = ?1 RETURNING {};",
            T::TABLE,
            select_list::<T>()
        );

        match self.fetch_optional(&sql, vec![Value::Integer(id)])? {
            Some(removed) => {
                info!(
                    "event=repo_remove module=repo status=ok table={} id={id}",
                    T::TABLE
                );
                Ok(removed)
            }
            None => {
                warn!(
                    "event=repo_remove module=repo status=error table={} id={id} error_code=not_found",
                    T::TABLE
                );
                Err(RepoError::NotFound(id))
            }
        }
    }
}

fn decode_row<T: TableEntity>(row: &Row<'_>) -> RepoResult<T> {
    let meta = read_meta(row)?;
    let entity = T::from_row(meta, row)?;
    entity.validate().map_err(|err| {
        RepoError::InvalidData(format!("row {} in {}: {err}", meta.id, T::TABLE))
    })?;
    Ok(entity)
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _) if failure.code == ErrorCode::ConstraintViolation
    )
}

fn ensure_connection_ready<T: TableEntity>(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_version(conn)?;
    if actual_version < expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let table_exists = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [T::TABLE],
        |row| row.get::<_, bool>(0),
    )?;
    if !table_exists {
        return Err(RepoError::MissingRequiredTable(T::TABLE));
    }

    let mut stmt = conn.prepare(&format!("PRAGMA table_info({});", T::TABLE))?;
    let present = stmt
        .query_map([], |row| row.get::<_, String>("name"))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let required = [ID_COLUMN, CREATED_AT_COLUMN, LAST_MODIFIED_AT_COLUMN]
        .into_iter()
        .chain(T::DATA_COLUMNS.iter().map(|column| column.name()));
    for column in required {
        if !present.iter().any(|name| name == column) {
            return Err(RepoError::MissingRequiredColumn {
                table: T::TABLE,
                column,
            });
        }
    }

    Ok(())
}
