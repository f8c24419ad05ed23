//! Repository layer abstractions and SQLite implementations.
//!
//! # Responsibility
//! - Define the generic CRUD contract shared by every entity.
//! - Isolate SQLite query details from callers.
//!
//! # Invariants
//! - Write paths validate entities before SQL mutations.
//! - Missing rows are reported as `None`/empty results, never as errors.
//! - Storage constraint violations surface unchanged as `RepoError::Db`.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::ModelError;
use crate::query::{Page, PageRequest, Sort, SortField};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod item_repo;
pub mod member_repo;
pub mod team_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Entity failed model validation before a write.
    Validation(ModelError),
    /// Underlying SQLite/bootstrap error, including constraint violations.
    Db(DbError),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Connection lacks a table the repository reads or writes.
    MissingRequiredTable(&'static str),
    /// Required table exists but lacks one of the expected columns.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted data cannot be converted to a valid entity.
    InvalidData(String),
    /// A write was not visible to the read that followed it.
    InconsistentState(&'static str),
    /// Locking read attempted outside a unit of work.
    LockRequiresTransaction,
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "repository requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::InconsistentState(details) => write!(f, "inconsistent state: {details}"),
            Self::LockRequiresTransaction => {
                write!(f, "locking reads must run inside a unit of work")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ModelError> for RepoError {
    fn from(value: ModelError) -> Self {
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
        Self::Db(DbError::from(value))
    }
}

/// Generic persistence contract shared by all entities.
pub trait CrudRepository {
    type Entity;
    type Id: Copy;
    type Field: SortField;

    /// Inserts `entity` when it has no identity yet, otherwise updates it.
    ///
    /// Returns the persisted state read back from storage.
    fn save(&self, entity: &Self::Entity) -> RepoResult<Self::Entity>;
    fn find_by_id(&self, id: Self::Id) -> RepoResult<Option<Self::Entity>>;
    fn exists_by_id(&self, id: Self::Id) -> RepoResult<bool>;
    /// Lists every entity ordered by id.
    fn find_all(&self) -> RepoResult<Vec<Self::Entity>>;
    fn find_all_sorted(&self, sort: &Sort<Self::Field>) -> RepoResult<Vec<Self::Entity>>;
    fn find_page(&self, request: &PageRequest<Self::Field>) -> RepoResult<Page<Self::Entity>>;
    /// Deletes `entity`. Deleting a transient or already deleted entity is a no-op.
    fn delete(&self, entity: &Self::Entity) -> RepoResult<()>;
    fn delete_by_id(&self, id: Self::Id) -> RepoResult<()>;
    fn count(&self) -> RepoResult<u64>;
}

/// Table shape a repository depends on.
pub(crate) struct TableRequirement {
    pub(crate) table: &'static str,
    pub(crate) columns: &'static [&'static str],
}

pub(crate) const TEAM_TABLE: TableRequirement = TableRequirement {
    table: "team",
    columns: &["id", "name", "created_at", "updated_at"],
};

pub(crate) const MEMBER_TABLE: TableRequirement = TableRequirement {
    table: "member",
    columns: &["id", "username", "age", "team_id", "created_at", "updated_at"],
};

pub(crate) const ITEM_TABLE: TableRequirement = TableRequirement {
    table: "item",
    columns: &["id", "created_at", "last_modified_at"],
};

/// Rejects connections that are not migrated to the expected schema.
pub(crate) fn ensure_connection_ready(
    conn: &Connection,
    requirements: &[TableRequirement],
) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for requirement in requirements {
        if !table_exists(conn, requirement.table)? {
            return Err(RepoError::MissingRequiredTable(requirement.table));
        }
        for &column in requirement.columns {
            if !table_has_column(conn, requirement.table, column)? {
                return Err(RepoError::MissingRequiredColumn {
                    table: requirement.table,
                    column,
                });
            }
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Appends ` LIMIT ? OFFSET ?` with bound values.
pub(crate) fn push_window(sql: &mut String, binds: &mut Vec<Value>, limit: u64, offset: u64) {
    sql.push_str(" LIMIT ? OFFSET ?");
    binds.push(Value::Integer(to_sql_integer(limit)));
    binds.push(Value::Integer(to_sql_integer(offset)));
}

/// Runs a `SELECT COUNT(*) ...` statement.
pub(crate) fn query_count(conn: &Connection, sql: &str, binds: Vec<Value>) -> RepoResult<u64> {
    let count: i64 = conn.query_row(sql, params_from_iter(binds), |row| row.get(0))?;
    u64::try_from(count).map_err(|_| RepoError::InvalidData(format!("negative row count {count}")))
}

fn to_sql_integer(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
