//! Store bootstrap, embedded schema and units of work.
//!
//! # Responsibility
//! - Open roster stores (file or memory) with the pragmas repositories rely on.
//! - Bring the `team`/`member`/`item` schema up to date on open.
//! - Scope writes into explicit units of work.
//!
//! # Invariants
//! - Schema version lives in `PRAGMA user_version`.
//! - SQLite failures are classified once, here, so callers can tell lock
//!   contention and constraint violations apart from other failures.

use rusqlite::ErrorCode;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;
mod unit_of_work;

pub use open::{open_db, open_db_in_memory, open_from_config};
pub use unit_of_work::UnitOfWork;

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    /// Foreign key, primary key, `CHECK` or `NOT NULL` violation.
    Constraint(rusqlite::Error),
    /// Another connection holds the write lock past the busy timeout.
    Busy(rusqlite::Error),
    Sqlite(rusqlite::Error),
    /// Store was written by a newer roster build.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl DbError {
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, Self::Constraint(_))
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Busy(_))
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Constraint(err) => write!(f, "constraint violation: {err}"),
            Self::Busy(err) => write!(f, "store is locked: {err}"),
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "store schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Constraint(err) | Self::Busy(err) | Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        match value.sqlite_error_code() {
            Some(ErrorCode::ConstraintViolation) => Self::Constraint(value),
            Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked) => Self::Busy(value),
            _ => Self::Sqlite(value),
        }
    }
}
