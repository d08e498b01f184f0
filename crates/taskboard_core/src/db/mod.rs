//! SQLite file behind the task key-value storage.
//!
//! # Responsibility
//! - Open connections for `SqliteKeyValueStorage` with a busy timeout.
//! - Bring the `kv_store` table up to the schema this build expects.
//!
//! # Invariants
//! - The `kv_store` schema version lives in `PRAGMA user_version`.
//! - A storage file written by a newer build is refused, never downgraded.
//! - `SqliteKeyValueStorage` only sees connections that finished migrating.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failure while opening or migrating the storage file.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// The file carries a `kv_store` schema from a newer build.
    StorageSchemaTooNew { found: u32, supported: u32 },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::StorageSchemaTooNew { found, supported } => write!(
                f,
                "task storage schema v{found} was written by a newer build (this build reads up to v{supported})"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::StorageSchemaTooNew { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
