//! Database file holding the key-value storage slots.
//!
//! `SqliteStorage` never touches a raw connection: it goes through
//! [`open_db`] / [`open_db_in_memory`], which create the `kv_store` table and
//! refuse files written by a newer build.
//!
//! # Invariants
//! - The slot table schema version lives in `PRAGMA user_version`.
//! - A connection is handed out only after its slot table is migrated.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failure while opening or migrating the slot database.
#[derive(Debug)]
pub enum DbError {
    /// SQLite refused to open, configure or migrate the file.
    Sqlite(rusqlite::Error),
    /// The file's slot table was created by a newer build.
    SlotSchemaTooNew { found: u32, supported: u32 },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "slot database error: {err}"),
            Self::SlotSchemaTooNew { found, supported } => write!(
                f,
                "slot table schema v{found} was written by a newer build; this build reads up to v{supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::SlotSchemaTooNew { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
