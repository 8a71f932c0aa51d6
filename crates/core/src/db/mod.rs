//! SQLite-backed symbol storage.
//!
//! `SymbolDb` persists functions, their parameters, globals, function comments
//! and declarations, and implements [`SymbolSource`](crate::symbols::SymbolSource)
//! so a session can run directly against a project database.

mod symbol_db;

use thiserror::Error;

pub use symbol_db::{SymbolDb, CURRENT_SCHEMA_VERSION};

/// Error type for symbol database operations.
#[derive(Debug, Error)]
pub enum DbError {
    /// Underlying SQLite error.
    #[error("SQLite error: {0}")]
    Sql(#[from] rusqlite::Error),

    /// The database was created with a newer schema version than we support.
    #[error(
        "Unsupported schema version {found}; supported range is {min_supported}..={max_supported}"
    )]
    UnsupportedSchemaVersion { found: i32, min_supported: i32, max_supported: i32 },
}

/// Convenience result type for DB operations.
pub type DbResult<T> = Result<T, DbError>;
