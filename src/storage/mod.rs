pub mod config;
pub mod database;
pub mod repository;

use thiserror::Error;

pub use database::Database;
pub use repository::{Record, Reference, Repository, Resource};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Failed to prepare database location: {0}")]
    IoError(#[from] std::io::Error),
}

impl StorageError {
    /// True when the store rejected a write because of a UNIQUE constraint.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            StorageError::DatabaseError(rusqlite::Error::SqliteFailure(err, _)) => {
                err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
            }
            _ => false,
        }
    }
}
