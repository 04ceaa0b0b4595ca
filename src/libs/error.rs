//! Error types of the storage layers.
//!
//! The store, the persistence bridge and the legacy migration return these
//! typed errors. The application facade turns them into user-facing
//! messages; the CLI commands wrap them in `anyhow` where needed.

use thiserror::Error;

/// Failure to write into the key/value storage medium.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The write would push the storage over its byte quota.
    #[error("storage quota exceeded while writing '{key}': {required} bytes required, {quota} allowed")]
    QuotaExceeded { key: String, required: usize, quota: usize },
    /// The value could not be encoded for storage.
    #[error("failed to encode value for '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    /// The database image could not be exported.
    #[error("failed to export database image: {0}")]
    Export(#[source] rusqlite::Error),
    /// The backing file could not be read or written.
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors returned by the relational task store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Caller-supplied data violates a record invariant.
    #[error("{0}")]
    Validation(String),
    /// An operation ran before `initialize()` completed.
    #[error("task store is not initialized")]
    NotInitialized,
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl StoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        StoreError::Validation(message.into())
    }
}

/// Any failure during the one-time legacy migration.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("legacy migration failed: {0}")]
    Store(#[from] StoreError),
    #[error("legacy migration failed: {0}")]
    Persistence(#[from] PersistenceError),
}
