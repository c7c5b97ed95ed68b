//! Record store error types.
use thiserror::Error;

/// Represents errors that can occur within the record store.
///
/// Wraps SQLx failures raised while connecting, migrating, or inserting rows.
#[derive(Debug, Error)]
pub enum RecordStoreError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Insert rejected: {0}")]
    InsertRejected(String),
}

impl RecordStoreError {
    /// Create an invalid configuration error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create an insert rejected error.
    pub fn insert_rejected(msg: impl Into<String>) -> Self {
        Self::InsertRejected(msg.into())
    }
}
