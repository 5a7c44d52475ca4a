use thiserror::Error;

/// Errors that can occur when interacting with the relational store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint was violated (duplicate key).
    #[error("unique constraint violated: {constraint}")]
    Conflict { constraint: String },

    /// A foreign-key constraint blocked the operation (row still referenced).
    #[error("foreign key constraint violated: {constraint}")]
    ForeignKey { constraint: String },

    /// A database error occurred (connectivity, timeout, or other failure).
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl StoreError {
    /// Creates a conflict error for the named constraint.
    pub fn conflict(constraint: impl Into<String>) -> Self {
        Self::Conflict {
            constraint: constraint.into(),
        }
    }

    /// Creates a foreign-key error for the named constraint.
    pub fn foreign_key(constraint: impl Into<String>) -> Self {
        Self::ForeignKey {
            constraint: constraint.into(),
        }
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
