//! Error types for the job store

use thiserror::Error;

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur when reading or writing the job store
#[derive(Debug, Error)]
pub enum StoreError {
    /// The database rejected or failed a statement
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The directory holding the database could not be prepared
    #[error("Failed to prepare store directory {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The configured store location cannot be used
    #[error("Invalid store location: {0}")]
    InvalidLocation(String),
}
