//! Error types for the database client

use pixbridge_common::PixbridgeError;
use thiserror::Error;

/// Errors that can occur when working with the database client
#[derive(Debug, Error)]
pub enum DbError {
    /// Error from SQLx
    #[error("Database error: {0}")]
    SqlxError(#[from] sqlx::Error),

    /// Error with the database configuration
    #[error("Database configuration error: {0}")]
    ConfigError(String),

    /// Error with database URL parsing
    #[error("Database URL error: {0}")]
    UrlError(String),

    /// Error with database pool creation
    #[error("Database pool error: {0}")]
    PoolError(String),

    /// Error with database query
    #[error("Database query error: {0}")]
    QueryError(String),

    /// A row exists but one of its columns could not be decoded
    #[error("Database decode error: {0}")]
    DecodeError(String),

    /// Unique constraint violated, e.g. a txid inserted twice
    #[error("Duplicate record: {0}")]
    Duplicate(String),
}

impl DbError {
    /// Maps a query failure, keeping unique violations distinguishable.
    pub(crate) fn from_query(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                DbError::Duplicate(db_err.message().to_string())
            }
            _ => DbError::QueryError(err.to_string()),
        }
    }
}

impl From<DbError> for PixbridgeError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Duplicate(msg) => PixbridgeError::ValidationError(msg),
            DbError::ConfigError(msg) | DbError::UrlError(msg) => {
                PixbridgeError::ConfigError(msg)
            }
            other => PixbridgeError::DatabaseError(other.to_string()),
        }
    }
}
