//! Error types for SQLite operations.

use roster_query::error::{ErrorCode, QueryError};
use thiserror::Error;

/// Result type for SQLite operations.
pub type SqliteResult<T> = Result<T, SqliteError>;

/// Error type for SQLite operations.
#[derive(Debug, Error)]
pub enum SqliteError {
    /// SQLite driver error.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] tokio_rusqlite::Error),
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
    /// A query expected rows and got none.
    #[error("No row found: {0}")]
    NotFound(String),
    /// A query expected at most one row and got more.
    #[error("Expected one row, found {0}")]
    NotUnique(usize),
    /// Deserialization error.
    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

impl SqliteError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a not-found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a deserialization error.
    pub fn deserialization(msg: impl Into<String>) -> Self {
        Self::Deserialization(msg.into())
    }

    /// Whether the database can no longer be reached through this handle.
    pub fn is_unavailable(&self) -> bool {
        match self {
            Self::Sqlite(tokio_rusqlite::Error::ConnectionClosed) => true,
            Self::Sqlite(tokio_rusqlite::Error::Close(_)) => true,
            Self::Sqlite(tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(e, _))) => {
                matches!(
                    e.code,
                    rusqlite::ErrorCode::CannotOpen
                        | rusqlite::ErrorCode::NotADatabase
                        | rusqlite::ErrorCode::DatabaseBusy
                        | rusqlite::ErrorCode::DatabaseLocked
                )
            }
            _ => false,
        }
    }
}

impl From<rusqlite::Error> for SqliteError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Sqlite(tokio_rusqlite::Error::Rusqlite(err))
    }
}

impl From<SqliteError> for QueryError {
    fn from(err: SqliteError) -> Self {
        if err.is_unavailable() {
            return QueryError::data_source_unavailable(err.to_string())
                .with_help("Reopen the SQLite connection");
        }
        match err {
            SqliteError::Config(msg) => QueryError::configuration(msg),
            SqliteError::NotFound(msg) => QueryError::not_found(msg),
            SqliteError::NotUnique(n) => QueryError::not_unique("row", n),
            SqliteError::Deserialization(msg) => QueryError::deserialization(msg),
            SqliteError::Sqlite(e) if is_syntax_error(&e) => {
                QueryError::new(ErrorCode::SqlSyntax, e.to_string())
            }
            SqliteError::Sqlite(e) => QueryError::database(e.to_string()),
        }
    }
}

fn is_syntax_error(err: &tokio_rusqlite::Error) -> bool {
    match err {
        tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqlInputError { msg, .. }) => {
            msg.contains("syntax error")
        }
        tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(_, Some(msg))) => {
            msg.contains("syntax error")
        }
        _ => false,
    }
}
