//! Error types for the loadmaster database layer.
//!
//! This module defines all error types using `thiserror` for ergonomic error
//! handling. The variants map the layer's propagation policy: single-query
//! failures are absorbed into `DatabaseResponse` by the adapters, while
//! initialization, bootstrap, schema, and transaction failures propagate as
//! `Err` values because partial application would corrupt state.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    /// The adapter or its connection could not be constructed. Fatal;
    /// surfaced to the caller of `DatabaseFactory::get_database`.
    #[error("Initialization failed: {message}")]
    Initialization { message: String },

    /// Platform file-copy/open failure during the one-time bootstrap.
    #[error("Bootstrap failed: {message} (path: {path})")]
    Bootstrap { message: String, path: String },

    /// A single query failed. Recovered locally inside `execute_query` and
    /// returned as `DatabaseResponse.error`, never as an `Err`.
    #[error("Query failed: {message}")]
    Query {
        message: String,
        /// Driver error code (SQLSTATE or SQLite extended code) when known.
        code: Option<String>,
    },

    /// DDL execution failed during schema initialization.
    #[error("Schema error: {message}")]
    Schema { message: String },

    /// A statement inside a transaction failed. The transaction has been
    /// rolled back; no partial results were returned.
    #[error("Transaction failed at statement {index}: {message}")]
    Transaction { message: String, index: usize },
}

impl DbError {
    /// Create an initialization error.
    pub fn initialization(message: impl Into<String>) -> Self {
        Self::Initialization {
            message: message.into(),
        }
    }

    /// Create a bootstrap error for a given path.
    pub fn bootstrap(message: impl Into<String>, path: impl Into<String>) -> Self {
        Self::Bootstrap {
            message: message.into(),
            path: path.into(),
        }
    }

    /// Create a query error with an optional driver code.
    pub fn query(message: impl Into<String>, code: Option<String>) -> Self {
        Self::Query {
            message: message.into(),
            code,
        }
    }

    /// Create a schema error.
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema {
            message: message.into(),
        }
    }

    /// Create a transaction error positioned at a statement index.
    pub fn transaction(message: impl Into<String>, index: usize) -> Self {
        Self::Transaction {
            message: message.into(),
            index,
        }
    }

    /// Get the driver error code, if this error carries one.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Query { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// Wrap any error as a transaction failure at the given statement index.
    pub fn into_transaction(self, index: usize) -> Self {
        match self {
            Self::Transaction { .. } => self,
            other => Self::Transaction {
                message: other.to_string(),
                index,
            },
        }
    }
}

/// Convert sqlx errors to DbError, preserving the driver's error code.
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().map(|c| c.to_string());
                DbError::query(db_err.message(), code)
            }
            sqlx::Error::Io(io_err) => DbError::query(format!("I/O error: {}", io_err), None),
            sqlx::Error::PoolClosed => DbError::query("Connection pool is closed", None),
            sqlx::Error::RowNotFound => DbError::query("No rows returned", None),
            other => DbError::query(other.to_string(), None),
        }
    }
}

/// Convert rusqlite errors to DbError, preserving the extended result code.
impl From<rusqlite::Error> for DbError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(ffi_err, message) => {
                let code = Some(format!("{}", ffi_err.extended_code));
                match message {
                    Some(msg) => DbError::query(msg.clone(), code),
                    None => DbError::query(err.to_string(), code),
                }
            }
            _ => DbError::query(err.to_string(), None),
        }
    }
}

/// Result type alias for database operations.
pub type DbResult<T> = Result<T, DbError>;
