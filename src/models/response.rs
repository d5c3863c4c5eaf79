//! Uniform response types for database operations.
//!
//! Every adapter returns the same response shape regardless of which driver
//! produced the raw result. A `QueryResult` is either one row of data or one
//! mutation outcome, never both at once.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::error::DbError;

/// One row or one mutation outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryResult {
    /// A single row from a read query, keyed by column name.
    Row { data: Map<String, JsonValue> },
    /// The outcome of a single mutation statement.
    Write {
        changes: u64,
        #[serde(skip_serializing_if = "Option::is_none")]
        last_insert_id: Option<i64>,
    },
}

impl QueryResult {
    /// Row data, if this result came from a read query.
    pub fn data(&self) -> Option<&Map<String, JsonValue>> {
        match self {
            Self::Row { data } => Some(data),
            Self::Write { .. } => None,
        }
    }

    /// Affected-row count, if this result came from a mutation.
    pub fn changes(&self) -> Option<u64> {
        match self {
            Self::Row { .. } => None,
            Self::Write { changes, .. } => Some(*changes),
        }
    }

    /// Generated row id, if this result came from an INSERT.
    pub fn last_insert_id(&self) -> Option<i64> {
        match self {
            Self::Row { .. } => None,
            Self::Write { last_insert_id, .. } => *last_insert_id,
        }
    }
}

/// Error payload carried inside a `DatabaseResponse`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseError {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Fallback error code when the driver did not report one.
pub const GENERIC_ERROR_CODE: &str = "DB_ERROR";

/// Standard response for all database operations.
///
/// Invariant (enforced by the constructors): when `error` is present,
/// `results` is empty and `count` is 0. Otherwise `count` equals
/// `results.len()` for read queries, or 1 for a single mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseResponse {
    pub results: Vec<QueryResult>,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ResponseError>,
}

impl DatabaseResponse {
    /// Build a read response, one `QueryResult` per row.
    pub fn rows(rows: Vec<Map<String, JsonValue>>) -> Self {
        let count = rows.len();
        Self {
            results: rows.into_iter().map(|data| QueryResult::Row { data }).collect(),
            count,
            error: None,
        }
    }

    /// Build a response for a single mutation statement.
    pub fn write(changes: u64, last_insert_id: Option<i64>) -> Self {
        Self {
            results: vec![QueryResult::Write {
                changes,
                last_insert_id,
            }],
            count: 1,
            error: None,
        }
    }

    /// Build an error-bearing response from a failed query.
    pub fn failure(err: &DbError) -> Self {
        Self {
            results: Vec::new(),
            count: 0,
            error: Some(ResponseError {
                message: err.to_string(),
                code: Some(
                    err.code()
                        .map(str::to_string)
                        .unwrap_or_else(|| GENERIC_ERROR_CODE.to_string()),
                ),
            }),
        }
    }

    /// Check whether this response carries an error.
    pub fn is_err(&self) -> bool {
        self.error.is_some()
    }
}
