//! Result normalization.
//!
//! Raw driver results come in two shapes: row sets and affected-row counts.
//! This module converts either shape (from whichever driver produced it)
//! into the uniform `DatabaseResponse` form the rest of the application
//! consumes.

use serde_json::{Map, Value as JsonValue};

use crate::models::DatabaseResponse;

/// A driver-native raw result, reduced to the two interpretations the
/// normalizer cares about. Adapters fill this in from their own driver's
/// result types.
#[derive(Debug, Default)]
pub struct RawResult {
    /// Decoded rows, keyed by column name.
    pub rows: Vec<Map<String, JsonValue>>,
    /// Rows affected by a mutation.
    pub changes: u64,
    /// Generated row id, when the driver reported one.
    pub last_insert_id: Option<i64>,
}

/// Normalize a raw driver result.
///
/// A non-empty row set wins over the affected-count interpretation: an
/// ambiguous result that carries both is treated as a read. A result with
/// neither rows nor changes normalizes to an empty read response, which is
/// what an empty SELECT produces.
pub fn normalize(raw: RawResult) -> DatabaseResponse {
    if !raw.rows.is_empty() {
        DatabaseResponse::rows(raw.rows)
    } else if raw.changes > 0 {
        DatabaseResponse::write(raw.changes, raw.last_insert_id)
    } else {
        DatabaseResponse::rows(Vec::new())
    }
}

/// Classify a statement by literal text inspection: a statement beginning
/// with `select` (case-insensitive, surrounding whitespace ignored) is a
/// read query; anything else is a mutation. Used by the test adapter,
/// whose driver does not expose a combined row/changes result.
pub fn is_select(sql: &str) -> bool {
    let trimmed = sql.trim_start().as_bytes();
    trimmed.len() >= 6 && trimmed[..6].eq_ignore_ascii_case(b"select")
}
