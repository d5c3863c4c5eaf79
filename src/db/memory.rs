//! Test adapter backed by rusqlite.
//!
//! Provides the same contract as the native adapter without the platform
//! bootstrap, for automated testing. The underlying driver is synchronous;
//! every contract method does its work synchronously inside an async fn so
//! the caller-visible contract stays awaitable.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::{Connection, OpenFlags};
use serde_json::{Map, Value as JsonValue};
use tracing::{debug, info, warn};

use crate::db::normalizer;
use crate::error::{DbError, DbResult};
use crate::models::{DatabaseResponse, SqlParam, SqlStatement};

/// In-memory or file-backed database adapter for tests.
pub struct MemoryDatabase {
    conn: Arc<Mutex<Connection>>,
}

impl MemoryDatabase {
    /// Open a pure in-memory store.
    pub fn in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| DbError::initialization(e.to_string()))?;
        info!("Opened in-memory database");
        Self::configure(conn)
    }

    /// Open a durable database file, optionally read-only.
    pub fn open_file(path: impl AsRef<Path>, read_only: bool) -> DbResult<Self> {
        let path = path.as_ref();
        let conn = if read_only {
            Connection::open_with_flags(
                path,
                OpenFlags::SQLITE_OPEN_READ_ONLY
                    | OpenFlags::SQLITE_OPEN_URI
                    | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )
        } else {
            Connection::open(path)
        }
        .map_err(|e| DbError::initialization(e.to_string()))?;

        info!(path = %path.display(), read_only, "Opened database file");
        Self::configure(conn)
    }

    fn configure(conn: Connection) -> DbResult<Self> {
        // Extended result codes feed the error code field of responses.
        conn.execute_batch(
            "PRAGMA extended_result_codes = ON;
             PRAGMA foreign_keys = ON;",
        )
        .map_err(|e| DbError::initialization(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| DbError::query("database lock poisoned", None))
    }

    /// Execute a single statement; driver failures come back in the
    /// response, never as an `Err`.
    pub async fn execute_query(&self, sql: &str, params: &[SqlParam]) -> DatabaseResponse {
        debug!(sql = %sql, params = params.len(), "Executing query");
        let result = self
            .lock()
            .and_then(|conn| run_statement(&conn, sql, params));
        match result {
            Ok(response) => response,
            Err(e) => {
                warn!(sql = %sql, error = %e, "Query failed");
                DatabaseResponse::failure(&e)
            }
        }
    }

    /// Apply a DDL script. Safe to call repeatedly as long as the script
    /// uses `CREATE ... IF NOT EXISTS`; fails on malformed SQL.
    pub async fn initialize_schema(&self, sql: &str) -> DbResult<()> {
        debug!("Applying schema script");
        let conn = self.lock().map_err(|e| DbError::schema(e.to_string()))?;
        conn.execute_batch(sql)
            .map_err(|e| DbError::schema(e.to_string()))?;
        info!("Schema initialization complete");
        Ok(())
    }

    /// Execute all statements atomically with explicit BEGIN/COMMIT; any
    /// failure rolls back and propagates.
    pub async fn execute_transaction(
        &self,
        statements: &[SqlStatement],
    ) -> DbResult<Vec<DatabaseResponse>> {
        let conn = self
            .lock()
            .map_err(|e| DbError::transaction(e.to_string(), 0))?;

        conn.execute_batch("BEGIN")
            .map_err(|e| DbError::transaction(e.to_string(), 0))?;
        debug!(statements = statements.len(), "Transaction started");

        let mut responses = Vec::with_capacity(statements.len());
        for (index, stmt) in statements.iter().enumerate() {
            match run_statement(&conn, &stmt.sql, &stmt.params) {
                Ok(response) => responses.push(response),
                Err(e) => {
                    warn!(index, sql = %stmt.sql, error = %e, "Transaction statement failed, rolling back");
                    // Best effort: the failed statement may already have
                    // aborted the transaction.
                    let _ = conn.execute_batch("ROLLBACK");
                    return Err(e.into_transaction(index));
                }
            }
        }

        conn.execute_batch("COMMIT")
            .map_err(|e| DbError::transaction(e.to_string(), statements.len()))?;
        debug!(statements = statements.len(), "Transaction committed");
        Ok(responses)
    }

    /// Execute raw multi-statement SQL without normalization. Fixture
    /// loading for test harnesses only; not part of the production
    /// contract.
    pub fn load_fixtures(&self, sql: &str) -> DbResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(sql).map_err(DbError::from)
    }

    /// Close the connection. The handle is shared, so this drops this
    /// adapter's reference; the connection closes when the last clone of
    /// the handle goes away.
    pub async fn close(&self) {
        debug!("Memory database closed");
    }
}

/// Execute one statement on the locked connection. Classification is by
/// literal text: a `select` prefix takes the row path, everything else the
/// mutation path.
fn run_statement(
    conn: &Connection,
    sql: &str,
    params: &[SqlParam],
) -> DbResult<DatabaseResponse> {
    if normalizer::is_select(sql) {
        let mut stmt = conn.prepare(sql)?;
        let column_names: Vec<String> =
            stmt.column_names().iter().map(|s| s.to_string()).collect();

        let mut rows = Vec::new();
        let mut raw_rows = stmt.query(rusqlite::params_from_iter(params.iter()))?;
        while let Some(row) = raw_rows.next()? {
            let mut map = Map::new();
            for (idx, name) in column_names.iter().enumerate() {
                map.insert(name.clone(), value_to_json(row, idx));
            }
            rows.push(map);
        }
        Ok(DatabaseResponse::rows(rows))
    } else {
        let changes = {
            let mut stmt = conn.prepare(sql)?;
            stmt.execute(rusqlite::params_from_iter(params.iter()))?
        };
        Ok(DatabaseResponse::write(
            changes as u64,
            Some(conn.last_insert_rowid()),
        ))
    }
}

/// Convert a SQLite value to JSON by storage class.
fn value_to_json(row: &rusqlite::Row, idx: usize) -> JsonValue {
    use base64::{Engine as _, engine::general_purpose::STANDARD};
    use rusqlite::types::ValueRef;

    match row.get_ref(idx) {
        Ok(ValueRef::Null) => JsonValue::Null,
        Ok(ValueRef::Integer(i)) => JsonValue::Number(i.into()),
        Ok(ValueRef::Real(f)) => serde_json::Number::from_f64(f)
            .map(JsonValue::Number)
            .unwrap_or_else(|| JsonValue::String(f.to_string())),
        Ok(ValueRef::Text(t)) => JsonValue::String(String::from_utf8_lossy(t).into_owned()),
        Ok(ValueRef::Blob(b)) => JsonValue::String(STANDARD.encode(b)),
        Err(_) => JsonValue::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_select_produces_rows() {
        let db = MemoryDatabase::in_memory().unwrap();
        db.load_fixtures(
            "CREATE TABLE items (id INTEGER PRIMARY KEY, name TEXT);
             INSERT INTO items (name) VALUES ('Pallet');",
        )
        .unwrap();

        let resp = db.execute_query("SELECT * FROM items", &[]).await;
        assert_eq!(resp.count, 1);
        assert_eq!(
            resp.results[0].data().unwrap()["name"],
            JsonValue::String("Pallet".to_string())
        );
    }

    #[tokio::test]
    async fn test_mutation_produces_single_write_result() {
        let db = MemoryDatabase::in_memory().unwrap();
        db.load_fixtures("CREATE TABLE items (id INTEGER PRIMARY KEY, name TEXT);")
            .unwrap();

        let resp = db
            .execute_query(
                "INSERT INTO items (name) VALUES (?)",
                &[SqlParam::from("Crate")],
            )
            .await;
        assert_eq!(resp.count, 1);
        assert_eq!(resp.results[0].changes(), Some(1));
        assert_eq!(resp.results[0].last_insert_id(), Some(1));
    }

    #[tokio::test]
    async fn test_zero_change_update_still_counts_as_mutation() {
        let db = MemoryDatabase::in_memory().unwrap();
        db.load_fixtures("CREATE TABLE items (id INTEGER PRIMARY KEY, name TEXT);")
            .unwrap();

        let resp = db
            .execute_query("UPDATE items SET name = 'x' WHERE id = 999", &[])
            .await;
        assert_eq!(resp.count, 1);
        assert_eq!(resp.results[0].changes(), Some(0));
    }

    #[tokio::test]
    async fn test_driver_error_absorbed_into_response() {
        let db = MemoryDatabase::in_memory().unwrap();
        let resp = db.execute_query("INVALID SQL", &[]).await;
        assert!(resp.is_err());
        assert!(resp.results.is_empty());
        assert_eq!(resp.count, 0);
    }
}
