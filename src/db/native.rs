//! Production adapter backed by sqlx/SQLite.
//!
//! Owns the single open connection to the platform-bootstrapped database
//! file. The pool is capped at one connection, so concurrent callers are
//! serialized by the pool rather than by the adapter itself.

use serde_json::{Map, Value as JsonValue};
use sqlx::sqlite::{
    SqliteArguments, SqliteConnectOptions, SqliteConnection, SqlitePoolOptions, SqliteRow,
};
use sqlx::{Column, Executor, Row, SqlitePool, TypeInfo};
use tracing::{debug, info, warn};

use crate::config::NativeConfig;
use crate::db::bootstrap::BootstrapPolicy;
use crate::db::normalizer::{self, RawResult};
use crate::error::{DbError, DbResult};
use crate::models::{DatabaseResponse, SqlParam, SqlStatement};

/// Native database adapter for the production app.
#[derive(Debug)]
pub struct NativeDatabase {
    pool: SqlitePool,
}

impl NativeDatabase {
    /// Bootstrap the database file for the configured platform and open it.
    pub async fn open(config: &NativeConfig) -> DbResult<Self> {
        let policy = BootstrapPolicy::for_config(config);
        let path = policy.resolve().await?;

        let options = SqliteConnectOptions::new()
            .filename(&path)
            .foreign_keys(true);

        // One logical connection per adapter; no pooling beyond that.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| DbError::initialization(e.to_string()))?;

        info!(
            platform = %config.platform,
            path = %path.display(),
            "Opened native database"
        );

        Ok(Self { pool })
    }

    /// Execute a single statement and normalize the driver result.
    ///
    /// Never returns an error: driver failures are absorbed into the
    /// response so callers can branch on `error` without handling a
    /// rejection.
    pub async fn execute_query(&self, sql: &str, params: &[SqlParam]) -> DatabaseResponse {
        debug!(sql = %sql, params = params.len(), "Executing query");
        match self.run_statement(sql, params).await {
            Ok(raw) => normalizer::normalize(raw),
            Err(e) => {
                warn!(sql = %sql, error = %e, "Query failed");
                DatabaseResponse::failure(&e)
            }
        }
    }

    /// Execute one or more DDL statements. Re-running the same script must
    /// not fail, provided the script uses `CREATE ... IF NOT EXISTS`.
    ///
    /// The script is handed to the driver's native multi-statement
    /// execution, so statement boundaries are determined by the SQL
    /// tokenizer rather than by splitting on `;`.
    pub async fn initialize_schema(&self, sql: &str) -> DbResult<()> {
        debug!("Applying schema script");
        sqlx::raw_sql(sql)
            .execute(&self.pool)
            .await
            .map_err(|e| DbError::schema(e.to_string()))?;
        info!("Schema initialization complete");
        Ok(())
    }

    /// Execute all statements as one atomic unit, in input order.
    ///
    /// Any statement failure rolls back the whole transaction and
    /// propagates; no partial response list is returned.
    pub async fn execute_transaction(
        &self,
        statements: &[SqlStatement],
    ) -> DbResult<Vec<DatabaseResponse>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::transaction(e.to_string(), 0))?;

        debug!(statements = statements.len(), "Transaction started");

        let mut responses = Vec::with_capacity(statements.len());
        for (index, stmt) in statements.iter().enumerate() {
            let raw = match run_on(&mut tx, &stmt.sql, &stmt.params).await {
                Ok(raw) => raw,
                Err(e) => {
                    warn!(index, sql = %stmt.sql, error = %e, "Transaction statement failed, rolling back");
                    tx.rollback()
                        .await
                        .map_err(|re| DbError::transaction(re.to_string(), index))?;
                    return Err(e.into_transaction(index));
                }
            };
            responses.push(normalizer::normalize(raw));
        }

        tx.commit()
            .await
            .map_err(|e| DbError::transaction(e.to_string(), statements.len()))?;

        debug!(statements = statements.len(), "Transaction committed");
        Ok(responses)
    }

    /// Close the underlying connection. Used on factory reset.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn run_statement(&self, sql: &str, params: &[SqlParam]) -> DbResult<RawResult> {
        let mut conn = self.pool.acquire().await.map_err(DbError::from)?;
        run_on(&mut conn, sql, params).await
    }
}

/// Execute one statement on an open connection and collect the driver's
/// raw output. The prepared statement's column set is the driver's own
/// read/write signal: statements that produce columns take the row path
/// (this includes `INSERT ... RETURNING`, where the row interpretation
/// wins), everything else the mutation path.
async fn run_on(
    conn: &mut SqliteConnection,
    sql: &str,
    params: &[SqlParam],
) -> DbResult<RawResult> {
    let described = (&mut *conn).describe(sql).await.map_err(DbError::from)?;

    let mut query = sqlx::query(sql);
    for param in params {
        query = bind_param(query, param);
    }

    if described.columns.is_empty() {
        let outcome = query.execute(&mut *conn).await.map_err(DbError::from)?;
        Ok(RawResult {
            rows: Vec::new(),
            changes: outcome.rows_affected(),
            last_insert_id: Some(outcome.last_insert_rowid()),
        })
    } else {
        let rows = query.fetch_all(&mut *conn).await.map_err(DbError::from)?;
        Ok(RawResult {
            rows: rows.iter().map(row_to_map).collect(),
            changes: 0,
            last_insert_id: None,
        })
    }
}

/// Bind a parameter to a SQLite query.
fn bind_param<'q>(
    query: sqlx::query::Query<'q, sqlx::Sqlite, SqliteArguments<'q>>,
    param: &'q SqlParam,
) -> sqlx::query::Query<'q, sqlx::Sqlite, SqliteArguments<'q>> {
    match param {
        SqlParam::Null => query.bind(None::<String>),
        SqlParam::Bool(v) => query.bind(*v),
        SqlParam::Int(v) => query.bind(*v),
        SqlParam::Float(v) => query.bind(*v),
        SqlParam::Text(v) => query.bind(v.as_str()),
        SqlParam::Blob(v) => query.bind(v.as_slice()),
    }
}

/// Decode a row into a column-name-keyed JSON map.
fn row_to_map(row: &SqliteRow) -> Map<String, JsonValue> {
    row.columns()
        .iter()
        .enumerate()
        .map(|(idx, col)| {
            let value = decode_column(row, idx, col.type_info().name());
            (col.name().to_string(), value)
        })
        .collect()
}

/// Decode a single column by its SQLite storage class.
fn decode_column(row: &SqliteRow, idx: usize, type_name: &str) -> JsonValue {
    let upper = type_name.to_uppercase();

    if upper.contains("INT") {
        return match row.try_get::<Option<i64>, _>(idx) {
            Ok(Some(v)) => JsonValue::Number(v.into()),
            _ => JsonValue::Null,
        };
    }

    if upper.contains("REAL")
        || upper.contains("FLOA")
        || upper.contains("DOUB")
        || upper.contains("NUMERIC")
        || upper.contains("DECIMAL")
    {
        return match row.try_get::<Option<f64>, _>(idx) {
            Ok(Some(v)) => serde_json::Number::from_f64(v)
                .map(JsonValue::Number)
                .unwrap_or_else(|| JsonValue::String(v.to_string())),
            _ => JsonValue::Null,
        };
    }

    if upper.contains("BOOL") {
        return row
            .try_get::<Option<bool>, _>(idx)
            .ok()
            .flatten()
            .map(JsonValue::Bool)
            .unwrap_or(JsonValue::Null);
    }

    if upper.contains("BLOB") || upper.contains("BINARY") {
        use base64::{Engine as _, engine::general_purpose::STANDARD};
        return row
            .try_get::<Option<Vec<u8>>, _>(idx)
            .ok()
            .flatten()
            .map(|v| JsonValue::String(STANDARD.encode(v)))
            .unwrap_or(JsonValue::Null);
    }

    row.try_get::<Option<String>, _>(idx)
        .ok()
        .flatten()
        .map(JsonValue::String)
        .unwrap_or(JsonValue::Null)
}
