//! Database abstraction layer.
//!
//! This module provides the uniform access layer the rest of the
//! application talks to:
//! - A contract of three operations (`execute_query`, `initialize_schema`,
//!   `execute_transaction`) implemented identically by every adapter
//! - One adapter per execution environment (native production, in-memory
//!   test)
//! - Result normalization into a single response shape
//! - The factory that lazily constructs and shares one adapter

pub mod bootstrap;
pub mod factory;
pub mod memory;
pub mod native;
pub mod normalizer;
pub mod schema;

pub use factory::DatabaseFactory;
pub use memory::MemoryDatabase;
pub use native::NativeDatabase;
pub use schema::{SchemaDefinition, generate_schema_sql, initialize_database, schema_definitions};

use crate::config::DatabaseConfig;
use crate::error::DbResult;
use crate::models::{DatabaseResponse, SqlParam, SqlStatement};

/// A concrete database implementation bound to one execution environment.
///
/// All contract calls dispatch to the adapter variant; callers never see
/// which driver is underneath.
pub enum Database {
    Native(NativeDatabase),
    Memory(MemoryDatabase),
}

impl Database {
    /// Construct the adapter selected by the configuration.
    pub async fn open(config: &DatabaseConfig) -> DbResult<Self> {
        match config {
            DatabaseConfig::Native(native) => {
                Ok(Self::Native(NativeDatabase::open(native).await?))
            }
            DatabaseConfig::InMemory => Ok(Self::Memory(MemoryDatabase::in_memory()?)),
            DatabaseConfig::File { path, read_only } => {
                Ok(Self::Memory(MemoryDatabase::open_file(path, *read_only)?))
            }
        }
    }

    /// Execute a SQL statement and return the normalized response.
    /// Driver errors come back inside the response, never as `Err`.
    pub async fn execute_query(&self, sql: &str, params: &[SqlParam]) -> DatabaseResponse {
        match self {
            Self::Native(db) => db.execute_query(sql, params).await,
            Self::Memory(db) => db.execute_query(sql, params).await,
        }
    }

    /// Apply a DDL script. Idempotent for `CREATE ... IF NOT EXISTS`
    /// scripts; propagates on malformed SQL.
    pub async fn initialize_schema(&self, sql: &str) -> DbResult<()> {
        match self {
            Self::Native(db) => db.initialize_schema(sql).await,
            Self::Memory(db) => db.initialize_schema(sql).await,
        }
    }

    /// Execute statements as one atomic unit, in input order, producing
    /// one response per statement. Any failure rolls everything back and
    /// propagates.
    pub async fn execute_transaction(
        &self,
        statements: &[SqlStatement],
    ) -> DbResult<Vec<DatabaseResponse>> {
        match self {
            Self::Native(db) => db.execute_transaction(statements).await,
            Self::Memory(db) => db.execute_transaction(statements).await,
        }
    }

    /// Close the underlying connection.
    pub async fn close(&self) {
        match self {
            Self::Native(db) => db.close().await,
            Self::Memory(db) => db.close().await,
        }
    }
}
