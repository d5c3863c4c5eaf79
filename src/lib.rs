//! LoadMaster database layer.
//!
//! This library gives the load planning application one uniform way to talk
//! to SQLite across execution environments: a native adapter for devices
//! (sqlx) and an in-memory adapter for automated tests (rusqlite), both
//! behind the same three-operation contract and a lazily-constructing
//! factory.

pub mod config;
pub mod db;
pub mod error;
pub mod models;

pub use config::{DatabaseConfig, NativeConfig, Platform};
pub use db::{Database, DatabaseFactory, initialize_database};
pub use error::{DbError, DbResult};
pub use models::{DatabaseResponse, QueryResult, SqlParam, SqlStatement};
