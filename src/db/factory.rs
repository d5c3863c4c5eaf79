//! Lazy, shared construction of the configured adapter.
//!
//! The factory is a caller-held handle, constructed once from an explicit
//! configuration value and passed through application context. It builds
//! the adapter on first use and hands the same shared instance to every
//! caller, so the bootstrap cost is paid once and all callers share one
//! live connection.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::DatabaseConfig;
use crate::db::Database;
use crate::error::DbResult;

pub struct DatabaseFactory {
    config: DatabaseConfig,
    // Construction happens while this lock is held, so two concurrent
    // first callers cannot each build and leak a separate adapter.
    instance: Mutex<Option<Arc<Database>>>,
}

impl DatabaseFactory {
    /// Create a factory for the given configuration. No connection is
    /// opened until the first `get_database` call.
    pub fn new(config: DatabaseConfig) -> Self {
        Self {
            config,
            instance: Mutex::new(None),
        }
    }

    /// Get the shared database instance, constructing it on first use.
    ///
    /// Every call returns a clone of the same `Arc`; construction failures
    /// leave the slot empty so a later call can retry.
    pub async fn get_database(&self) -> DbResult<Arc<Database>> {
        let mut slot = self.instance.lock().await;
        if let Some(db) = slot.as_ref() {
            return Ok(Arc::clone(db));
        }

        info!("Constructing database instance");
        let db = Arc::new(Database::open(&self.config).await?);
        *slot = Some(Arc::clone(&db));
        Ok(db)
    }

    /// Drop the stored instance and close its connection, so the next
    /// `get_database` builds a fresh one. Test-isolation facility; safe to
    /// call when no instance exists.
    pub async fn reset_instance(&self) {
        let mut slot = self.instance.lock().await;
        if let Some(db) = slot.take() {
            debug!("Resetting database instance");
            db.close().await;
        }
    }
}
