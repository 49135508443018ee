// Storage layer for roadwatch
// Typed records, a generic repository over them, and transaction-scoped
// access to a pooled relational store

pub mod config;
pub mod error;
pub mod models;
pub mod repositories;
pub mod sql_file;
pub mod unit_of_work;
pub mod value;

// Re-export commonly used items
pub use chrono;
pub use sqlx;
pub use config::DatabaseConfig;
pub use error::{DatabaseError, DbResult};
pub use models::{Driver, Offense, Record, SpeedCamera, Violation};
pub use repositories::{
    CrudRepository, DriverRepository, OffenseRepository, RepositoryManager,
    SpeedCameraRepository, ViolationQueries, ViolationRepository,
};
pub use sql_file::SqlFileExecutor;
pub use value::{RowAccess, RowMap, SqlValue};

use futures::future::BoxFuture;
use sqlx::any::AnyPoolOptions;
use sqlx::{AnyConnection, AnyPool};
use sqlx::pool::PoolConnection;
use sqlx::Any;
use std::time::Duration;
use tracing::info;

/// Connection manager: a bounded pool shared by every repository.
///
/// Cloning is cheap; all clones hand out connections from the same pool.
#[derive(Clone)]
pub struct Database {
    pool: AnyPool,
}

impl Database {
    /// Builds the pool from configuration and opens one connection to
    /// verify the store is reachable.
    pub async fn new(config: &DatabaseConfig) -> DbResult<Self> {
        sqlx::any::install_default_drivers();

        if config.pool_size == 0 {
            return Err(DatabaseError::configuration(
                "DB_POOL_SIZE must be at least 1",
            ));
        }
        let url = config.connection_url()?;

        let pool = AnyPoolOptions::new()
            .max_connections(config.pool_size)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds))
            .connect(&url)
            .await
            .map_err(DatabaseError::Connection)?;

        info!(
            url = %config.redacted_url(),
            pool_size = config.pool_size,
            "Database pool ready"
        );

        Ok(Self { pool })
    }

    /// Wraps an already-built pool.
    pub fn from_pool(pool: AnyPool) -> Self {
        Self { pool }
    }

    /// Get the underlying connection pool
    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    /// Checks a connection out of the pool. Fails with
    /// [`DatabaseError::Connection`] when the pool stays exhausted past the
    /// acquire timeout or the store cannot be reached.
    pub async fn acquire(&self) -> DbResult<PoolConnection<Any>> {
        self.pool.acquire().await.map_err(DatabaseError::Connection)
    }

    /// Runs `operation` in its own unit of work; see [`unit_of_work::run`].
    pub async fn transaction<T, F>(&self, operation: F) -> DbResult<T>
    where
        T: Send,
        F: for<'c> FnOnce(&'c mut AnyConnection) -> BoxFuture<'c, DbResult<T>> + Send,
    {
        unit_of_work::run(&self.pool, None, operation).await
    }

    pub fn repositories(&self) -> RepositoryManager {
        RepositoryManager::new(self.clone())
    }

    /// Closes the pool, waiting for checked-out connections to come back.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
