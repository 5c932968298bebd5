//! Database module for the journal's SQLite store
//!
//! This module provides connection pooling, configuration, embedded schema
//! migrations, and health checks. The pool built here is the only store
//! handle the services use; it is constructed once and passed around
//! explicitly.

use crate::error::{DatabaseError, DatabaseResult};
use serde::Deserialize;
use sqlx::{
    SqlitePool,
    migrate::Migrator,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::{str::FromStr, time::Duration};
use tracing::{error, info};

/// Schema migrations shipped with this crate
pub static MIGRATOR: Migrator = sqlx::migrate!();

/// Database configuration struct
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite connection URL, e.g. `sqlite://journal.db` or `sqlite::memory:`
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of connections in the pool
    pub min_connections: u32,
    /// Connection acquire timeout in seconds
    pub connection_timeout: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://journal.db".to_string(),
            max_connections: 10,
            min_connections: 1,
            connection_timeout: 30,
        }
    }
}

impl DatabaseConfig {
    /// Configuration for a private, process-lifetime in-memory database
    pub fn in_memory() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            ..Self::default()
        }
    }

    /// Whether the URL points at an in-memory database
    pub fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:") || self.url.contains("mode=memory")
    }

    fn validate(&self) -> DatabaseResult<()> {
        if self.max_connections == 0 {
            return Err(DatabaseError::Configuration(
                "max_connections must be at least 1".to_string(),
            ));
        }
        if self.min_connections > self.max_connections {
            return Err(DatabaseError::Configuration(format!(
                "min_connections ({}) exceeds max_connections ({})",
                self.min_connections, self.max_connections
            )));
        }
        Ok(())
    }
}

/// Initialize a SQLite connection pool
///
/// In-memory URLs are pinned to one connection that never idles out: every
/// new connection to `:memory:` would otherwise see a fresh, empty database.
pub async fn init_pool(config: &DatabaseConfig) -> DatabaseResult<SqlitePool> {
    info!("Initializing database connection pool");
    config.validate()?;

    let options = SqliteConnectOptions::from_str(&config.url)
        .map_err(|e| DatabaseError::Configuration(format!("Invalid database URL: {}", e)))?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool_options =
        SqlitePoolOptions::new().acquire_timeout(Duration::from_secs(config.connection_timeout));

    let pool_options = if config.is_in_memory() {
        pool_options
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        pool_options
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
    };

    let pool = pool_options
        .connect_with(options)
        .await
        .map_err(DatabaseError::Connection)?;

    info!("Database connection pool initialized successfully");
    Ok(pool)
}

/// Open a migrated in-memory database, mostly for tests and throwaway runs
pub async fn init_memory_pool() -> DatabaseResult<SqlitePool> {
    let pool = init_pool(&DatabaseConfig::in_memory()).await?;
    run_migrations(&pool).await?;
    Ok(pool)
}

/// Apply the embedded schema migrations
pub async fn run_migrations(pool: &SqlitePool) -> DatabaseResult<()> {
    MIGRATOR.run(pool).await?;
    info!("Database schema is up to date");
    Ok(())
}

/// Check database connectivity
///
/// Returns `Ok(false)` when the `SELECT 1` check fails so callers can decide
/// whether an unreachable store is fatal.
pub async fn health_check(pool: &SqlitePool) -> DatabaseResult<bool> {
    match sqlx::query("SELECT 1").fetch_one(pool).await {
        Ok(_) => Ok(true),
        Err(e) => {
            error!("Database health check failed: {}", e);
            Ok(false)
        }
    }
}
