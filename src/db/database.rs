//! Database connection management
//!
//! This module provides Diesel-based SQLite connectivity with connection pooling.

use diesel::connection::SimpleConnection;
use diesel::r2d2::{self, ConnectionManager, CustomizeConnection};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::MigrationHarness;
use std::sync::Arc;
use std::time::Duration;

use super::error::DbError;
use super::session::MIGRATIONS;

pub type DbConnection = SqliteConnection;
pub type Pool = r2d2::Pool<ConnectionManager<DbConnection>>;
pub type PooledConnection = r2d2::PooledConnection<ConnectionManager<DbConnection>>;

/// Pragmas applied to every connection handed out by the pool.
#[derive(Debug, Clone, Copy)]
struct ConnectionOptions {
    busy_timeout_ms: u64,
}

impl CustomizeConnection<DbConnection, r2d2::Error> for ConnectionOptions {
    fn on_acquire(&self, conn: &mut DbConnection) -> Result<(), r2d2::Error> {
        conn.batch_execute(&format!(
            "PRAGMA foreign_keys = ON; PRAGMA busy_timeout = {};",
            self.busy_timeout_ms
        ))
        .map_err(r2d2::Error::QueryError)
    }
}

/// Database connection pool manager
pub struct Database {
    pool: Arc<Pool>,
}

impl Database {
    /// Create a new database connection pool
    ///
    /// # Arguments
    /// * `database_url` - SQLite path or `:memory:`
    ///
    /// # Example
    /// ```ignore
    /// let db = Database::new("entities.db")?;
    /// db.run_migrations()?;
    /// let mut conn = db.get_connection()?;
    /// ```
    pub fn new(database_url: &str) -> Result<Self, DbError> {
        Self::new_with_config(database_url, DatabaseConfig::default())
    }

    /// Create a new database with custom configuration
    pub fn new_with_config(database_url: &str, config: DatabaseConfig) -> Result<Self, DbError> {
        let manager = ConnectionManager::<DbConnection>::new(database_url);

        let pool = r2d2::Pool::builder()
            .max_size(config.max_connections)
            .min_idle(Some(config.min_idle))
            .connection_timeout(Duration::from_secs(config.connection_timeout_secs))
            .idle_timeout(config.idle_timeout_secs.map(Duration::from_secs))
            .max_lifetime(config.max_lifetime_secs.map(Duration::from_secs))
            .connection_customizer(Box::new(ConnectionOptions {
                busy_timeout_ms: config.busy_timeout_ms,
            }))
            .build(manager)?;

        tracing::debug!(
            "Opened connection pool for {} (max {} connections)",
            database_url,
            config.max_connections
        );

        Ok(Database {
            pool: Arc::new(pool),
        })
    }

    /// Get a connection from the pool
    pub fn get_connection(&self) -> Result<PooledConnection, DbError> {
        Ok(self.pool.get()?)
    }

    /// Apply any pending schema migrations.
    pub fn run_migrations(&self) -> Result<usize, DbError> {
        let mut conn = self.get_connection()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| DbError::Migration(e.to_string()))?;
        if !applied.is_empty() {
            tracing::info!("Applied {} migration(s)", applied.len());
        }
        Ok(applied.len())
    }

    /// Test database connectivity
    pub fn test_connection(&self) -> Result<(), DbError> {
        let mut conn = self.get_connection()?;
        conn.batch_execute("SELECT 1")?;
        Ok(())
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &Pool {
        &self.pool
    }
}

/// Database configuration options
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub min_idle: u32,
    pub connection_timeout_secs: u64,
    pub idle_timeout_secs: Option<u64>,
    pub max_lifetime_secs: Option<u64>,
    pub busy_timeout_ms: u64,
}

impl DatabaseConfig {
    /// A single long-lived connection. Every SQLite `:memory:` connection is a
    /// separate database, so the pool must never open a second one or recycle
    /// the first.
    pub fn in_memory() -> Self {
        DatabaseConfig {
            max_connections: 1,
            min_idle: 1,
            idle_timeout_secs: None,
            max_lifetime_secs: None,
            ..Self::default()
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig {
            max_connections: 8,            // SQLite serializes writers anyway
            min_idle: 1,                   // Keep one connection warm
            connection_timeout_secs: 30,   // Wait up to 30s for connection
            idle_timeout_secs: Some(600),  // Close idle connections after 10 min
            max_lifetime_secs: Some(1800), // Recycle connections after 30 min
            busy_timeout_ms: 5000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::countries;
    use diesel::prelude::*;

    #[test]
    fn test_in_memory_pool_keeps_schema() {
        let db = Database::new_with_config(":memory:", DatabaseConfig::in_memory()).unwrap();
        assert_eq!(db.run_migrations().unwrap(), 1);
        db.test_connection().unwrap();

        let mut conn = db.get_connection().unwrap();
        let count: i64 = countries::table.count().get_result(&mut conn).unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_file_database_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("entities.db");
        let url = path.to_string_lossy().to_string();

        let db = Database::new(&url).unwrap();
        db.run_migrations().unwrap();
        // second run finds nothing pending
        assert_eq!(db.run_migrations().unwrap(), 0);
    }
}
