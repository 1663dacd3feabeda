use thiserror::Error;

/// Errors raised while opening, migrating or clearing a database.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Database pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),

    #[error("Connection error: {0}")]
    Connection(#[from] diesel::ConnectionError),

    #[error("Query error: {0}")]
    Query(#[from] diesel::result::Error),

    #[error("Migration error: {0}")]
    Migration(String),
}
