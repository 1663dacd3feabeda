//! Diesel ORM runtime infrastructure
//!
//! A pooled [`Database`] for long-running callers plus single-connection
//! session helpers used by tools and tests.

pub mod database;
pub mod error;
pub mod operations;
pub mod session;

// Re-export key types
pub use database::{Database, DatabaseConfig, DbConnection, Pool, PooledConnection};
pub use error::DbError;
pub use operations::GetOrCreate;
pub use session::{
    clear_tables, drop_tables, establish, make_session, make_session_with, MIGRATIONS,
};
