//! # Tasklane DB
//!
//! Credential store for the Tasklane API.
//!
//! The auth service never talks to a database directly. It depends on three
//! narrow capability traits, each implemented by every backend:
//!
//! - [`UserSaver`]: create users
//! - [`UserProvider`]: look users up by login or id
//! - [`SessionStore`]: create, rotate and delete sessions
//!
//! Two backends are provided:
//!
//! - [`SqliteStore`]: SQLx over SQLite, used by the server and the CLI
//! - [`MemoryStore`]: a mutex-guarded map with the same semantics
//!
//! # Example
//!
//! ```ignore
//! use tasklane_config::DatabaseConfig;
//! use tasklane_db::{SqliteStore, init_db_pool, run_migrations};
//!
//! let pool = init_db_pool(&DatabaseConfig::from_env()?).await?;
//! run_migrations(&pool).await?;
//! let store = SqliteStore::new(pool);
//! ```

pub mod memory;
pub mod sqlite;
pub mod store;

use sqlx::sqlite::SqlitePoolOptions;
use tasklane_config::DatabaseConfig;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use store::{SessionStore, StoreError, StoreFuture, UserProvider, UserSaver};

// Re-export SqlitePool for convenience
pub use sqlx::SqlitePool;

/// Opens a SQLite connection pool sized by `config`.
///
/// The database file is created when the URL carries `mode=rwc`.
pub async fn init_db_pool(config: &DatabaseConfig) -> Result<SqlitePool, sqlx::Error> {
    SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect(&config.url)
        .await
}

/// Applies the embedded schema migrations.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../migrations").run(pool).await
}

/// Opens a single-connection in-memory database with the schema applied.
///
/// The connection is never recycled, otherwise SQLite would drop the data.
#[cfg(any(test, feature = "test-utils"))]
pub async fn init_memory_pool() -> anyhow::Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;
    run_migrations(&pool).await?;
    Ok(pool)
}
