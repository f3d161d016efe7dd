//! # lds-db
//!
//! Storage layer for the LDS file service.
//!
//! This crate provides:
//! - Connection pool management
//! - PostgreSQL metadata store (`file_meta` table, tag overlap search)
//! - Filesystem object store with atomic writes
//! - In-memory metadata and object stores for tests and local development
//!
//! ## Example
//!
//! ```rust,ignore
//! use lds_db::{Database, FilesystemBackend};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/lds").await?;
//!     db.migrate().await?;
//!
//!     let blobs = FilesystemBackend::new("/var/lib/lds/files");
//!     blobs.validate().await?;
//!     Ok(())
//! }
//! ```
pub mod file_storage;
pub mod memory;
pub mod metadata;
pub mod pool;

// Test fixtures for integration tests
// Note: Always compiled so integration tests (in tests/) can use DEFAULT_TEST_DATABASE_URL
pub mod test_fixtures;

// Re-export core types
pub use lds_core::*;

pub use file_storage::FilesystemBackend;
pub use memory::{MemoryMetadataStore, MemoryObjectStore};
pub use metadata::PgMetadataStore;
pub use pool::{create_pool_with_config, log_pool_metrics, PoolConfig};

/// Combined database context.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// File metadata store.
    pub files: PgMetadataStore,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            files: PgMetadataStore::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_config(url, PoolConfig::default()).await
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}
