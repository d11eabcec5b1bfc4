//! # quill-db
//!
//! Note storage for quill.
//!
//! This crate provides:
//! - PostgreSQL connection pool management
//! - [`PgNoteRepository`], the production note store
//! - [`MemoryNoteRepository`], an in-process store for tests and local runs
//!
//! ## Example
//!
//! ```rust,ignore
//! use quill_db::{CreateNoteRequest, Database};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/quill").await?;
//!     db.migrate().await?;
//!
//!     let note = db.notes.insert(CreateNoteRequest {
//!         owner_id: uuid::Uuid::new_v4(),
//!         title: "Hello".to_string(),
//!         content: "Hello, world!".to_string(),
//!     }).await?;
//!
//!     println!("Created note: {}", note.id);
//!     Ok(())
//! }
//! ```
pub mod memory;
pub mod notes;
pub mod pool;
pub mod test_fixtures;

use std::sync::Arc;

// Re-export core types
pub use quill_core::*;

pub use memory::MemoryNoteRepository;
pub use notes::PgNoteRepository;
pub use pool::{create_pool, PoolConfig};

/// Storage facade handed to the API layer.
#[derive(Clone)]
pub struct Database {
    /// Connection pool, absent for the in-memory backend.
    pool: Option<sqlx::Pool<sqlx::Postgres>>,
    /// Note repository for CRUD operations.
    pub notes: Arc<dyn NoteRepository>,
}

impl Database {
    /// Connect to PostgreSQL with default pool settings.
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_config(url, PoolConfig::from_env()).await
    }

    /// Connect to PostgreSQL with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool(url, config).await?;
        Ok(Self {
            notes: Arc::new(PgNoteRepository::new(pool.clone())),
            pool: Some(pool),
        })
    }

    /// Non-persistent storage backed by [`MemoryNoteRepository`].
    pub fn in_memory() -> Self {
        Self::with_notes(Arc::new(MemoryNoteRepository::new()))
    }

    /// Wrap an arbitrary note repository.
    pub fn with_notes(notes: Arc<dyn NoteRepository>) -> Self {
        Self { pool: None, notes }
    }

    /// Whether this database is backed by PostgreSQL.
    pub fn is_persistent(&self) -> bool {
        self.pool.is_some()
    }

    /// Run pending migrations. A no-op for the in-memory backend.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        if let Some(pool) = &self.pool {
            sqlx::migrate!("../../migrations")
                .run(pool)
                .await
                .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        }
        Ok(())
    }

    /// Get the underlying connection pool, if any.
    pub fn pool(&self) -> Option<&sqlx::Pool<sqlx::Postgres>> {
        self.pool.as_ref()
    }
}
