//! # taxon-db
//!
//! PostgreSQL storage layer and taxonomy engine for the taxon CMS backend.
//!
//! This crate provides:
//! - Connection pool management
//! - The category store and the taxonomy service (materialized-path
//!   maintenance, cycle/deletion gates, tree reads)
//! - Article queries resolved through category subtrees
//! - Site configuration with read-through caching
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use taxon_cache::MemoryAggregateCache;
//! use taxon_db::{Database, TaxonomyService};
//! use taxon_core::CreateCategoryRequest;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/taxon").await?;
//!     let cache = Arc::new(MemoryAggregateCache::new());
//!     let taxonomy = TaxonomyService::new(db.pool().clone(), cache);
//!
//!     let news = taxonomy.create(CreateCategoryRequest::new("News")).await?;
//!     let local = taxonomy
//!         .create(CreateCategoryRequest::new("Local").under(news.id))
//!         .await?;
//!     assert_eq!(local.path.as_str(), format!("0,{}", news.id));
//!     Ok(())
//! }
//! ```

pub mod articles;
pub mod categories;
pub mod pool;
pub mod site_config;
pub mod taxonomy;

#[cfg(test)]
mod tests;

// Test fixtures for integration tests
// Note: Always compiled so integration tests can use DEFAULT_TEST_DATABASE_URL
pub mod test_fixtures;

// Re-export core types
pub use taxon_core::*;

// Re-export repository implementations
pub use articles::PgArticleRepository;
pub use categories::PgCategoryRepository;
pub use pool::{create_pool, create_pool_with_config, PoolConfig};
pub use site_config::PgSiteConfigRepository;
pub use taxonomy::TaxonomyService;

/// Combined database context with the taxonomy repositories.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Category store for point lookups and ordered scans.
    pub categories: PgCategoryRepository,
    /// Article repository for content-category resolution.
    pub articles: PgArticleRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            categories: PgCategoryRepository::new(pool.clone()),
            articles: PgArticleRepository::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
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
