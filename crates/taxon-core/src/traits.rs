//! Repository and cache trait definitions.
//!
//! These traits are the seams between the taxonomy engine and its
//! collaborators: the relational store implements the repositories, the
//! cache backend implements [`AggregateCache`]. Tests substitute in-memory
//! implementations.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Article, Category, CreateCategoryRequest, UpdateCategoryRequest};

/// Durable storage and point lookups for categories (the Category Store).
///
/// Holds no taxonomy invariants itself; the taxonomy service is the only
/// writer permitted to set `path`.
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Get a category by id.
    async fn get(&self, id: i64) -> Result<Option<Category>>;

    /// Get a category by its unique slug.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>>;

    /// Direct children of `parent_id`, ordered by sort_order DESC, id DESC.
    async fn list_children(&self, parent_id: i64) -> Result<Vec<Category>>;

    /// Every category, ordered by sort_order DESC, id DESC. Basis for
    /// full-tree construction.
    async fn list_all(&self) -> Result<Vec<Category>>;
}

/// Content lookups driven by category membership (the resolver's query
/// side).
#[async_trait]
pub trait ArticleQueryRepository: Send + Sync {
    /// Get an article by id.
    async fn get(&self, id: i64) -> Result<Option<Article>>;

    /// Ids of every category in the subtree below `category_id`, excluding
    /// `category_id` itself.
    async fn descendant_ids(&self, category_id: i64) -> Result<Vec<i64>>;

    /// Articles belonging to a category: primary membership expands to the
    /// subtree when `include_descendants` is set, secondary membership is
    /// exact-match only.
    async fn list_in_category(
        &self,
        category_id: i64,
        include_descendants: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Article>>;
}

/// Named-aggregate cache with explicit invalidation (read-through contract).
///
/// Implementations must degrade, never fail: a read error behaves like a
/// miss, a write error is logged and swallowed. The store below is always
/// the source of truth.
#[async_trait]
pub trait AggregateCache: Send + Sync {
    /// Fetch a cached aggregate; `None` on miss, expiry, or backend failure.
    async fn get(&self, name: &str) -> Option<serde_json::Value>;

    /// Store an aggregate under `name` for `ttl`. Returns false if the
    /// backend rejected the write (callers ignore this beyond logging).
    async fn put(&self, name: &str, value: &serde_json::Value, ttl: Duration) -> bool;

    /// Drop the named aggregate so the next read recomputes it.
    async fn invalidate(&self, name: &str) -> bool;
}
