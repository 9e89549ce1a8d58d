//! Taxonomy service: the single writer for category structure.
//!
//! Owns the path invariant (every path equals the parent's path plus the
//! parent's id) and gates acyclicity and child-blocking deletes. All
//! structural mutations serialize on one async mutex per service so
//! concurrent reparents cannot interleave and corrupt paths.

use std::sync::Arc;
use std::time::{Duration, Instant};

use sqlx::{Pool, Postgres};
use tracing::{debug, info, instrument, warn};

use taxon_core::{
    aggregate_ttl_from_env, build_navigation, build_tree, AggregateCache, Category, CategoryPath,
    CategoryRepository, CreateCategoryRequest, Error, Result, TreeNode, UpdateCategoryRequest,
    NAVIGATION_CACHE_KEY, ROOT_PARENT_ID,
};

use crate::categories::PgCategoryRepository;

/// Path maintainer and tree reader over the category store.
pub struct TaxonomyService {
    categories: PgCategoryRepository,
    pool: Pool<Postgres>,
    cache: Arc<dyn AggregateCache>,
    /// Serializes create/reparent/delete so path repair never races.
    write_lock: tokio::sync::Mutex<()>,
    ttl: Duration,
}

impl TaxonomyService {
    /// Create a service over the given pool and aggregate cache. The
    /// navigation TTL comes from `REDIS_CACHE_TTL` when set.
    pub fn new(pool: Pool<Postgres>, cache: Arc<dyn AggregateCache>) -> Self {
        Self {
            categories: PgCategoryRepository::new(pool.clone()),
            pool,
            cache,
            write_lock: tokio::sync::Mutex::new(()),
            ttl: aggregate_ttl_from_env(),
        }
    }

    /// Override the navigation cache TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// The underlying category store.
    pub fn categories(&self) -> &PgCategoryRepository {
        &self.categories
    }

    /// Create a category under the requested parent (default root).
    ///
    /// The materialized path is computed here, never caller-supplied:
    /// `path = parent.path + "," + parent.id`, or the root sentinel for
    /// top-level categories.
    #[instrument(skip(self, req), fields(subsystem = "taxonomy", op = "create"))]
    pub async fn create(&self, req: CreateCategoryRequest) -> Result<Category> {
        if req.title.trim().is_empty() {
            return Err(Error::InvalidInput("category title is required".into()));
        }

        let _guard = self.write_lock.lock().await;

        if let Some(slug) = req.slug.as_deref() {
            if self.categories.slug_in_use(slug, None).await? {
                return Err(Error::DuplicateSlug(slug.to_string()));
            }
        }

        let parent_id = req.resolved_parent_id();
        let path = if parent_id == ROOT_PARENT_ID {
            CategoryPath::root()
        } else {
            let parent = self
                .categories
                .get(parent_id)
                .await?
                .ok_or(Error::InvalidReference(parent_id))?;
            CategoryPath::child_of(&parent.path, parent.id)
        };

        let category = self.categories.insert(&req, parent_id, &path).await?;

        info!(
            category_id = category.id,
            parent_id,
            path = %category.path,
            "Category created"
        );
        self.invalidate_navigation().await;
        Ok(category)
    }

    /// Move a category under a new parent and repair the whole subtree.
    ///
    /// Validation (no writes): self-parenting and parenting under a
    /// descendant fail with `CycleDetected`; a missing parent fails with
    /// `InvalidReference`. The node's own path is committed before any
    /// descendant is recomputed from it, and the full repair runs in one
    /// transaction so no reader observes a half-repaired subtree.
    #[instrument(skip(self), fields(subsystem = "taxonomy", op = "reparent"))]
    pub async fn reparent(&self, id: i64, new_parent_id: i64) -> Result<()> {
        let new_parent_id = if new_parent_id > 0 {
            new_parent_id
        } else {
            ROOT_PARENT_ID
        };

        if new_parent_id == id {
            return Err(Error::CycleDetected {
                id,
                parent_id: new_parent_id,
            });
        }

        let _guard = self.write_lock.lock().await;

        let node = self
            .categories
            .get(id)
            .await?
            .ok_or(Error::CategoryNotFound(id))?;

        let new_path = if new_parent_id == ROOT_PARENT_ID {
            CategoryPath::root()
        } else {
            let parent = self
                .categories
                .get(new_parent_id)
                .await?
                .ok_or(Error::InvalidReference(new_parent_id))?;
            // The new parent must not live inside the moving subtree.
            if parent.path.contains_segment(id) {
                return Err(Error::CycleDetected {
                    id,
                    parent_id: new_parent_id,
                });
            }
            CategoryPath::child_of(&parent.path, parent.id)
        };

        let start = Instant::now();
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        self.categories
            .set_parent_tx(&mut tx, id, new_parent_id, &new_path)
            .await?;

        // Repair every descendant exactly once, each strictly after its
        // parent: a worklist of (id, already-repaired path) pairs instead
        // of recursion, so a corrupted graph cannot loop.
        let mut repaired: u64 = 0;
        let mut stack: Vec<(i64, CategoryPath)> = vec![(id, new_path)];
        while let Some((parent_id, parent_path)) = stack.pop() {
            for child_id in self.categories.child_ids_tx(&mut tx, parent_id).await? {
                let child_path = CategoryPath::child_of(&parent_path, parent_id);
                self.categories
                    .set_path_tx(&mut tx, child_id, &child_path)
                    .await?;
                repaired += 1;
                stack.push((child_id, child_path));
            }
        }

        tx.commit().await.map_err(Error::Database)?;

        info!(
            category_id = id,
            parent_id = new_parent_id,
            old_parent_id = node.parent_id,
            row_count = repaired,
            duration_ms = start.elapsed().as_millis() as u64,
            "Category reparented"
        );
        self.invalidate_navigation().await;
        Ok(())
    }

    /// Patch a category's display data (title, slug, ordering, visibility,
    /// presentation hints). Parent changes go through [`Self::reparent`].
    #[instrument(skip(self, patch), fields(subsystem = "taxonomy", op = "update"))]
    pub async fn update(&self, id: i64, patch: UpdateCategoryRequest) -> Result<Category> {
        let mut category = self
            .categories
            .get(id)
            .await?
            .ok_or(Error::CategoryNotFound(id))?;

        if patch.is_empty() {
            return Ok(category);
        }

        if let Some(Some(slug)) = &patch.slug {
            if self.categories.slug_in_use(slug, Some(id)).await? {
                return Err(Error::DuplicateSlug(slug.clone()));
            }
        }

        if let Some(title) = patch.title {
            if title.trim().is_empty() {
                return Err(Error::InvalidInput("category title is required".into()));
            }
            category.title = title;
        }
        if let Some(slug) = patch.slug {
            category.slug = slug;
        }
        if let Some(sort_order) = patch.sort_order {
            category.sort_order = sort_order;
        }
        if let Some(visible) = patch.visible {
            category.visible = visible;
        }
        if let Some(content_model) = patch.content_model {
            category.content_model = content_model;
        }
        if let Some(keywords) = patch.keywords {
            category.keywords = keywords;
        }
        if let Some(description) = patch.description {
            category.description = description;
        }
        if let Some(list_template) = patch.list_template {
            category.list_template = list_template;
        }
        if let Some(detail_template) = patch.detail_template {
            category.detail_template = detail_template;
        }
        if let Some(page_size) = patch.page_size {
            category.page_size = page_size;
        }

        self.categories.update_display(&category).await?;
        self.invalidate_navigation().await;
        Ok(category)
    }

    /// Delete a childless category. Articles referencing it keep their
    /// dangling category ids; cleanup is deliberately not cascaded.
    #[instrument(skip(self), fields(subsystem = "taxonomy", op = "delete"))]
    pub async fn delete(&self, id: i64) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        if self.categories.count_children(id).await? > 0 {
            return Err(Error::HasChildren(id));
        }
        self.categories.delete(id).await?;

        info!(category_id = id, "Category deleted");
        self.invalidate_navigation().await;
        Ok(())
    }

    /// Full forest for admin views: every category, visible or not,
    /// rooted at `root_parent_id`.
    pub async fn tree(&self, root_parent_id: i64) -> Result<Vec<TreeNode<Category>>> {
        let all = self.categories.list_all().await?;
        Ok(build_tree(all, root_parent_id))
    }

    /// Breadcrumb chain for a category: its ancestors root-first, resolved
    /// from the materialized path, then the category itself.
    pub async fn breadcrumbs(&self, id: i64) -> Result<Vec<Category>> {
        let category = self
            .categories
            .get(id)
            .await?
            .ok_or(Error::CategoryNotFound(id))?;

        let mut chain = Vec::new();
        for ancestor_id in category.path.segments() {
            if ancestor_id == ROOT_PARENT_ID {
                continue;
            }
            // A missing ancestor means a stale path; surface it rather
            // than returning a silently truncated trail.
            let ancestor = self
                .categories
                .get(ancestor_id)
                .await?
                .ok_or(Error::CategoryNotFound(ancestor_id))?;
            chain.push(ancestor);
        }
        chain.push(category);
        Ok(chain)
    }

    /// Public navigation tree: visible categories only, served read-through
    /// from the aggregate cache. Cache trouble never fails the call; it
    /// only forces a recompute.
    pub async fn navigation(&self) -> Result<Vec<TreeNode<Category>>> {
        if let Some(cached) = self.cache.get(NAVIGATION_CACHE_KEY).await {
            match serde_json::from_value(cached) {
                Ok(tree) => return Ok(tree),
                Err(e) => {
                    warn!(cache_key = NAVIGATION_CACHE_KEY, "Stale cache shape, recomputing: {}", e);
                }
            }
        }

        let start = Instant::now();
        let all = self.categories.list_all().await?;
        let tree = build_navigation(all);

        match serde_json::to_value(&tree) {
            Ok(value) => {
                self.cache.put(NAVIGATION_CACHE_KEY, &value, self.ttl).await;
            }
            Err(e) => warn!("Navigation tree not cacheable: {}", e),
        }

        debug!(
            cache_key = NAVIGATION_CACHE_KEY,
            duration_ms = start.elapsed().as_millis() as u64,
            "Navigation tree rebuilt"
        );
        Ok(tree)
    }

    async fn invalidate_navigation(&self) {
        if !self.cache.invalidate(NAVIGATION_CACHE_KEY).await {
            debug!(
                cache_key = NAVIGATION_CACHE_KEY,
                "Navigation invalidation was a no-op"
            );
        }
    }
}
