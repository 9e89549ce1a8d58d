//! Category repository implementation (the Category Store).
//!
//! Point lookups and ordered scans over the `category` table. Structural
//! writes (anything touching `parent_id` or `path`) are only issued by the
//! taxonomy service, which is the sole writer allowed to set `path`.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row, Transaction};

use taxon_core::{
    Category, CategoryPath, CategoryRepository, CreateCategoryRequest, Error, Result,
};

/// PostgreSQL implementation of CategoryRepository.
#[derive(Clone)]
pub struct PgCategoryRepository {
    pool: Pool<Postgres>,
}

const CATEGORY_COLUMNS: &str = "id, title, slug, parent_id, path, sort_order, visible, \
     content_model, keywords, description, list_template, detail_template, page_size, created_at";

/// Map a `category` row into the core model, validating the stored path.
pub(crate) fn category_from_row(row: &PgRow) -> Result<Category> {
    let raw_path: String = row.try_get("path")?;
    Ok(Category {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        slug: row.try_get("slug")?,
        parent_id: row.try_get("parent_id")?,
        path: CategoryPath::parse(&raw_path)?,
        sort_order: row.try_get("sort_order")?,
        visible: row.try_get("visible")?,
        content_model: row.try_get("content_model")?,
        keywords: row.try_get("keywords")?,
        description: row.try_get("description")?,
        list_template: row.try_get("list_template")?,
        detail_template: row.try_get("detail_template")?,
        page_size: row.try_get("page_size")?,
        created_at: row.try_get("created_at")?,
    })
}

impl PgCategoryRepository {
    /// Create a new PgCategoryRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Whether `slug` is already taken by a category other than `exclude_id`.
    pub async fn slug_in_use(&self, slug: &str, exclude_id: Option<i64>) -> Result<bool> {
        let row = sqlx::query(
            "SELECT 1 AS hit FROM category WHERE slug = $1 AND ($2::bigint IS NULL OR id <> $2)",
        )
        .bind(slug)
        .bind(exclude_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(row.is_some())
    }

    /// Number of direct children of `id` (the deletion gate).
    pub async fn count_children(&self, id: i64) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM category WHERE parent_id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(row.try_get("n")?)
    }

    /// Insert a new category with an already-computed path.
    pub(crate) async fn insert(
        &self,
        req: &CreateCategoryRequest,
        parent_id: i64,
        path: &CategoryPath,
    ) -> Result<Category> {
        let row = sqlx::query(&format!(
            "INSERT INTO category \
                 (title, slug, parent_id, path, sort_order, visible, content_model, \
                  keywords, description, list_template, detail_template, page_size) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             RETURNING {CATEGORY_COLUMNS}"
        ))
        .bind(&req.title)
        .bind(&req.slug)
        .bind(parent_id)
        .bind(path.as_str())
        .bind(req.sort_order)
        .bind(req.visible)
        .bind(req.resolved_content_model())
        .bind(&req.keywords)
        .bind(&req.description)
        .bind(&req.list_template)
        .bind(&req.detail_template)
        .bind(req.resolved_page_size())
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;
        category_from_row(&row)
    }

    /// Rewrite every non-structural column from the merged model.
    pub(crate) async fn update_display(&self, category: &Category) -> Result<()> {
        let result = sqlx::query(
            "UPDATE category SET title = $1, slug = $2, sort_order = $3, visible = $4, \
                 content_model = $5, keywords = $6, description = $7, list_template = $8, \
                 detail_template = $9, page_size = $10 \
             WHERE id = $11",
        )
        .bind(&category.title)
        .bind(&category.slug)
        .bind(category.sort_order)
        .bind(category.visible)
        .bind(&category.content_model)
        .bind(&category.keywords)
        .bind(&category.description)
        .bind(&category.list_template)
        .bind(&category.detail_template)
        .bind(category.page_size)
        .bind(category.id)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::CategoryNotFound(category.id));
        }
        Ok(())
    }

    /// Delete a single row. Returns `CategoryNotFound` if nothing matched.
    pub(crate) async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM category WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::CategoryNotFound(id));
        }
        Ok(())
    }

    /// Move a node under a new parent within an existing transaction.
    pub(crate) async fn set_parent_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: i64,
        parent_id: i64,
        path: &CategoryPath,
    ) -> Result<()> {
        let result = sqlx::query("UPDATE category SET parent_id = $1, path = $2 WHERE id = $3")
            .bind(parent_id)
            .bind(path.as_str())
            .bind(id)
            .execute(&mut **tx)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::CategoryNotFound(id));
        }
        Ok(())
    }

    /// Rewrite a node's path within an existing transaction (descendant
    /// repair; parent_id is untouched).
    pub(crate) async fn set_path_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: i64,
        path: &CategoryPath,
    ) -> Result<()> {
        sqlx::query("UPDATE category SET path = $1 WHERE id = $2")
            .bind(path.as_str())
            .bind(id)
            .execute(&mut **tx)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }

    /// Direct child ids of `parent_id` within an existing transaction.
    pub(crate) async fn child_ids_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        parent_id: i64,
    ) -> Result<Vec<i64>> {
        let rows = sqlx::query("SELECT id FROM category WHERE parent_id = $1")
            .bind(parent_id)
            .fetch_all(&mut **tx)
            .await
            .map_err(Error::Database)?;
        rows.iter().map(|r| Ok(r.try_get("id")?)).collect()
    }
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn get(&self, id: i64) -> Result<Option<Category>> {
        let row = sqlx::query(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM category WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.as_ref().map(category_from_row).transpose()
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        let row = sqlx::query(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM category WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.as_ref().map(category_from_row).transpose()
    }

    async fn list_children(&self, parent_id: i64) -> Result<Vec<Category>> {
        let rows = sqlx::query(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM category WHERE parent_id = $1 \
             ORDER BY sort_order DESC, id DESC"
        ))
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.iter().map(category_from_row).collect()
    }

    async fn list_all(&self) -> Result<Vec<Category>> {
        let rows = sqlx::query(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM category ORDER BY sort_order DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.iter().map(category_from_row).collect()
    }
}
