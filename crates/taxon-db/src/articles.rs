//! Article repository and content-category resolution.
//!
//! Translates between "which categories does this article belong to" and
//! "which articles belong to this category". Subtree membership rides on
//! the materialized path: descendants of X are exactly the rows whose path
//! contains X as a comma-delimited segment.
//!
//! Membership asymmetry, preserved from the legacy behavior: only the
//! *primary* category expands to its descendant set when listing; secondary
//! membership is exact-match. An article secondary-tagged with a child of X
//! does not show up under X.

use std::collections::BTreeSet;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};

use taxon_core::{
    categories_of, Article, ArticleQueryRepository, Error, Result, SecondaryIds,
};

/// PostgreSQL implementation of ArticleQueryRepository.
#[derive(Clone)]
pub struct PgArticleRepository {
    pool: Pool<Postgres>,
}

fn article_from_row(row: &PgRow) -> Result<Article> {
    let raw_secondary: String = row.try_get("secondary_ids")?;
    Ok(Article {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        category_id: row.try_get("category_id")?,
        secondary_ids: SecondaryIds::parse(&raw_secondary),
        visible: row.try_get("visible")?,
        created_at: row.try_get("created_at")?,
    })
}

impl PgArticleRepository {
    /// Create a new PgArticleRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Insert an article filed under `category_id`, with optional secondary
    /// categories. The secondary set is serialized back to the delimited
    /// column form only here, at the storage boundary.
    pub async fn create(
        &self,
        title: &str,
        category_id: i64,
        secondary_ids: &SecondaryIds,
    ) -> Result<Article> {
        let row = sqlx::query(
            "INSERT INTO article (title, category_id, secondary_ids) \
             VALUES ($1, $2, $3) \
             RETURNING id, title, category_id, secondary_ids, visible, created_at",
        )
        .bind(title)
        .bind(category_id)
        .bind(secondary_ids.to_column())
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;
        article_from_row(&row)
    }

    /// Every category the article belongs to directly (primary plus parsed
    /// secondary list). Fails with `NotFound` for a missing article.
    pub async fn resolve_categories(&self, article_id: i64) -> Result<BTreeSet<i64>> {
        let article = self
            .get(article_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("article {article_id}")))?;
        Ok(categories_of(&article))
    }
}

#[async_trait]
impl ArticleQueryRepository for PgArticleRepository {
    async fn get(&self, id: i64) -> Result<Option<Article>> {
        let row = sqlx::query(
            "SELECT id, title, category_id, secondary_ids, visible, created_at \
             FROM article WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.as_ref().map(article_from_row).transpose()
    }

    async fn descendant_ids(&self, category_id: i64) -> Result<Vec<i64>> {
        // The stored path excludes the node's own id, so wrapping it in
        // delimiters makes "is X an ancestor" one LIKE per row:
        // path "0,7,9" becomes ",0,7,9," and matches "%,7,%".
        let rows = sqlx::query(
            "SELECT id FROM category \
             WHERE ',' || path || ',' LIKE '%,' || $1::text || ',%' \
             ORDER BY id",
        )
        .bind(category_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.iter().map(|r| Ok(r.try_get("id")?)).collect()
    }

    async fn list_in_category(
        &self,
        category_id: i64,
        include_descendants: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Article>> {
        let mut primary_ids = vec![category_id];
        if include_descendants {
            primary_ids.extend(self.descendant_ids(category_id).await?);
        }

        let rows = sqlx::query(
            "SELECT id, title, category_id, secondary_ids, visible, created_at \
             FROM article \
             WHERE category_id = ANY($1) \
                OR ',' || secondary_ids || ',' LIKE '%,' || $2::text || ',%' \
             ORDER BY created_at DESC, id DESC \
             LIMIT $3 OFFSET $4",
        )
        .bind(&primary_ids)
        .bind(category_id.to_string())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.iter().map(article_from_row).collect()
    }
}
