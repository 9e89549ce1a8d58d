//! Global site configuration with read-through caching.
//!
//! One key/value row per setting. Reads of the full configuration go
//! through the `webconfig` aggregate cache; every write invalidates it.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use sqlx::{Pool, Postgres, Row};
use tracing::{debug, warn};

use taxon_core::{
    aggregate_ttl_from_env, AggregateCache, Error, Result, SiteSetting, WEBCONFIG_CACHE_KEY,
};

/// Site configuration repository over the `site_config` table.
pub struct PgSiteConfigRepository {
    pool: Pool<Postgres>,
    cache: Arc<dyn AggregateCache>,
    ttl: Duration,
}

impl PgSiteConfigRepository {
    pub fn new(pool: Pool<Postgres>, cache: Arc<dyn AggregateCache>) -> Self {
        Self {
            pool,
            cache,
            ttl: aggregate_ttl_from_env(),
        }
    }

    /// Override the webconfig cache TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// The full configuration map, cache-first. A cache failure only means
    /// a recompute from the table.
    pub async fn load(&self) -> Result<HashMap<String, String>> {
        if let Some(cached) = self.cache.get(WEBCONFIG_CACHE_KEY).await {
            match serde_json::from_value(cached) {
                Ok(map) => return Ok(map),
                Err(e) => {
                    warn!(cache_key = WEBCONFIG_CACHE_KEY, "Stale cache shape, recomputing: {}", e);
                }
            }
        }

        let rows = sqlx::query("SELECT name, value FROM site_config")
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        let mut map = HashMap::new();
        for row in &rows {
            map.insert(row.try_get::<String, _>("name")?, row.try_get("value")?);
        }

        match serde_json::to_value(&map) {
            Ok(value) => {
                self.cache.put(WEBCONFIG_CACHE_KEY, &value, self.ttl).await;
            }
            Err(e) => warn!("Site config not cacheable: {}", e),
        }
        debug!(cache_key = WEBCONFIG_CACHE_KEY, row_count = map.len(), "Site config loaded");
        Ok(map)
    }

    /// A single setting, straight from the table.
    pub async fn get(&self, name: &str) -> Result<Option<SiteSetting>> {
        let row = sqlx::query("SELECT name, value, updated_at FROM site_config WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        row.map(|r| {
            Ok(SiteSetting {
                name: r.try_get("name")?,
                value: r.try_get("value")?,
                updated_at: r.try_get("updated_at")?,
            })
        })
        .transpose()
    }

    /// Upsert a setting and invalidate the cached aggregate.
    pub async fn set(&self, name: &str, value: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO site_config (name, value, updated_at) VALUES ($1, $2, now()) \
             ON CONFLICT (name) DO UPDATE SET value = EXCLUDED.value, updated_at = now()",
        )
        .bind(name)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        self.cache.invalidate(WEBCONFIG_CACHE_KEY).await;
        Ok(())
    }
}
