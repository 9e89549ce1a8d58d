//! Redis-backed aggregate cache.
//!
//! Serves the named derived aggregates (navigation tree, site configuration)
//! with a fixed TTL and explicit invalidation. Any backend failure degrades
//! to a miss or a no-op; callers always fall back to the store.
//!
//! ## Configuration
//!
//! Environment variables:
//! - `REDIS_ENABLED`: Set to "false" to disable caching (default: true)
//! - `REDIS_URL`: Redis connection URL (default: redis://localhost:6379)
//! - `REDIS_CACHE_TTL`: TTL in seconds for cached aggregates (default:
//!   3600); read by the services that populate the cache, see
//!   `taxon_core::aggregate_ttl_from_env`

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use taxon_core::AggregateCache;

/// Aggregate cache backed by Redis.
#[derive(Clone)]
pub struct RedisAggregateCache {
    inner: Arc<Inner>,
}

struct Inner {
    /// Redis connection manager (None if disabled or unreachable at startup).
    connection: RwLock<Option<ConnectionManager>>,
    /// Cache key prefix.
    prefix: String,
}

impl RedisAggregateCache {
    /// Create a cache from environment configuration.
    ///
    /// Reads `REDIS_ENABLED` and `REDIS_URL`. A connect failure does not
    /// error: the cache starts disabled and every read is a miss.
    pub async fn from_env() -> Self {
        let enabled = std::env::var("REDIS_ENABLED")
            .map(|v| v != "false" && v != "0")
            .unwrap_or(true);

        let redis_url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());

        let connection = if enabled {
            match redis::Client::open(redis_url.as_str()) {
                Ok(client) => match ConnectionManager::new(client).await {
                    Ok(conn) => {
                        info!(
                            subsystem = "cache",
                            component = "redis",
                            "Aggregate cache enabled"
                        );
                        Some(conn)
                    }
                    Err(e) => {
                        warn!("Failed to connect to Redis, cache disabled: {}", e);
                        None
                    }
                },
                Err(e) => {
                    warn!("Invalid Redis URL, cache disabled: {}", e);
                    None
                }
            }
        } else {
            info!("Aggregate cache disabled via REDIS_ENABLED=false");
            None
        };

        Self {
            inner: Arc::new(Inner {
                connection: RwLock::new(connection),
                prefix: "taxon:agg:".to_string(),
            }),
        }
    }

    /// Create a disconnected cache: every get is a miss, every write a no-op.
    pub fn disabled() -> Self {
        Self {
            inner: Arc::new(Inner {
                connection: RwLock::new(None),
                prefix: "taxon:agg:".to_string(),
            }),
        }
    }

    /// Whether a live backend connection exists.
    pub async fn is_connected(&self) -> bool {
        self.inner.connection.read().await.is_some()
    }

    fn key(&self, name: &str) -> String {
        format!("{}{}", self.inner.prefix, name)
    }
}

#[async_trait]
impl AggregateCache for RedisAggregateCache {
    async fn get(&self, name: &str) -> Option<serde_json::Value> {
        let key = self.key(name);
        let mut conn_guard = self.inner.connection.write().await;
        let conn = conn_guard.as_mut()?;

        match conn.get::<_, Option<String>>(&key).await {
            Ok(Some(data)) => match serde_json::from_str(&data) {
                Ok(value) => {
                    debug!(cache_key = %name, "Cache HIT");
                    Some(value)
                }
                Err(e) => {
                    warn!(cache_key = %name, "Cache deserialization error: {}", e);
                    None
                }
            },
            Ok(None) => {
                debug!(cache_key = %name, "Cache MISS");
                None
            }
            Err(e) => {
                error!(cache_key = %name, "Redis GET error: {}", e);
                None
            }
        }
    }

    async fn put(&self, name: &str, value: &serde_json::Value, ttl: Duration) -> bool {
        let key = self.key(name);
        let mut conn_guard = self.inner.connection.write().await;
        let conn = match conn_guard.as_mut() {
            Some(c) => c,
            None => return false,
        };

        let serialized = match serde_json::to_string(value) {
            Ok(s) => s,
            Err(e) => {
                error!(cache_key = %name, "Cache serialization error: {}", e);
                return false;
            }
        };

        match conn
            .set_ex::<_, _, ()>(&key, serialized, ttl.as_secs())
            .await
        {
            Ok(_) => {
                debug!(cache_key = %name, ttl_secs = ttl.as_secs(), "Cache SET");
                true
            }
            Err(e) => {
                error!(cache_key = %name, "Redis SET error: {}", e);
                false
            }
        }
    }

    async fn invalidate(&self, name: &str) -> bool {
        let key = self.key(name);
        let mut conn_guard = self.inner.connection.write().await;
        let conn = match conn_guard.as_mut() {
            Some(c) => c,
            None => return false,
        };

        match conn.del::<_, ()>(&key).await {
            Ok(_) => {
                debug!(cache_key = %name, "Cache INVALIDATE");
                true
            }
            Err(e) => {
                error!(cache_key = %name, "Redis DEL error: {}", e);
                false
            }
        }
    }
}
