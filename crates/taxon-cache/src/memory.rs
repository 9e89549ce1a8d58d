//! In-process aggregate cache.
//!
//! Satisfies the same contract as the Redis implementation without any
//! backend. Used as the test double and for cache-less deployments where
//! the navigation tree is still worth memoizing per process.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use taxon_core::AggregateCache;

struct Entry {
    value: serde_json::Value,
    expires_at: Instant,
}

/// Aggregate cache held in a process-local map with per-entry expiry.
#[derive(Clone, Default)]
pub struct MemoryAggregateCache {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
}

impl MemoryAggregateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (possibly expired, not yet evicted) entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl AggregateCache for MemoryAggregateCache {
    async fn get(&self, name: &str) -> Option<serde_json::Value> {
        let mut entries = self.entries.write().await;
        match entries.get(name) {
            Some(entry) if entry.expires_at > Instant::now() => {
                debug!(cache_key = %name, "Cache HIT");
                Some(entry.value.clone())
            }
            Some(_) => {
                // Expired: evict lazily on read.
                entries.remove(name);
                debug!(cache_key = %name, "Cache MISS (expired)");
                None
            }
            None => {
                debug!(cache_key = %name, "Cache MISS");
                None
            }
        }
    }

    async fn put(&self, name: &str, value: &serde_json::Value, ttl: Duration) -> bool {
        let mut entries = self.entries.write().await;
        entries.insert(
            name.to_string(),
            Entry {
                value: value.clone(),
                expires_at: Instant::now() + ttl,
            },
        );
        true
    }

    async fn invalidate(&self, name: &str) -> bool {
        self.entries.write().await.remove(name).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_put_then_get() {
        let cache = MemoryAggregateCache::new();
        let value = json!({"tree": [1, 2, 3]});
        assert!(cache.put("navigation", &value, Duration::from_secs(60)).await);
        assert_eq!(cache.get("navigation").await, Some(value));
    }

    #[tokio::test]
    async fn test_get_missing_is_none() {
        let cache = MemoryAggregateCache::new();
        assert!(cache.get("navigation").await.is_none());
    }

    #[tokio::test]
    async fn test_invalidate_drops_entry() {
        let cache = MemoryAggregateCache::new();
        cache
            .put("webconfig", &json!({"title": "x"}), Duration::from_secs(60))
            .await;
        assert!(cache.invalidate("webconfig").await);
        assert!(cache.get("webconfig").await.is_none());
        // Second invalidation finds nothing.
        assert!(!cache.invalidate("webconfig").await);
    }

    #[tokio::test]
    async fn test_expired_entry_is_a_miss() {
        let cache = MemoryAggregateCache::new();
        cache
            .put("navigation", &json!([]), Duration::from_millis(0))
            .await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert!(cache.get("navigation").await.is_none());
        assert!(cache.is_empty().await, "expired entry should be evicted on read");
    }

    #[tokio::test]
    async fn test_entries_are_independent() {
        let cache = MemoryAggregateCache::new();
        cache.put("navigation", &json!(1), Duration::from_secs(60)).await;
        cache.put("webconfig", &json!(2), Duration::from_secs(60)).await;
        cache.invalidate("navigation").await;
        assert_eq!(cache.get("webconfig").await, Some(json!(2)));
        assert_eq!(cache.len().await, 1);
    }
}
