//! Default values and fixed identifiers shared across taxon crates.

use std::time::Duration;

/// Sentinel parent id for top-level categories. The original schema stores
/// `0` rather than NULL so the materialized path can encode the root.
pub const ROOT_PARENT_ID: i64 = 0;

/// Cache key for the public navigation tree aggregate.
pub const NAVIGATION_CACHE_KEY: &str = "navigation";

/// Cache key for the global site configuration aggregate.
pub const WEBCONFIG_CACHE_KEY: &str = "webconfig";

/// Default TTL for cached aggregates.
pub const DEFAULT_AGGREGATE_TTL: Duration = Duration::from_secs(3600);

/// Default items per page for category listings.
pub const DEFAULT_PAGE_SIZE: i32 = 10;

/// Default content model for new categories.
pub const DEFAULT_CONTENT_MODEL: &str = "article";

/// TTL for cached aggregates: `REDIS_CACHE_TTL` seconds when set and
/// parseable, otherwise [`DEFAULT_AGGREGATE_TTL`].
pub fn aggregate_ttl_from_env() -> Duration {
    aggregate_ttl(std::env::var("REDIS_CACHE_TTL").ok().as_deref())
}

fn aggregate_ttl(raw: Option<&str>) -> Duration {
    raw.and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_AGGREGATE_TTL)
}
