//! Structured logging field name constants.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log aggregation tools can query by the same names across subsystems.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events, operation completions |
//! | DEBUG | Decision points, cache hits/misses, config choices |

/// Subsystem originating the log event.
/// Values: "taxonomy", "db", "cache", "content"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "path_maintainer", "tree_builder", "pool", "redis"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "create", "reparent", "delete", "navigation"
pub const OPERATION: &str = "op";

/// Category id being operated on.
pub const CATEGORY_ID: &str = "category_id";

/// Parent category id involved in the operation.
pub const PARENT_ID: &str = "parent_id";

/// Article id being operated on.
pub const ARTICLE_ID: &str = "article_id";

/// Cache key of the aggregate being read or invalidated.
pub const CACHE_KEY: &str = "cache_key";

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of rows returned or repaired by an operation.
pub const ROW_COUNT: &str = "row_count";
