//! # taxon-cache
//!
//! Read-through aggregate cache implementations for the taxon CMS backend.
//!
//! Two implementations of [`taxon_core::AggregateCache`]:
//! - [`RedisAggregateCache`] — shared cache for multi-process deployments.
//! - [`MemoryAggregateCache`] — in-process map, also the test double.
//!
//! Both degrade to "always miss" rather than surfacing backend errors; the
//! database remains the source of truth.

pub mod memory;
pub mod redis_cache;

pub use memory::MemoryAggregateCache;
pub use redis_cache::RedisAggregateCache;
