//! # taxon-core
//!
//! Core types, traits, and taxonomy algorithms for the taxon CMS backend.
//!
//! This crate provides the foundational data structures, the materialized
//! path encoding, the pure tree builder, and the trait definitions that the
//! storage and cache crates implement.

pub mod content;
pub mod defaults;
pub mod error;
pub mod logging;
pub mod models;
pub mod path;
pub mod traits;
pub mod tree;

// Re-export commonly used types at crate root
pub use content::{categories_of, SecondaryIds};
pub use defaults::{
    aggregate_ttl_from_env, DEFAULT_AGGREGATE_TTL, DEFAULT_PAGE_SIZE, NAVIGATION_CACHE_KEY,
    ROOT_PARENT_ID, WEBCONFIG_CACHE_KEY,
};
pub use error::{Error, Result};
pub use models::{
    Article, Category, CreateCategoryRequest, SiteSetting, UpdateCategoryRequest,
};
pub use path::CategoryPath;
pub use traits::{AggregateCache, ArticleQueryRepository, CategoryRepository};
pub use tree::{build_navigation, build_tree, TreeNode, TreeRecord};
