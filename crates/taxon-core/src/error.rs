//! Error types for the taxon taxonomy engine.

use thiserror::Error;

/// Result type alias using taxon's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for taxonomy operations.
///
/// Every taxonomy failure is typed and recoverable: callers (HTTP
/// controllers) translate variants into status codes. The engine never
/// retries internally.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Category not found
    #[error("Category not found: {0}")]
    CategoryNotFound(i64),

    /// Referenced parent category does not resolve
    #[error("Invalid parent reference: {0}")]
    InvalidReference(i64),

    /// Slug already used by another category
    #[error("Duplicate slug: {0}")]
    DuplicateSlug(String),

    /// Reparent would make a category its own ancestor
    #[error("Cycle detected: category {id} cannot be parented under {parent_id}")]
    CycleDetected { id: i64, parent_id: i64 },

    /// Delete blocked because the category still has direct children
    #[error("Category {0} has children and cannot be deleted")]
    HasChildren(i64),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
