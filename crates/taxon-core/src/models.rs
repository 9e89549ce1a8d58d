//! Core data models for the taxon CMS backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::content::SecondaryIds;
use crate::defaults::{DEFAULT_CONTENT_MODEL, DEFAULT_PAGE_SIZE, ROOT_PARENT_ID};
use crate::path::CategoryPath;

/// A taxonomy node ("classtype" in the legacy schema).
///
/// `path` is derived from the ancestor chain and is never caller-supplied;
/// the taxonomy service is the only writer. `parent_id` of 0 marks a
/// top-level category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    /// Display name, required, non-unique.
    pub title: String,
    /// Optional unique human-readable identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    /// Direct parent id (0 = root).
    pub parent_id: i64,
    /// Materialized ancestor chain, e.g. "0,7,9".
    pub path: CategoryPath,
    /// Primary sort key among siblings (descending), id breaks ties.
    pub sort_order: i32,
    /// Whether the category appears in public listings and trees.
    pub visible: bool,
    /// Content model rendered under this category (opaque to the engine).
    pub content_model: String,
    /// SEO keywords (opaque display data).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    /// Listing description (opaque display data).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// List page template hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_template: Option<String>,
    /// Detail page template hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail_template: Option<String>,
    /// Items per page on list views.
    pub page_size: i32,
    pub created_at: DateTime<Utc>,
}

/// Request to create a new category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCategoryRequest {
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    /// Parent id; absent or <= 0 means root.
    #[serde(default)]
    pub parent_id: Option<i64>,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub content_model: Option<String>,
    #[serde(default)]
    pub keywords: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub list_template: Option<String>,
    #[serde(default)]
    pub detail_template: Option<String>,
    #[serde(default)]
    pub page_size: Option<i32>,
}

fn default_visible() -> bool {
    true
}

impl CreateCategoryRequest {
    /// Minimal request: a visible root category with defaults.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            slug: None,
            parent_id: None,
            sort_order: 0,
            visible: true,
            content_model: None,
            keywords: None,
            description: None,
            list_template: None,
            detail_template: None,
            page_size: None,
        }
    }

    /// Place the new category under the given parent.
    pub fn under(mut self, parent_id: i64) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// Set the unique slug.
    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    /// Resolved parent id with the root sentinel applied.
    pub fn resolved_parent_id(&self) -> i64 {
        match self.parent_id {
            Some(pid) if pid > 0 => pid,
            _ => ROOT_PARENT_ID,
        }
    }

    /// Content model, defaulted.
    pub fn resolved_content_model(&self) -> &str {
        self.content_model.as_deref().unwrap_or(DEFAULT_CONTENT_MODEL)
    }

    /// Page size, defaulted.
    pub fn resolved_page_size(&self) -> i32 {
        self.page_size.unwrap_or(DEFAULT_PAGE_SIZE)
    }
}

/// Partial update of a category's display data.
///
/// A parent change is not expressed here: reparenting goes through the
/// taxonomy service's dedicated operation so the path repair always runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCategoryRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// `Some(None)` clears the slug, `Some(Some(s))` replaces it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_template: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail_template: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<i32>,
}

impl UpdateCategoryRequest {
    /// Whether the patch carries no changes at all.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.slug.is_none()
            && self.sort_order.is_none()
            && self.visible.is_none()
            && self.content_model.is_none()
            && self.keywords.is_none()
            && self.description.is_none()
            && self.list_template.is_none()
            && self.detail_template.is_none()
            && self.page_size.is_none()
    }
}

/// A content item filed under one primary and zero or more secondary
/// categories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    pub title: String,
    /// Primary category id; listing queries expand this to the subtree.
    pub category_id: i64,
    /// Secondary categories; exact-match only in listing queries.
    #[serde(default)]
    pub secondary_ids: SecondaryIds,
    pub visible: bool,
    pub created_at: DateTime<Utc>,
}

/// One key/value row of the global site configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteSetting {
    pub name: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}
