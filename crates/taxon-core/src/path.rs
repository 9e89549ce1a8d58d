//! Materialized category paths.
//!
//! A category's path is the comma-delimited chain of ancestor ids from the
//! root sentinel down to (but excluding) the category's own id: a node under
//! parent 7, whose parent is a root, has path `0,7`. Paths are derived data —
//! only the taxonomy service writes them — and make ancestor/descendant
//! queries a single segment-containment test instead of a join chain.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::defaults::ROOT_PARENT_ID;
use crate::error::{Error, Result};

/// Materialized ancestor chain of a category.
///
/// Invariant: the first segment is always the root sentinel `0`, and a
/// category's own id never appears among the segments (acyclicity).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryPath(String);

impl CategoryPath {
    /// Path of a top-level category: just the root sentinel.
    pub fn root() -> Self {
        Self(ROOT_PARENT_ID.to_string())
    }

    /// Parse a stored path string, validating the segment encoding.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(Self::root());
        }
        let mut segments = Vec::new();
        for part in trimmed.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let id: i64 = part
                .parse()
                .map_err(|_| Error::InvalidInput(format!("bad path segment: {part:?}")))?;
            segments.push(id);
        }
        if segments.first() != Some(&ROOT_PARENT_ID) {
            return Err(Error::InvalidInput(format!(
                "path must start at the root sentinel: {raw:?}"
            )));
        }
        Ok(Self(
            segments
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join(","),
        ))
    }

    /// Path of a child whose direct parent has this path and id.
    ///
    /// `path(child) = path(parent) + "," + parent.id`.
    pub fn child_of(parent_path: &CategoryPath, parent_id: i64) -> Self {
        Self(format!("{},{}", parent_path.0, parent_id))
    }

    /// Ancestor ids from root sentinel to direct parent, in order.
    pub fn segments(&self) -> Vec<i64> {
        self.0
            .split(',')
            .filter_map(|s| s.parse().ok())
            .collect()
    }

    /// Whether `id` appears as a path segment, i.e. is an ancestor.
    ///
    /// This is the operational cycle check: before reparenting `c` under
    /// `p`, `p.path.contains_segment(c.id)` must be false.
    pub fn contains_segment(&self, id: i64) -> bool {
        self.segments().contains(&id)
    }

    /// Depth of the owning category (root children have depth 1).
    pub fn depth(&self) -> usize {
        self.segments().len()
    }

    /// The raw stored form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CategoryPath {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Display for CategoryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_path() {
        assert_eq!(CategoryPath::root().as_str(), "0");
        assert_eq!(CategoryPath::root().segments(), vec![0]);
        assert_eq!(CategoryPath::root().depth(), 1);
    }

    #[test]
    fn test_child_of_root() {
        let path = CategoryPath::child_of(&CategoryPath::root(), 7);
        assert_eq!(path.as_str(), "0,7");
        assert_eq!(path.segments(), vec![0, 7]);
    }

    #[test]
    fn test_child_of_nested() {
        let parent = CategoryPath::parse("0,7").unwrap();
        let path = CategoryPath::child_of(&parent, 9);
        assert_eq!(path.as_str(), "0,7,9");
        assert_eq!(path.depth(), 3);
    }

    #[test]
    fn test_parse_normalizes_whitespace() {
        let path = CategoryPath::parse(" 0, 7 ,9 ").unwrap();
        assert_eq!(path.as_str(), "0,7,9");
    }

    #[test]
    fn test_parse_empty_is_root() {
        assert_eq!(CategoryPath::parse("").unwrap(), CategoryPath::root());
        assert_eq!(CategoryPath::parse("  ").unwrap(), CategoryPath::root());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(CategoryPath::parse("0,abc").is_err());
    }

    #[test]
    fn test_parse_rejects_missing_root_sentinel() {
        assert!(CategoryPath::parse("7,9").is_err());
    }

    #[test]
    fn test_contains_segment() {
        let path = CategoryPath::parse("0,7,9").unwrap();
        assert!(path.contains_segment(7));
        assert!(path.contains_segment(9));
        assert!(!path.contains_segment(79));
        // No substring false positives: "79" is not a segment of "0,7,9".
        assert!(!path.contains_segment(70));
    }

    #[test]
    fn test_display_round_trip() {
        let path = CategoryPath::parse("0,3,5").unwrap();
        assert_eq!(CategoryPath::parse(&path.to_string()).unwrap(), path);
    }
}
