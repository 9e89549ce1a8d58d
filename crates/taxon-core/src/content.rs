//! Content-to-category association.
//!
//! Articles carry one primary category id and a comma-joined list of
//! secondary ids stored as text. The list is parsed into a typed set at the
//! storage boundary and serialized back only when writing.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::models::Article;

/// Ordered, de-duplicated set of secondary category ids.
///
/// Parsed from the legacy comma-delimited column (`"3,5,9"`); empty
/// segments are discarded, duplicates keep their first position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecondaryIds(Vec<i64>);

impl SecondaryIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the stored comma-delimited form.
    pub fn parse(raw: &str) -> Self {
        let mut seen = BTreeSet::new();
        let ids = raw
            .split(',')
            .filter_map(|part| part.trim().parse::<i64>().ok())
            .filter(|id| *id > 0)
            .filter(|id| seen.insert(*id))
            .collect();
        Self(ids)
    }

    /// Serialize back to the stored comma-delimited form.
    pub fn to_column(&self) -> String {
        self.0
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn contains(&self, id: i64) -> bool {
        self.0.contains(&id)
    }

    pub fn ids(&self) -> &[i64] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl From<Vec<i64>> for SecondaryIds {
    fn from(ids: Vec<i64>) -> Self {
        Self::parse(
            &ids.iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(","),
        )
    }
}

impl std::iter::IntoIterator for SecondaryIds {
    type Item = i64;
    type IntoIter = std::vec::IntoIter<i64>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Every category an article belongs to directly: the primary id unioned
/// with the secondary set. Subtree expansion is a listing concern and is
/// deliberately not applied here.
pub fn categories_of(article: &Article) -> BTreeSet<i64> {
    let mut ids: BTreeSet<i64> = article.secondary_ids.ids().iter().copied().collect();
    ids.insert(article.category_id);
    ids
}
