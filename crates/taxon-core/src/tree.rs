//! Flat-to-forest tree construction.
//!
//! Converts an ordered sequence of records carrying `id`/`parent_id` into a
//! nested forest. Stateless and pure: independent calls share nothing, and
//! the input order is the sibling order (callers pre-sort per the store's
//! ordering rule; the builder never re-sorts).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::defaults::ROOT_PARENT_ID;
use crate::models::Category;

/// Anything that can hang in a tree: an id plus a parent id.
pub trait TreeRecord {
    fn tree_id(&self) -> i64;
    fn tree_parent_id(&self) -> i64;
}

impl TreeRecord for Category {
    fn tree_id(&self) -> i64 {
        self.id
    }

    fn tree_parent_id(&self) -> i64 {
        self.parent_id
    }
}

/// A record with its attached subtree.
///
/// `children` is `None` for leaves, not an empty vec: absence of the field
/// (also in serialized JSON) is what signals "no descendants".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeNode<T> {
    #[serde(flatten)]
    pub record: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<TreeNode<T>>>,
}

impl<T> TreeNode<T> {
    /// Pre-order traversal collecting every node's id exactly once.
    pub fn flatten_ids(&self) -> Vec<i64>
    where
        T: TreeRecord,
    {
        let mut ids = vec![self.record.tree_id()];
        if let Some(children) = &self.children {
            for child in children {
                ids.extend(child.flatten_ids());
            }
        }
        ids
    }
}

/// Build a forest rooted at `root_parent_id` from a flat record sequence.
///
/// Runs in O(n): one pass indexes records by parent id, then each node is
/// attached exactly once. Records whose parent chain never reaches
/// `root_parent_id` (orphans) are simply not emitted.
pub fn build_tree<T: TreeRecord>(records: Vec<T>, root_parent_id: i64) -> Vec<TreeNode<T>> {
    let mut by_parent: HashMap<i64, Vec<T>> = HashMap::new();
    // Remember insertion order per bucket; HashMap values keep it because
    // each bucket is filled in input order.
    for record in records {
        by_parent
            .entry(record.tree_parent_id())
            .or_default()
            .push(record);
    }
    attach(&mut by_parent, root_parent_id)
}

/// Build a forest of only the visible categories, for public navigation.
pub fn build_navigation(categories: Vec<Category>) -> Vec<TreeNode<Category>> {
    let visible = categories.into_iter().filter(|c| c.visible).collect();
    build_tree(visible, ROOT_PARENT_ID)
}

fn attach<T: TreeRecord>(by_parent: &mut HashMap<i64, Vec<T>>, parent_id: i64) -> Vec<TreeNode<T>> {
    let Some(records) = by_parent.remove(&parent_id) else {
        return Vec::new();
    };
    records
        .into_iter()
        .map(|record| {
            let children = attach(by_parent, record.tree_id());
            TreeNode {
                record,
                children: if children.is_empty() {
                    None
                } else {
                    Some(children)
                },
            }
        })
        .collect()
}
