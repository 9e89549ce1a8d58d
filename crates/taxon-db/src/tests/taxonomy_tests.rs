//! Tests for materialized-path maintenance and structural invariants.
//!
//! Covers: path computation on create, transitive repair on reparent,
//! cycle rejection, delete gating, slug uniqueness, and navigation cache
//! behavior when the cache backend is absent.

use std::sync::Arc;

use taxon_cache::MemoryAggregateCache;
use taxon_core::{
    AggregateCache, CategoryRepository, CreateCategoryRequest, Error, UpdateCategoryRequest,
    NAVIGATION_CACHE_KEY,
};

use super::skip_without_database;
use crate::test_fixtures::TestDatabase;
use crate::TaxonomyService;

fn service(test_db: &TestDatabase) -> TaxonomyService {
    TaxonomyService::new(test_db.pool.clone(), Arc::new(MemoryAggregateCache::new()))
}

// =============================================================================
// Path computation on create
// =============================================================================

#[tokio::test]
async fn test_create_chain_materializes_paths() {
    skip_without_database!();
    let test_db = TestDatabase::new().await;
    let taxonomy = service(&test_db);

    let a = taxonomy
        .create(CreateCategoryRequest::new("A"))
        .await
        .expect("create root");
    assert_eq!(a.path.as_str(), "0");

    let b = taxonomy
        .create(CreateCategoryRequest::new("B").under(a.id))
        .await
        .expect("create child");
    assert_eq!(b.path.as_str(), format!("0,{}", a.id));

    let c = taxonomy
        .create(CreateCategoryRequest::new("C").under(b.id))
        .await
        .expect("create grandchild");
    assert_eq!(c.path.as_str(), format!("0,{},{}", a.id, b.id));

    test_db.cleanup().await;
}

#[tokio::test]
async fn test_create_under_missing_parent_fails() {
    skip_without_database!();
    let test_db = TestDatabase::new().await;
    let taxonomy = service(&test_db);

    let result = taxonomy
        .create(CreateCategoryRequest::new("orphan").under(999_999))
        .await;
    assert!(matches!(result, Err(Error::InvalidReference(999_999))));

    test_db.cleanup().await;
}

#[tokio::test]
async fn test_create_with_blank_title_fails() {
    skip_without_database!();
    let test_db = TestDatabase::new().await;
    let taxonomy = service(&test_db);

    let result = taxonomy.create(CreateCategoryRequest::new("   ")).await;
    assert!(matches!(result, Err(Error::InvalidInput(_))));

    test_db.cleanup().await;
}

// =============================================================================
// Reparenting and transitive path repair
// =============================================================================

#[tokio::test]
async fn test_reparent_repairs_descendant_paths() {
    skip_without_database!();
    let test_db = TestDatabase::new().await;
    let taxonomy = service(&test_db);

    // A → B → C, plus root D
    let a = taxonomy.create(CreateCategoryRequest::new("A")).await.unwrap();
    let b = taxonomy
        .create(CreateCategoryRequest::new("B").under(a.id))
        .await
        .unwrap();
    let c = taxonomy
        .create(CreateCategoryRequest::new("C").under(b.id))
        .await
        .unwrap();
    let d = taxonomy.create(CreateCategoryRequest::new("D")).await.unwrap();

    // Move B under D: B and C must both be repaired.
    taxonomy.reparent(b.id, d.id).await.expect("reparent B");

    let b = taxonomy.categories().get(b.id).await.unwrap().unwrap();
    assert_eq!(b.parent_id, d.id);
    assert_eq!(b.path.as_str(), format!("0,{}", d.id));

    let c = taxonomy.categories().get(c.id).await.unwrap().unwrap();
    assert_eq!(
        c.path.as_str(),
        format!("0,{},{}", d.id, b.id),
        "grandchild path must be repaired transitively"
    );

    test_db.cleanup().await;
}

#[tokio::test]
async fn test_reparent_to_root() {
    skip_without_database!();
    let test_db = TestDatabase::new().await;
    let taxonomy = service(&test_db);

    let a = taxonomy.create(CreateCategoryRequest::new("A")).await.unwrap();
    let b = taxonomy
        .create(CreateCategoryRequest::new("B").under(a.id))
        .await
        .unwrap();

    taxonomy.reparent(b.id, 0).await.expect("promote to root");

    let b = taxonomy.categories().get(b.id).await.unwrap().unwrap();
    assert_eq!(b.parent_id, 0);
    assert_eq!(b.path.as_str(), "0");

    test_db.cleanup().await;
}

#[tokio::test]
async fn test_reparent_to_self_fails() {
    skip_without_database!();
    let test_db = TestDatabase::new().await;
    let taxonomy = service(&test_db);

    let a = taxonomy.create(CreateCategoryRequest::new("A")).await.unwrap();

    let result = taxonomy.reparent(a.id, a.id).await;
    assert!(matches!(result, Err(Error::CycleDetected { .. })));

    test_db.cleanup().await;
}

#[tokio::test]
async fn test_reparent_under_descendant_fails_without_writes() {
    skip_without_database!();
    let test_db = TestDatabase::new().await;
    let taxonomy = service(&test_db);

    // A → B → C
    let a = taxonomy.create(CreateCategoryRequest::new("A")).await.unwrap();
    let b = taxonomy
        .create(CreateCategoryRequest::new("B").under(a.id))
        .await
        .unwrap();
    let c = taxonomy
        .create(CreateCategoryRequest::new("C").under(b.id))
        .await
        .unwrap();

    let result = taxonomy.reparent(a.id, c.id).await;
    assert!(matches!(result, Err(Error::CycleDetected { .. })));

    // No path in the store may have changed.
    let a = taxonomy.categories().get(a.id).await.unwrap().unwrap();
    assert_eq!(a.path.as_str(), "0");
    let b2 = taxonomy.categories().get(b.id).await.unwrap().unwrap();
    assert_eq!(b2.path.as_str(), b.path.as_str());
    let c2 = taxonomy.categories().get(c.id).await.unwrap().unwrap();
    assert_eq!(c2.path.as_str(), c.path.as_str());

    test_db.cleanup().await;
}

#[tokio::test]
async fn test_reparent_missing_parent_fails() {
    skip_without_database!();
    let test_db = TestDatabase::new().await;
    let taxonomy = service(&test_db);

    let a = taxonomy.create(CreateCategoryRequest::new("A")).await.unwrap();

    let result = taxonomy.reparent(a.id, 999_999).await;
    assert!(matches!(result, Err(Error::InvalidReference(999_999))));

    test_db.cleanup().await;
}

// =============================================================================
// Deletion safety
// =============================================================================

#[tokio::test]
async fn test_delete_with_children_fails_until_emptied() {
    skip_without_database!();
    let test_db = TestDatabase::new().await;
    let taxonomy = service(&test_db);

    let d = taxonomy.create(CreateCategoryRequest::new("D")).await.unwrap();
    let b = taxonomy
        .create(CreateCategoryRequest::new("B").under(d.id))
        .await
        .unwrap();

    let result = taxonomy.delete(d.id).await;
    assert!(matches!(result, Err(Error::HasChildren(_))));

    // After moving B away, the delete goes through.
    taxonomy.reparent(b.id, 0).await.unwrap();
    taxonomy.delete(d.id).await.expect("delete emptied category");
    assert!(taxonomy.categories().get(d.id).await.unwrap().is_none());

    test_db.cleanup().await;
}

#[tokio::test]
async fn test_delete_missing_category_fails() {
    skip_without_database!();
    let test_db = TestDatabase::new().await;
    let taxonomy = service(&test_db);

    let result = taxonomy.delete(424_242).await;
    assert!(matches!(result, Err(Error::CategoryNotFound(424_242))));

    test_db.cleanup().await;
}

// =============================================================================
// Slug uniqueness and display updates
// =============================================================================

#[tokio::test]
async fn test_duplicate_slug_rejected_on_create_and_update() {
    skip_without_database!();
    let test_db = TestDatabase::new().await;
    let taxonomy = service(&test_db);

    let _news = taxonomy
        .create(CreateCategoryRequest::new("News").with_slug("news"))
        .await
        .unwrap();
    let sports = taxonomy
        .create(CreateCategoryRequest::new("Sports").with_slug("sports"))
        .await
        .unwrap();

    let result = taxonomy
        .create(CreateCategoryRequest::new("More News").with_slug("news"))
        .await;
    assert!(matches!(result, Err(Error::DuplicateSlug(_))));

    let result = taxonomy
        .update(
            sports.id,
            UpdateCategoryRequest {
                slug: Some(Some("news".to_string())),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(Error::DuplicateSlug(_))));

    // Re-asserting its own slug is not a collision.
    let updated = taxonomy
        .update(
            sports.id,
            UpdateCategoryRequest {
                slug: Some(Some("sports".to_string())),
                title: Some("All Sports".to_string()),
                ..Default::default()
            },
        )
        .await
        .expect("self-slug update");
    assert_eq!(updated.title, "All Sports");

    test_db.cleanup().await;
}

#[tokio::test]
async fn test_find_by_slug() {
    skip_without_database!();
    let test_db = TestDatabase::new().await;
    let taxonomy = service(&test_db);

    let news = taxonomy
        .create(CreateCategoryRequest::new("News").with_slug("news"))
        .await
        .unwrap();

    let found = taxonomy
        .categories()
        .find_by_slug("news")
        .await
        .unwrap()
        .expect("slug lookup");
    assert_eq!(found.id, news.id);
    assert!(taxonomy.categories().find_by_slug("nope").await.unwrap().is_none());

    test_db.cleanup().await;
}

// =============================================================================
// Tree reads, ordering, breadcrumbs
// =============================================================================

#[tokio::test]
async fn test_sibling_ordering_is_sort_order_desc_then_id_desc() {
    skip_without_database!();
    let test_db = TestDatabase::new().await;
    let taxonomy = service(&test_db);

    let mut req_low = CreateCategoryRequest::new("low");
    req_low.sort_order = 1;
    let mut req_high = CreateCategoryRequest::new("high");
    req_high.sort_order = 9;
    let mut req_tie = CreateCategoryRequest::new("tie");
    req_tie.sort_order = 1;

    let low = taxonomy.create(req_low).await.unwrap();
    let high = taxonomy.create(req_high).await.unwrap();
    let tie = taxonomy.create(req_tie).await.unwrap();

    let roots = taxonomy.categories().list_children(0).await.unwrap();
    let ids: Vec<i64> = roots.iter().map(|c| c.id).collect();
    // sort_order 9 first, then the two sort_order-1 rows newest-id first.
    assert_eq!(ids, vec![high.id, tie.id, low.id]);

    test_db.cleanup().await;
}

#[tokio::test]
async fn test_tree_covers_every_category_and_marks_leaves() {
    skip_without_database!();
    let test_db = TestDatabase::new().await;
    let taxonomy = service(&test_db);

    let a = taxonomy.create(CreateCategoryRequest::new("A")).await.unwrap();
    let b = taxonomy
        .create(CreateCategoryRequest::new("B").under(a.id))
        .await
        .unwrap();
    let _c = taxonomy
        .create(CreateCategoryRequest::new("C").under(b.id))
        .await
        .unwrap();
    let d = taxonomy.create(CreateCategoryRequest::new("D")).await.unwrap();

    let forest = taxonomy.tree(0).await.unwrap();
    let mut ids: Vec<i64> = forest.iter().flat_map(|n| n.flatten_ids()).collect();
    ids.sort_unstable();
    let mut expected: Vec<i64> =
        taxonomy.categories().list_all().await.unwrap().iter().map(|c| c.id).collect();
    expected.sort_unstable();
    assert_eq!(ids, expected, "flattened forest must cover every category once");

    let d_node = forest
        .iter()
        .find(|n| n.record.id == d.id)
        .expect("root D in forest");
    assert!(d_node.children.is_none(), "childless D carries no children field");

    test_db.cleanup().await;
}

#[tokio::test]
async fn test_navigation_excludes_hidden_categories() {
    skip_without_database!();
    let test_db = TestDatabase::new().await;
    let taxonomy = service(&test_db);

    let shown = taxonomy.create(CreateCategoryRequest::new("shown")).await.unwrap();
    let hidden = taxonomy.create(CreateCategoryRequest::new("hidden")).await.unwrap();
    taxonomy
        .update(
            hidden.id,
            UpdateCategoryRequest {
                visible: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let nav = taxonomy.navigation().await.unwrap();
    let ids: Vec<i64> = nav.iter().map(|n| n.record.id).collect();
    assert!(ids.contains(&shown.id));
    assert!(!ids.contains(&hidden.id));

    test_db.cleanup().await;
}

#[tokio::test]
async fn test_breadcrumbs_follow_materialized_path() {
    skip_without_database!();
    let test_db = TestDatabase::new().await;
    let taxonomy = service(&test_db);

    let a = taxonomy.create(CreateCategoryRequest::new("A")).await.unwrap();
    let b = taxonomy
        .create(CreateCategoryRequest::new("B").under(a.id))
        .await
        .unwrap();
    let c = taxonomy
        .create(CreateCategoryRequest::new("C").under(b.id))
        .await
        .unwrap();

    let trail = taxonomy.breadcrumbs(c.id).await.unwrap();
    let ids: Vec<i64> = trail.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![a.id, b.id, c.id]);

    test_db.cleanup().await;
}

// =============================================================================
// Cache interaction
// =============================================================================

#[tokio::test]
async fn test_navigation_survives_unreachable_cache_backend() {
    skip_without_database!();
    let test_db = TestDatabase::new().await;
    // A disabled Redis cache: every read is a miss, every write a no-op.
    let taxonomy = TaxonomyService::new(
        test_db.pool.clone(),
        Arc::new(taxon_cache::RedisAggregateCache::disabled()),
    );

    let a = taxonomy.create(CreateCategoryRequest::new("A")).await.unwrap();
    let nav = taxonomy.navigation().await.expect("navigation without cache");
    assert!(nav.iter().any(|n| n.record.id == a.id));

    test_db.cleanup().await;
}

#[tokio::test]
async fn test_structural_mutation_invalidates_navigation_entry() {
    skip_without_database!();
    let test_db = TestDatabase::new().await;
    let cache = Arc::new(MemoryAggregateCache::new());
    let taxonomy = TaxonomyService::new(test_db.pool.clone(), cache.clone());

    taxonomy.create(CreateCategoryRequest::new("A")).await.unwrap();
    taxonomy.navigation().await.unwrap();
    assert!(cache.get(NAVIGATION_CACHE_KEY).await.is_some(), "populated on read");

    let b = taxonomy.create(CreateCategoryRequest::new("B")).await.unwrap();
    assert!(
        cache.get(NAVIGATION_CACHE_KEY).await.is_none(),
        "create must invalidate the navigation aggregate"
    );

    // Repopulated lazily, and the fresh tree sees B.
    let nav = taxonomy.navigation().await.unwrap();
    assert!(nav.iter().any(|n| n.record.id == b.id));
    assert!(cache.get(NAVIGATION_CACHE_KEY).await.is_some());

    test_db.cleanup().await;
}
