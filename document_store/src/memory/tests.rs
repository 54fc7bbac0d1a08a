use super::*;
use query_features::PageSpec;
use serde_json::json;

fn field(name: &str) -> FieldPath {
    FieldPath::new(name).unwrap()
}

async fn seeded_store() -> MemoryStore {
    let store = MemoryStore::default();
    let tours = [
        json!({ "_id": "t1", "name": "The Forest Hiker", "price": 397, "difficulty": "easy", "ratingsAverage": 4.7,
                "startLocation": { "address": "Banff", "coordinates": [-116.2, 51.4] } }),
        json!({ "_id": "t2", "name": "The Sea Explorer", "price": 497, "difficulty": "medium", "ratingsAverage": 4.8 }),
        json!({ "_id": "t3", "name": "The Snow Adventurer", "price": 997, "difficulty": "difficult", "ratingsAverage": 4.5 }),
        json!({ "_id": "t4", "name": "The City Wanderer", "price": "free", "difficulty": "easy" }),
        json!({ "_id": "t5", "name": "The Park Camper", "price": 1497.0, "difficulty": "medium", "ratingsAverage": 4.7 }),
    ];
    for tour in tours {
        store.insert("tours", tour).await.unwrap();
    }
    store
}

fn ids(documents: &[Value]) -> Vec<&str> {
    documents
        .iter()
        .map(|document| document["_id"].as_str().unwrap())
        .collect()
}

// ========================================
// Single-document operations
// ========================================

#[tokio::test]
async fn test_insert_and_find_by_id() {
    let store = MemoryStore::default();
    let created = store
        .insert("tours", json!({ "name": "The Northern Lights" }))
        .await
        .unwrap();
    let id = created["_id"].as_str().unwrap();

    let found = store.find_by_id("tours", id).await.unwrap().unwrap();
    assert_eq!(found, created);
    assert_eq!(found["__v"], json!(0));
    assert!(store.find_by_id("tours", "missing").await.unwrap().is_none());
    assert!(store.find_by_id("users", id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_insert_rejects_duplicate_id() {
    let store = seeded_store().await;
    let result = store.insert("tours", json!({ "_id": "t1" })).await;

    match result {
        Err(StoreError::DuplicateKey { field, value }) => {
            assert_eq!(field, "_id");
            assert_eq!(value, "t1");
        }
        other => panic!("expected duplicate key, got {:?}", other),
    }
}

#[tokio::test]
async fn test_update_merges_and_keeps_identity() {
    let store = seeded_store().await;
    let changes = json!({ "_id": "hijack", "price": 450, "summary": "Breathtaking" })
        .as_object()
        .cloned()
        .unwrap();

    let updated = store.update_by_id("tours", "t1", changes).await.unwrap().unwrap();
    assert_eq!(updated["_id"], json!("t1"));
    assert_eq!(updated["price"], json!(450));
    assert_eq!(updated["summary"], json!("Breathtaking"));
    assert_eq!(updated["name"], json!("The Forest Hiker"));

    let missing = store
        .update_by_id("tours", "nope", Map::new())
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_delete_by_id() {
    let store = seeded_store().await;

    assert!(store.delete_by_id("tours", "t2").await.unwrap());
    assert!(!store.delete_by_id("tours", "t2").await.unwrap());
    assert!(!store.delete_by_id("users", "t2").await.unwrap());
    assert_eq!(store.count(&ListQuery::new("tours")).await.unwrap(), 4);
}

// ========================================
// Filtering
// ========================================

#[tokio::test]
async fn test_equality_compares_numbers_numerically() {
    let store = seeded_store().await;
    let query = ListQuery::new("tours").filter(QueryFilter::eq(field("price"), json!(1497)));

    assert_eq!(ids(&store.find(&query).await.unwrap()), vec!["t5"]);
}

#[tokio::test]
async fn test_range_only_matches_same_type() {
    let store = seeded_store().await;
    let query = ListQuery::new("tours").filter(QueryFilter::gte(field("price"), json!(500)));

    // "free" is a string and never satisfies a numeric bound
    assert_eq!(ids(&store.find(&query).await.unwrap()), vec!["t3", "t5"]);
    assert_eq!(store.count(&query).await.unwrap(), 2);
}

#[tokio::test]
async fn test_membership_and_nested_paths() {
    let store = seeded_store().await;
    let query = ListQuery::new("tours").filter(QueryFilter::in_values(
        field("difficulty"),
        vec![json!("easy"), json!("difficult")],
    ));
    assert_eq!(ids(&store.find(&query).await.unwrap()), vec!["t1", "t3", "t4"]);

    let nested = ListQuery::new("tours").filter(QueryFilter::eq(
        field("startLocation.address"),
        json!("Banff"),
    ));
    assert_eq!(ids(&store.find(&nested).await.unwrap()), vec!["t1"]);
}

#[tokio::test]
async fn test_logical_groups() {
    let store = seeded_store().await;
    let query = ListQuery::new("tours").filter(QueryFilter::or(vec![
        QueryFilter::eq(field("difficulty"), json!("difficult")),
        QueryFilter::and(vec![
            QueryFilter::eq(field("difficulty"), json!("medium")),
            QueryFilter::lt(field("price"), json!(1000)),
        ]),
    ]));

    assert_eq!(ids(&store.find(&query).await.unwrap()), vec!["t2", "t3"]);
}

#[tokio::test]
async fn test_unknown_collection_is_empty() {
    let store = seeded_store().await;
    let query = ListQuery::new("reviews");

    assert!(store.find(&query).await.unwrap().is_empty());
    assert_eq!(store.count(&query).await.unwrap(), 0);
}

// ========================================
// Sorting and windows
// ========================================

#[tokio::test]
async fn test_sort_is_stable_with_missing_fields_lowest() {
    let store = seeded_store().await;
    let query = ListQuery::new("tours").order_by(field("ratingsAverage"), SortOrder::Desc);

    // t1 and t5 tie and keep insertion order, t4 has no rating
    assert_eq!(
        ids(&store.find(&query).await.unwrap()),
        vec!["t2", "t1", "t5", "t3", "t4"]
    );

    let ascending = ListQuery::new("tours").order_by(field("ratingsAverage"), SortOrder::Asc);
    assert_eq!(ids(&store.find(&ascending).await.unwrap())[0], "t4");
}

#[tokio::test]
async fn test_secondary_sort_key() {
    let store = seeded_store().await;
    let query = ListQuery::new("tours")
        .order_by(field("difficulty"), SortOrder::Asc)
        .order_by(field("name"), SortOrder::Desc);

    assert_eq!(
        ids(&store.find(&query).await.unwrap()),
        vec!["t3", "t1", "t4", "t2", "t5"]
    );
}

#[tokio::test]
async fn test_page_window() {
    let store = seeded_store().await;
    let query = ListQuery::new("tours").page(PageSpec::new(2, 2));

    assert_eq!(ids(&store.find(&query).await.unwrap()), vec!["t3", "t4"]);
    // the count ignores the window
    assert_eq!(store.count(&query).await.unwrap(), 5);

    let past_end = ListQuery::new("tours").page(PageSpec::new(4, 2));
    assert!(store.find(&past_end).await.unwrap().is_empty());
}

// ========================================
// Projection
// ========================================

#[tokio::test]
async fn test_inclusion_projection() {
    let store = seeded_store().await;
    let query = ListQuery::new("tours")
        .filter(QueryFilter::eq(field("_id"), json!("t2")))
        .select(Projection::Include(vec![field("_id"), field("name")]));

    let documents = store.find(&query).await.unwrap();
    assert_eq!(
        documents,
        vec![json!({ "_id": "t2", "name": "The Sea Explorer" })]
    );
}

#[tokio::test]
async fn test_exclusion_projection_removes_nested_paths() {
    let store = seeded_store().await;
    let query = ListQuery::new("tours")
        .filter(QueryFilter::eq(field("_id"), json!("t1")))
        .select(Projection::Exclude(vec![
            field("__v"),
            field("startLocation.coordinates"),
            field("nothing.here"),
        ]));

    let document = &store.find(&query).await.unwrap()[0];
    assert!(document.get("__v").is_none());
    assert_eq!(document["startLocation"], json!({ "address": "Banff" }));
    assert_eq!(document["price"], json!(397));
}

#[test]
fn test_compare_values_ranks_types() {
    assert_eq!(compare_values(&json!(null), &json!("a")), Ordering::Less);
    assert_eq!(compare_values(&json!("z"), &json!(1)), Ordering::Less);
    assert_eq!(compare_values(&json!(100), &json!(100.0)), Ordering::Equal);
    assert_eq!(compare_values(&json!([1, 2]), &json!([9])), Ordering::Greater);
    assert_eq!(compare_values(&json!(true), &json!([])), Ordering::Less);
}
