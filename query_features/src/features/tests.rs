use super::*;
use crate::query_builder::{QueryCondition, SortOrder};
use crate::validation::ValidatedTableName;
use serde_json::json;

fn field(name: &str) -> FieldPath {
    FieldPath::new(name).unwrap()
}

fn features<'a>(query: &str, config: &'a QueryConfig) -> QueryFeatures<'a> {
    QueryFeatures::new(
        ListQuery::new("tours"),
        RawParameterMap::from_query_string(query),
        config,
    )
}

fn condition(filter: &QueryFilter) -> &QueryCondition {
    match filter {
        QueryFilter::Condition(condition) => condition,
        other => panic!("expected condition, got {:?}", other),
    }
}

// ========================================
// Filter stage
// ========================================

#[test]
fn test_filter_range_and_equality() {
    let config = QueryConfig::default();
    let query = features("price[gte]=100&difficulty=easy", &config).filter().build();

    assert_eq!(
        query.conditions(),
        &[
            QueryFilter::eq(field("difficulty"), json!("easy")),
            QueryFilter::gte(field("price"), json!(100)),
        ]
    );
}

#[test]
fn test_filter_skips_reserved_keys() {
    let config = QueryConfig::default();
    let built = features("page=2&sort=price&limit=5&fields=name&duration=5", &config).filter();

    assert_eq!(
        built.criteria().unwrap(),
        &[QueryFilter::in_values(field("duration"), vec![json!(5), json!("5")])]
    );
}

#[test]
fn test_reserved_keys_come_from_config() {
    let config = QueryConfig {
        reserved_keys: vec!["page".to_string(), "q".to_string()],
        ..QueryConfig::default()
    };
    let built = features("q=forest&sort=price", &config).filter();

    // `sort` is an ordinary field once it is no longer reserved
    assert_eq!(
        built.criteria().unwrap(),
        &[QueryFilter::eq(field("sort"), json!("price"))]
    );
}

#[test]
fn test_filter_range_on_both_ends() {
    let config = QueryConfig::default();
    let query = features("duration[gt]=3&duration[lte]=10", &config).filter().build();
    let operators: Vec<QueryOperator> = query
        .conditions()
        .iter()
        .map(|f| condition(f).operator)
        .collect();

    assert_eq!(operators, vec![QueryOperator::Gt, QueryOperator::Lte]);
}

#[test]
fn test_unknown_operator_is_a_sub_field_not_an_operator() {
    let config = QueryConfig::default();
    let query = features("price[ne]=5&price[$where]=1", &config).filter().build();

    // `ne` becomes a nested path, `$where` is not a valid name and is dropped
    assert_eq!(
        query.conditions(),
        &[QueryFilter::in_values(field("price.ne"), vec![json!(5), json!("5")])]
    );
}

#[test]
fn test_operator_tokens_inside_values_are_untouched() {
    let config = QueryConfig::default();
    let query = features("summary=gte+and+lt+are+words", &config).filter().build();

    assert_eq!(
        condition(&query.conditions()[0]).value,
        json!("gte and lt are words")
    );
}

#[test]
fn test_filter_nested_field_with_operator() {
    let config = QueryConfig::default();
    let query = features("startLocation[coordinates][lt]=40", &config).filter().build();

    assert_eq!(
        query.conditions(),
        &[QueryFilter::lt(field("startLocation.coordinates"), json!(40))]
    );
}

#[test]
fn test_filter_repeated_values_become_membership() {
    let config = QueryConfig::default();
    let query = features("difficulty=easy&difficulty=medium", &config).filter().build();

    assert_eq!(
        query.conditions(),
        &[QueryFilter::in_values(
            field("difficulty"),
            vec![json!("easy"), json!("medium")]
        )]
    );
}

#[test]
fn test_filter_invalid_field_names_are_dropped() {
    let config = QueryConfig::default();
    let query = features("na%27me=x&1abc=2&ok=1", &config).filter().build();
    assert_eq!(
        query.conditions(),
        &[QueryFilter::in_values(field("ok"), vec![json!(1), json!("1")])]
    );
}

#[test]
fn test_filter_keeps_base_query_conditions() {
    let config = QueryConfig::default();
    let base = ListQuery::new("reviews").filter(QueryFilter::eq(field("tour"), json!("t1")));
    let query = QueryFeatures::new(
        base,
        RawParameterMap::from_query_string("rating[gte]=4"),
        &config,
    )
    .filter()
    .build();

    assert_eq!(
        query.conditions(),
        &[
            QueryFilter::eq(field("tour"), json!("t1")),
            QueryFilter::gte(field("rating"), json!(4)),
        ]
    );
}

#[test]
fn test_typed_equality_also_matches_text() {
    let config = QueryConfig::default();
    let query = features("zip=01234&active=true&code=42&code=x", &config)
        .filter()
        .build();

    assert_eq!(
        query.conditions(),
        &[
            QueryFilter::in_values(field("active"), vec![json!(true), json!("true")]),
            QueryFilter::in_values(field("code"), vec![json!(42), json!("42"), json!("x")]),
            QueryFilter::in_values(field("zip"), vec![json!(1234), json!("01234")]),
        ]
    );
}

#[test]
fn test_range_bounds_stay_typed() {
    let config = QueryConfig::default();
    let query = features("zip[gte]=01234", &config).filter().build();

    assert_eq!(query.conditions(), &[QueryFilter::gte(field("zip"), json!(1234))]);
}

#[test]
fn test_coerce_scalar() {
    assert_eq!(coerce_scalar("100"), json!(100));
    assert_eq!(coerce_scalar("-3"), json!(-3));
    assert_eq!(coerce_scalar("4.5"), json!(4.5));
    assert_eq!(coerce_scalar("true"), json!(true));
    assert_eq!(coerce_scalar("false"), json!(false));
    assert_eq!(coerce_scalar("easy"), json!("easy"));
    assert_eq!(coerce_scalar(""), json!(""));
    assert_eq!(coerce_scalar("NaN"), json!("NaN"));
    assert_eq!(coerce_scalar("inf"), json!("inf"));
}

// ========================================
// Sort stage
// ========================================

#[test]
fn test_sort_multiple_keys_in_priority_order() {
    let config = QueryConfig::default();
    let query = features("sort=-ratingsAverage,price", &config).sort().build();

    assert_eq!(
        query.sort(),
        &[
            SortKey::new(field("ratingsAverage"), SortOrder::Desc),
            SortKey::new(field("price"), SortOrder::Asc),
        ]
    );
}

#[test]
fn test_sort_defaults_to_newest_first() {
    let config = QueryConfig::default();
    for raw in ["", "sort=", "sort=,,", "sort=bad%20name"] {
        let query = features(raw, &config).sort().build();
        assert_eq!(
            query.sort(),
            &[SortKey::new(field("createdAt"), SortOrder::Desc)],
            "input: {raw}"
        );
    }
}

#[test]
fn test_sort_drops_invalid_keys_only() {
    let config = QueryConfig::default();
    let query = features("sort=price,dur;ation,-name", &config).sort().build();
    assert_eq!(
        query.sort(),
        &[
            SortKey::new(field("price"), SortOrder::Asc),
            SortKey::new(field("name"), SortOrder::Desc),
        ]
    );
}

// ========================================
// Projection stage
// ========================================

#[test]
fn test_fields_include_identity() {
    let config = QueryConfig::default();
    let query = features("fields=name,price", &config).limit_fields().build();

    assert_eq!(
        query.projection(),
        &Projection::Include(vec![field("_id"), field("name"), field("price")])
    );
}

#[test]
fn test_fields_can_hide_identity() {
    let config = QueryConfig::default();
    let query = features("fields=name,-_id,-price", &config).limit_fields().build();

    assert_eq!(query.projection(), &Projection::Include(vec![field("name")]));
}

#[test]
fn test_fields_exclusion_only() {
    let config = QueryConfig::default();
    let query = features("fields=-description,-images", &config).limit_fields().build();

    assert_eq!(
        query.projection(),
        &Projection::Exclude(vec![field("description"), field("images")])
    );
}

#[test]
fn test_fields_default_hides_version() {
    let config = QueryConfig::default();
    for raw in ["", "fields=", "fields=%27"] {
        let query = features(raw, &config).limit_fields().build();
        assert_eq!(
            query.projection(),
            &Projection::Exclude(vec![field("__v")]),
            "input: {raw}"
        );
    }
}

#[test]
fn test_fields_with_only_nested_inclusions() {
    let config = QueryConfig::default();

    let query = features("fields=startLocation.address", &config).limit_fields().build();
    assert_eq!(query.projection(), &Projection::Exclude(vec![field("__v")]));

    let query = features("fields=-secret,startLocation.address", &config)
        .limit_fields()
        .build();
    assert_eq!(query.projection(), &Projection::Exclude(vec![field("secret")]));
}

#[test]
fn test_page_beyond_bigint_still_compiles() {
    let config = QueryConfig::default();
    let query = features("page=18446744073709551615&limit=10", &config)
        .paginate()
        .build();

    let (sql, _) = query.build_select(&ValidatedTableName::new("tours").unwrap());
    assert!(sql.ends_with("LIMIT 10 OFFSET 9223372036854775807"), "{sql}");
}

// ========================================
// Paginate stage
// ========================================

#[test]
fn test_paginate_defaults() {
    let config = QueryConfig::default();
    let built = features("difficulty=easy", &config).paginate();
    let page = built.page_spec().unwrap();

    assert_eq!((page.page(), page.limit(), page.skip()), (1, 100, 0));
}

#[test]
fn test_paginate_zero_limit_uses_default() {
    let config = QueryConfig::default();
    let query = features("page=3&limit=0", &config).paginate().build();

    assert_eq!(query.limit_value(), Some(100));
    assert_eq!(query.skip_value(), Some(200));
}

#[test]
fn test_paginate_uses_configured_defaults() {
    let config = QueryConfig {
        default_limit: 20,
        ..QueryConfig::default()
    };
    let query = features("page=2&limit=abc", &config).paginate().build();

    assert_eq!(query.limit_value(), Some(20));
    assert_eq!(query.skip_value(), Some(20));
}

// ========================================
// Whole pipeline
// ========================================

#[test]
fn test_stage_order_does_not_matter() {
    let config = QueryConfig::default();
    let raw = "price[lt]=500&sort=-price&fields=name,price&page=2&limit=3";

    let canonical = features(raw, &config)
        .filter()
        .sort()
        .limit_fields()
        .paginate()
        .build();
    let reordered = features(raw, &config)
        .paginate()
        .limit_fields()
        .filter()
        .sort()
        .build();

    assert_eq!(canonical, reordered);
    assert_eq!(canonical, features(raw, &config).all().build());
}

#[test]
fn test_stages_not_called_add_nothing() {
    let config = QueryConfig::default();
    let query = features("price=1&sort=price&page=2", &config).build();

    assert_eq!(query, ListQuery::new("tours"));
}

#[test]
fn test_calling_a_stage_twice_is_idempotent() {
    let config = QueryConfig::default();
    let once = features("price=1", &config).filter().build();
    let twice = features("price=1", &config).filter().filter().build();

    assert_eq!(once, twice);
}
