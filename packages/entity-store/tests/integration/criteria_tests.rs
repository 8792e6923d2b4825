//! Criteria filtering tests against the registry façade.

use serde_json::json;

use entity_store::{ListOptions, StoreError};

use super::helpers::{filter, insert_order, registry};

fn list_refs(registry: &entity_store::Registry, filters: Vec<(String, String)>) -> Vec<String> {
    let options = ListOptions {
        filters,
        sort: vec!["id,asc".to_string()],
        ..ListOptions::default()
    };
    let (rows, _) = registry.list("orders", &options).unwrap();
    rows.iter()
        .map(|r| r["reference"].as_str().unwrap().to_string())
        .collect()
}

#[test]
fn test_equals_finds_matching_and_skips_rest() {
    let registry = registry();
    insert_order(&registry, "ORD-1", None);
    insert_order(&registry, "ORD-2", None);

    assert_eq!(
        list_refs(&registry, filter("reference.equals", "ORD-1")),
        vec!["ORD-1"]
    );
    assert!(list_refs(&registry, filter("reference.equals", "ORD-9")).is_empty());
}

#[test]
fn test_not_equals_on_id_excludes_exactly_one_row() {
    let registry = registry();
    insert_order(&registry, "ORD-1", None);
    insert_order(&registry, "ORD-2", None);
    insert_order(&registry, "ORD-3", None);

    let refs = list_refs(&registry, filter("id.notEquals", "2"));
    assert_eq!(refs, vec!["ORD-1", "ORD-3"]);
}

#[test]
fn test_contains_and_does_not_contain() {
    let registry = registry();
    insert_order(&registry, "SUMMER-1", None);
    insert_order(&registry, "AUTUMN-1", None);

    assert_eq!(
        list_refs(&registry, filter("reference.contains", "SUMMER")),
        vec!["SUMMER-1"]
    );
    assert_eq!(
        list_refs(&registry, filter("reference.doesNotContain", "SUMMER")),
        vec!["AUTUMN-1"]
    );
}

#[test]
fn test_out_of_set_enum_value_yields_empty_set() {
    let registry = registry();
    insert_order(&registry, "ORD-1", None);

    assert!(list_refs(&registry, filter("status.equals", "LOST")).is_empty());
    assert_eq!(
        list_refs(&registry, filter("status.notEquals", "LOST")),
        vec!["ORD-1"]
    );
    assert!(list_refs(&registry, filter("status.in", "LOST,MISLAID")).is_empty());
}

#[test]
fn test_in_matches_value_list() {
    let registry = registry();
    insert_order(&registry, "ORD-1", None);
    insert_order(&registry, "ORD-2", None);
    insert_order(&registry, "ORD-3", None);

    let refs = list_refs(&registry, filter("reference.in", "ORD-1,ORD-3"));
    assert_eq!(refs, vec!["ORD-1", "ORD-3"]);
}

#[test]
fn test_range_on_decimal_field() {
    let registry = registry();
    insert_order(&registry, "CHEAP", Some(5.0));
    insert_order(&registry, "MID", Some(20.0));
    insert_order(&registry, "DEAR", Some(100.0));

    assert_eq!(
        list_refs(&registry, filter("totalAmount.greaterThan", "10")),
        vec!["MID", "DEAR"]
    );
    assert_eq!(
        list_refs(&registry, filter("totalAmount.lessThanOrEqual", "20")),
        vec!["CHEAP", "MID"]
    );
}

#[test]
fn test_specified_splits_null_from_set() {
    let registry = registry();
    insert_order(&registry, "WITH", Some(10.0));
    insert_order(&registry, "WITHOUT", None);

    assert_eq!(
        list_refs(&registry, filter("totalAmount.specified", "true")),
        vec!["WITH"]
    );
    assert_eq!(
        list_refs(&registry, filter("totalAmount.specified", "false")),
        vec!["WITHOUT"]
    );
}

#[test]
fn test_null_field_matches_neither_equals_nor_not_equals() {
    let registry = registry();
    insert_order(&registry, "WITHOUT", None);

    assert!(list_refs(&registry, filter("totalAmount.equals", "10")).is_empty());
    assert!(list_refs(&registry, filter("totalAmount.notEquals", "10")).is_empty());
}

#[test]
fn test_reference_filter_by_target_id() {
    let registry = registry();
    let address = registry
        .insert("addresses", &json!({"street": "Main St 1", "city": "Springfield"}))
        .unwrap();
    registry
        .insert(
            "orders",
            &json!({"reference": "HOME", "status": "NEW", "addressId": address["id"]}),
        )
        .unwrap();
    insert_order(&registry, "NOWHERE", None);

    let key = "addressId.equals";
    let refs = list_refs(
        &registry,
        filter(key, address["id"].as_str().unwrap()),
    );
    assert_eq!(refs, vec!["HOME"]);

    assert_eq!(
        list_refs(&registry, filter("addressId.specified", "false")),
        vec!["NOWHERE"]
    );
}

#[test]
fn test_well_formed_unmatched_value_yields_empty_set() {
    let registry = registry();
    insert_order(&registry, "ORD-1", None);

    // UUID-shaped id against a sequence-keyed entity
    let refs = list_refs(
        &registry,
        filter("id.equals", "a1a2a3a4-b1b2-c1c2-d1d2-e1e2e3e4e5e6"),
    );
    assert!(refs.is_empty());
}

#[test]
fn test_unknown_filter_field_is_an_error() {
    let registry = registry();
    let err = registry
        .count("orders", &filter("bogus.equals", "x"))
        .unwrap_err();
    assert!(matches!(err, StoreError::Criteria(_)));
}

#[test]
fn test_filters_combine_conjunctively() {
    let registry = registry();
    insert_order(&registry, "ORD-1", Some(5.0));
    insert_order(&registry, "ORD-2", Some(50.0));

    let refs = list_refs(
        &registry,
        vec![
            ("reference.contains".to_string(), "ORD".to_string()),
            ("totalAmount.greaterThan".to_string(), "10".to_string()),
        ],
    );
    assert_eq!(refs, vec!["ORD-2"]);
}

#[test]
fn test_sort_with_criteria() {
    let registry = registry();
    insert_order(&registry, "B", Some(10.0));
    insert_order(&registry, "A", Some(20.0));
    insert_order(&registry, "C", None);

    let options = ListOptions {
        filters: filter("totalAmount.specified", "true"),
        sort: vec!["totalAmount,desc".to_string()],
        ..ListOptions::default()
    };
    let (rows, total) = registry.list("orders", &options).unwrap();
    assert_eq!(total, 2);
    assert_eq!(rows[0]["reference"], json!("A"));
    assert_eq!(rows[1]["reference"], json!("B"));
}
