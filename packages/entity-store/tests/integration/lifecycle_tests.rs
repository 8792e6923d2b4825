//! Record lifecycle tests: create, read, update, delete, and counts.

use serde_json::{json, Value as Json};

use entity_store::{ListOptions, StoreError};

use super::helpers::{count_all, filter, insert_order, registry};

#[test]
fn test_insert_increments_count_by_one() {
    let registry = registry();
    assert_eq!(count_all(&registry), 0);

    insert_order(&registry, "ORD-1", None);
    assert_eq!(count_all(&registry), 1);

    insert_order(&registry, "ORD-2", None);
    assert_eq!(count_all(&registry), 2);
}

#[test]
fn test_delete_decrements_count_by_one() {
    let registry = registry();
    let order = insert_order(&registry, "ORD-1", None);
    insert_order(&registry, "ORD-2", None);
    assert_eq!(count_all(&registry), 2);

    registry
        .delete("orders", order["id"].as_u64().unwrap().to_string().as_str())
        .unwrap();
    assert_eq!(count_all(&registry), 1);
}

#[test]
fn test_delete_absent_record_is_an_error() {
    let registry = registry();
    let err = registry.delete("orders", "42").unwrap_err();
    assert!(matches!(err, StoreError::RecordNotFound { .. }));
}

#[test]
fn test_no_op_update_leaves_count_unchanged() {
    let registry = registry();
    let order = insert_order(&registry, "ORD-1", Some(10.0));
    assert_eq!(count_all(&registry), 1);

    let body = order.clone();
    let updated = registry.replace("orders", "1", &body).unwrap();
    assert_eq!(updated, order);
    assert_eq!(count_all(&registry), 1);
}

#[test]
fn test_replace_clears_absent_optional_fields() {
    let registry = registry();
    insert_order(&registry, "ORD-1", Some(10.0));

    let updated = registry
        .replace(
            "orders",
            "1",
            &json!({"id": 1, "reference": "ORD-1", "status": "SHIPPED"}),
        )
        .unwrap();
    assert_eq!(updated["totalAmount"], Json::Null);
    assert_eq!(updated["status"], json!("SHIPPED"));
}

#[test]
fn test_merge_patch_leaves_absent_fields_untouched() {
    let registry = registry();
    insert_order(&registry, "ORD-1", Some(10.0));

    let patched = registry
        .merge_patch("orders", "1", &json!({"status": "SHIPPED"}))
        .unwrap();
    assert_eq!(patched["totalAmount"], json!(10.0));
    assert_eq!(patched["reference"], json!("ORD-1"));
    assert_eq!(patched["status"], json!("SHIPPED"));
}

#[test]
fn test_merge_patch_cannot_clear_required_field() {
    let registry = registry();
    insert_order(&registry, "ORD-1", None);

    let err = registry
        .merge_patch("orders", "1", &json!({"reference": null}))
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation { .. }));

    // record unchanged
    let found = registry.find("orders", "1").unwrap();
    assert_eq!(found["reference"], json!("ORD-1"));
}

#[test]
fn test_sequence_ids_are_not_reused_after_delete() {
    let registry = registry();
    insert_order(&registry, "ORD-1", None);
    registry.delete("orders", "1").unwrap();

    let next = insert_order(&registry, "ORD-2", None);
    assert_eq!(next["id"], json!(2));
}

#[test]
fn test_uuid_entities_get_distinct_ids() {
    let registry = registry();
    let a = registry
        .insert("addresses", &json!({"street": "Main St 1", "city": "Springfield"}))
        .unwrap();
    let b = registry
        .insert("addresses", &json!({"street": "Main St 2", "city": "Springfield"}))
        .unwrap();
    assert_ne!(a["id"], b["id"]);
    assert!(a["id"].is_string());

    let found = registry
        .find("addresses", a["id"].as_str().unwrap())
        .unwrap();
    assert_eq!(found, a);
}

#[test]
fn test_list_reports_total_across_pages() {
    let registry = registry();
    for i in 0..7 {
        insert_order(&registry, &format!("ORD-{}", i), None);
    }

    let options = ListOptions {
        page: Some(2),
        size: Some(3),
        sort: vec!["id,asc".to_string()],
        ..ListOptions::default()
    };
    let (rows, total) = registry.list("orders", &options).unwrap();
    assert_eq!(total, 7);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["reference"], json!("ORD-6"));
}

#[test]
fn test_list_beyond_last_page_is_empty() {
    let registry = registry();
    insert_order(&registry, "ORD-1", None);

    let options = ListOptions {
        page: Some(5),
        size: Some(10),
        ..ListOptions::default()
    };
    let (rows, total) = registry.list("orders", &options).unwrap();
    assert_eq!(total, 1);
    assert!(rows.is_empty());
}

#[test]
fn test_count_with_filter() {
    let registry = registry();
    insert_order(&registry, "ORD-1", Some(5.0));
    insert_order(&registry, "ORD-2", Some(50.0));
    insert_order(&registry, "ORD-3", None);

    assert_eq!(
        registry
            .count("orders", &filter("totalAmount.greaterThan", "10"))
            .unwrap(),
        1
    );
    assert_eq!(
        registry
            .count("orders", &filter("totalAmount.specified", "false"))
            .unwrap(),
        1
    );
}
