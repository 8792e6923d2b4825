//! DTO mapping and model validation tests.

use serde_json::{json, Value as Json};

use entity_model::{EntityModel, EntitySchema, FieldKind, IdKind};
use entity_store::{Registry, StoreConfig, StoreError};

use super::helpers::{order_model, registry};

#[test]
fn test_dto_round_trip_through_store() {
    let registry = registry();
    let body = json!({
        "reference": "ORD-1",
        "status": "NEW",
        "totalAmount": 12.5,
        "placedAt": "2024-01-15T10:30:00+00:00"
    });
    let created = registry.insert("orders", &body).unwrap();

    // Every wire key is present, including the unset reference.
    assert_eq!(created["reference"], json!("ORD-1"));
    assert_eq!(created["status"], json!("NEW"));
    assert_eq!(created["totalAmount"], json!(12.5));
    assert_eq!(created["placedAt"], json!("2024-01-15T10:30:00+00:00"));
    assert_eq!(created["addressId"], Json::Null);

    let found = registry.find("orders", "1").unwrap();
    assert_eq!(found, created);
}

#[test]
fn test_unknown_dto_key_is_rejected() {
    let registry = registry();
    let err = registry
        .insert(
            "orders",
            &json!({"reference": "x", "status": "NEW", "color": "red"}),
        )
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation { .. }));
}

#[test]
fn test_enum_value_outside_allowed_set_is_rejected() {
    let registry = registry();
    let err = registry
        .insert("orders", &json!({"reference": "x", "status": "LOST"}))
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation { .. }));
}

#[test]
fn test_reference_to_missing_record_is_rejected() {
    let registry = registry();
    let err = registry
        .insert(
            "orders",
            &json!({
                "reference": "x",
                "status": "NEW",
                "addressId": "a1a2a3a4-b1b2-c1c2-d1d2-e1e2e3e4e5e6"
            }),
        )
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation { .. }));
}

#[test]
fn test_reference_round_trips_as_target_id() {
    let registry = registry();
    let address = registry
        .insert("addresses", &json!({"street": "Main St 1", "city": "Springfield"}))
        .unwrap();
    let order = registry
        .insert(
            "orders",
            &json!({"reference": "x", "status": "NEW", "addressId": address["id"]}),
        )
        .unwrap();
    assert_eq!(order["addressId"], address["id"]);

    // Clearing via merge-patch null
    let cleared = registry
        .merge_patch("orders", "1", &json!({"addressId": null}))
        .unwrap();
    assert_eq!(cleared["addressId"], Json::Null);
}

#[test]
fn test_required_reference_cycle_is_rejected_at_registration() {
    let model = EntityModel::new(vec![
        EntitySchema::builder("Shipment", "shipments", IdKind::Uuid)
            .required_field("trackingNumber", FieldKind::String)
            .required_reference("order", "Order")
            .build(),
        EntitySchema::builder("Order", "orders", IdKind::Uuid)
            .required_field("reference", FieldKind::String)
            .required_reference("shipment", "Shipment")
            .build(),
    ]);
    let err = Registry::from_model(model, StoreConfig::default()).unwrap_err();
    assert!(matches!(err, StoreError::RequiredReferenceCycle { .. }));
}

#[test]
fn test_required_self_reference_is_rejected() {
    let model = EntityModel::new(vec![EntitySchema::builder(
        "Invoice",
        "invoices",
        IdKind::Uuid,
    )
    .required_field("invoiceNumber", FieldKind::String)
    .required_reference("rootInvoice", "Invoice")
    .build()]);
    let err = Registry::from_model(model, StoreConfig::default()).unwrap_err();
    assert!(matches!(err, StoreError::RequiredReferenceCycle { .. }));
}

#[test]
fn test_optional_self_reference_is_legal() {
    let model = EntityModel::new(vec![EntitySchema::builder(
        "Invoice",
        "invoices",
        IdKind::Uuid,
    )
    .required_field("invoiceNumber", FieldKind::String)
    .reference("rootInvoice", "Invoice")
    .build()]);
    let registry = Registry::from_model(model, StoreConfig::default()).unwrap();

    let root = registry
        .insert("invoices", &json!({"invoiceNumber": "INV-1"}))
        .unwrap();
    let child = registry
        .insert(
            "invoices",
            &json!({"invoiceNumber": "INV-2", "rootInvoiceId": root["id"]}),
        )
        .unwrap();
    assert_eq!(child["rootInvoiceId"], root["id"]);
}

#[test]
fn test_model_json_round_trip_registers_identically() {
    let model = order_model();
    let raw = serde_json::to_string(&model).unwrap();
    let decoded: EntityModel = serde_json::from_str(&raw).unwrap();
    let registry = Registry::from_model(decoded, StoreConfig::default()).unwrap();
    assert_eq!(registry.schemas().count(), 2);
}
