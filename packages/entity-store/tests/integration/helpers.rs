//! Shared fixtures for the integration suite.

use entity_model::{EntityModel, EntitySchema, FieldKind, IdKind};
use entity_store::{Registry, StoreConfig};
use serde_json::{json, Value as Json};

/// Order/address model with one optional reference.
pub fn order_model() -> EntityModel {
    EntityModel::new(vec![
        EntitySchema::builder("Address", "addresses", IdKind::Uuid)
            .required_field("street", FieldKind::String)
            .required_field("city", FieldKind::String)
            .build(),
        EntitySchema::builder("Order", "orders", IdKind::Sequence)
            .required_field("reference", FieldKind::String)
            .required_field(
                "status",
                FieldKind::Enum {
                    values: vec!["NEW".to_string(), "SHIPPED".to_string()],
                },
            )
            .field("totalAmount", FieldKind::Decimal)
            .field("placedAt", FieldKind::Timestamp)
            .reference("address", "Address")
            .build(),
    ])
}

pub fn registry() -> Registry {
    Registry::from_model(order_model(), StoreConfig::default()).unwrap()
}

/// Inserts an order and returns its DTO.
pub fn insert_order(registry: &Registry, reference: &str, amount: Option<f64>) -> Json {
    let mut body = json!({"reference": reference, "status": "NEW"});
    if let Some(amount) = amount {
        body["totalAmount"] = json!(amount);
    }
    registry.insert("orders", &body).unwrap()
}

pub fn count_all(registry: &Registry) -> u64 {
    registry.count("orders", &[]).unwrap()
}

pub fn filter(key: &str, value: &str) -> Vec<(String, String)> {
    vec![(key.to_string(), value.to_string())]
}
