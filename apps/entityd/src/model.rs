//! Built-in demo entity model.
//!
//! An order/shipment/warehouse domain used when no schema file is given.
//! Required-reference edges all point leaves-first; the only cycle is the
//! optional `Invoice.rootInvoice` self-reference.

use entity_model::{EntityModel, EntitySchema, FieldKind, IdKind};

fn enum_kind(values: &[&str]) -> FieldKind {
    FieldKind::Enum {
        values: values.iter().map(|v| v.to_string()).collect(),
    }
}

/// Returns the default demo model.
pub fn default_model() -> EntityModel {
    EntityModel::new(vec![
        EntitySchema::builder("Address", "addresses", IdKind::Uuid)
            .required_field("line1", FieldKind::String)
            .field("line2", FieldKind::String)
            .required_field("city", FieldKind::String)
            .required_field("state", FieldKind::String)
            .required_field("country", FieldKind::String)
            .field("zipCode", FieldKind::String)
            .build(),
        EntitySchema::builder("StaffInfo", "staff-infos", IdKind::Sequence)
            .required_field("fullName", FieldKind::String)
            .required_field("role", FieldKind::String)
            .field("phone", FieldKind::String)
            .build(),
        EntitySchema::builder("WorkingUnit", "working-units", IdKind::Uuid)
            .required_field("name", FieldKind::String)
            .required_field("code", FieldKind::String)
            .reference("manager", "StaffInfo")
            .build(),
        EntitySchema::builder("Order", "orders", IdKind::Uuid)
            .required_field("reference", FieldKind::String)
            .required_field("status", enum_kind(&["NEW", "PAID", "SHIPPED", "CANCELLED"]))
            .required_field("totalAmount", FieldKind::Decimal)
            .field("placedAt", FieldKind::Timestamp)
            .reference("address", "Address")
            .build(),
        EntitySchema::builder("OrderItem", "order-items", IdKind::Uuid)
            .required_field("productName", FieldKind::String)
            .required_field("quantity", FieldKind::Integer)
            .required_field("unitPrice", FieldKind::Decimal)
            .required_reference("order", "Order")
            .build(),
        EntitySchema::builder("Invoice", "invoices", IdKind::Uuid)
            .required_field("invoiceNumber", FieldKind::String)
            .required_field("totalAmount", FieldKind::Decimal)
            .required_field("type", enum_kind(&["STANDARD", "PROFORMA", "CREDIT"]))
            .required_field(
                "paymentMethod",
                enum_kind(&["CARD", "TRANSFER", "CASH_ON_DELIVERY"]),
            )
            .field("issuedAt", FieldKind::Timestamp)
            .required_reference("order", "Order")
            .reference("rootInvoice", "Invoice")
            .build(),
        EntitySchema::builder("Shipment", "shipments", IdKind::Uuid)
            .required_field("trackingNumber", FieldKind::String)
            .required_field("carrier", FieldKind::String)
            .field("shippedAt", FieldKind::Timestamp)
            .field("deliveredAt", FieldKind::Timestamp)
            .required_reference("order", "Order")
            .build(),
        EntitySchema::builder(
            "WarehouseAssignment",
            "warehouse-assignments",
            IdKind::Uuid,
        )
        .required_field("assignedAt", FieldKind::Timestamp)
        .field("note", FieldKind::String)
        .required_reference("shipment", "Shipment")
        .required_reference("workingUnit", "WorkingUnit")
        .build(),
        EntitySchema::builder("UserAddress", "user-addresses", IdKind::Sequence)
            .required_field("label", FieldKind::String)
            .required_reference("address", "Address")
            .build(),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use entity_store::{Registry, StoreConfig};

    #[test]
    fn test_default_model_registers_cleanly() {
        let registry = Registry::from_model(default_model(), StoreConfig::default()).unwrap();
        assert_eq!(registry.schemas().count(), 9);
    }

    #[test]
    fn test_default_model_round_trips_as_json() {
        let model = default_model();
        let json = serde_json::to_string(&model).unwrap();
        let decoded: EntityModel = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.entities.len(), model.entities.len());
    }
}
