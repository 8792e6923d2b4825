//! Wire DTO mapping.
//!
//! Converts between persisted records and their flat JSON form: `id`, each
//! scalar field by name, and each reference as `<name>Id`. Absent optional
//! values serialize as explicit JSON nulls so every DTO of an entity type
//! carries the same key set.

use std::collections::BTreeMap;

use entity_model::{reference_key, EntityId, EntitySchema, Value};
use serde_json::{Map, Value as Json};

use crate::entity::{NewRecord, RecordPatch};
use crate::error::StoreError;

/// Serializes a record into its wire DTO.
pub fn to_dto(schema: &EntitySchema, id: EntityId, fields: &BTreeMap<String, Option<Value>>, refs: &BTreeMap<String, Option<EntityId>>) -> Json {
    let mut object = Map::with_capacity(1 + schema.fields.len() + schema.references.len());
    object.insert("id".to_string(), id.to_json());

    for field in &schema.fields {
        let json = fields
            .get(&field.name)
            .and_then(|v| v.as_ref())
            .map_or(Json::Null, Value::to_json);
        object.insert(field.name.clone(), json);
    }

    for reference in &schema.references {
        let json = refs
            .get(&reference.name)
            .and_then(|v| v.as_ref())
            .map_or(Json::Null, EntityId::to_json);
        object.insert(reference_key(&reference.name), json);
    }

    Json::Object(object)
}

/// Parses a full DTO body into a new record.
///
/// Every key must be `id`, a declared field name, or a declared reference
/// key; anything else is a validation error. Absent and null keys both map
/// to null, so create and replace bodies may omit optional values.
pub fn from_dto(schema: &EntitySchema, body: &Json) -> Result<NewRecord, StoreError> {
    let object = as_object(schema, body)?;
    check_known_keys(schema, object)?;

    let mut record = NewRecord::default();

    if let Some(raw) = object.get("id").filter(|v| !v.is_null()) {
        record.id = Some(parse_id(schema, raw)?);
    }

    for field in &schema.fields {
        let value = match object.get(&field.name) {
            None | Some(Json::Null) => None,
            Some(raw) => Some(parse_field(schema, &field.name, &field.kind, raw)?),
        };
        record.fields.insert(field.name.clone(), value);
    }

    for reference in &schema.references {
        let key = reference_key(&reference.name);
        let id = match object.get(&key) {
            None | Some(Json::Null) => None,
            Some(raw) => Some(parse_reference(schema, &key, raw)?),
        };
        record.refs.insert(reference.name.clone(), id);
    }

    Ok(record)
}

/// Parses a merge-patch body.
///
/// Only keys present in the body land in the patch; a present null clears
/// the value, an absent key leaves it untouched.
pub fn patch_from_dto(schema: &EntitySchema, body: &Json) -> Result<RecordPatch, StoreError> {
    let object = as_object(schema, body)?;
    check_known_keys(schema, object)?;

    let mut patch = RecordPatch::default();

    if let Some(raw) = object.get("id").filter(|v| !v.is_null()) {
        patch.id = Some(parse_id(schema, raw)?);
    }

    for field in &schema.fields {
        if let Some(raw) = object.get(&field.name) {
            let value = if raw.is_null() {
                None
            } else {
                Some(parse_field(schema, &field.name, &field.kind, raw)?)
            };
            patch.fields.insert(field.name.clone(), value);
        }
    }

    for reference in &schema.references {
        let key = reference_key(&reference.name);
        if let Some(raw) = object.get(&key) {
            let id = if raw.is_null() {
                None
            } else {
                Some(parse_reference(schema, &key, raw)?)
            };
            patch.refs.insert(reference.name.clone(), id);
        }
    }

    Ok(patch)
}

fn as_object<'a>(
    schema: &EntitySchema,
    body: &'a Json,
) -> Result<&'a Map<String, Json>, StoreError> {
    body.as_object().ok_or_else(|| StoreError::Validation {
        entity: schema.name.clone(),
        detail: "request body must be a JSON object".to_string(),
    })
}

fn check_known_keys(schema: &EntitySchema, object: &Map<String, Json>) -> Result<(), StoreError> {
    for key in object.keys() {
        let known = key == "id"
            || schema.field(key).is_some()
            || schema.reference_by_key(key).is_some();
        if !known {
            return Err(StoreError::Validation {
                entity: schema.name.clone(),
                detail: format!("unknown property '{}'", key),
            });
        }
    }
    Ok(())
}

fn parse_id(schema: &EntitySchema, raw: &Json) -> Result<EntityId, StoreError> {
    EntityId::from_json(raw).map_err(|e| StoreError::Validation {
        entity: schema.name.clone(),
        detail: format!("invalid id: {}", e),
    })
}

fn parse_field(
    schema: &EntitySchema,
    name: &str,
    kind: &entity_model::FieldKind,
    raw: &Json,
) -> Result<Value, StoreError> {
    Value::from_json(kind, raw).map_err(|e| StoreError::Validation {
        entity: schema.name.clone(),
        detail: format!("invalid value for '{}': {}", name, e),
    })
}

fn parse_reference(schema: &EntitySchema, key: &str, raw: &Json) -> Result<EntityId, StoreError> {
    EntityId::from_json(raw).map_err(|e| StoreError::Validation {
        entity: schema.name.clone(),
        detail: format!("invalid value for '{}': {}", key, e),
    })
}
