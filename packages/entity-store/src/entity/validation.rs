//! Required-field validation for persisted records.

use std::collections::BTreeMap;

use entity_model::{EntityId, EntitySchema, Value};

use crate::error::StoreError;

/// Validates that every required field and reference is non-null.
///
/// Type correctness is established earlier, when wire values are parsed
/// against the schema; this check only guards the non-null invariant that
/// insert, replace, and merge-patch must all re-establish.
pub fn validate_required(
    schema: &EntitySchema,
    fields: &BTreeMap<String, Option<Value>>,
    refs: &BTreeMap<String, Option<EntityId>>,
) -> Result<(), StoreError> {
    for field in schema.fields.iter().filter(|f| f.required) {
        if fields.get(&field.name).map_or(true, Option::is_none) {
            return Err(StoreError::Validation {
                entity: schema.name.clone(),
                detail: format!("required field '{}' must not be null", field.name),
            });
        }
    }

    for reference in schema.references.iter().filter(|r| r.required) {
        if refs.get(&reference.name).map_or(true, Option::is_none) {
            return Err(StoreError::Validation {
                entity: schema.name.clone(),
                detail: format!(
                    "required reference '{}' must not be null",
                    entity_model::reference_key(&reference.name)
                ),
            });
        }
    }

    Ok(())
}
