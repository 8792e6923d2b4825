//! Entity record representations.

use std::collections::BTreeMap;

use entity_model::{EntityId, Value};

/// A persisted entity record.
///
/// Every schema field and reference has an entry; absent values are `None`.
/// References hold the target record's identifier only.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityRecord {
    /// Assigned identifier
    pub id: EntityId,
    /// Scalar field values by field name
    pub fields: BTreeMap<String, Option<Value>>,
    /// Reference identifiers by reference name
    pub refs: BTreeMap<String, Option<EntityId>>,
}

impl EntityRecord {
    /// Returns the non-null value of a field, if set.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name).and_then(|v| v.as_ref())
    }

    /// Returns the referenced identifier, if set.
    pub fn reference(&self, name: &str) -> Option<EntityId> {
        self.refs.get(name).copied().flatten()
    }
}

/// Input for insert and full-replace operations.
///
/// Carries the full mutable state of a record; fields absent from the wire
/// body arrive as `None` (full update replaces all mutable fields).
#[derive(Debug, Clone, Default)]
pub struct NewRecord {
    /// Identifier carried in the body, if any. Rejected on create,
    /// required to match the path on full update.
    pub id: Option<EntityId>,
    /// Scalar field values by field name
    pub fields: BTreeMap<String, Option<Value>>,
    /// Reference identifiers by reference name
    pub refs: BTreeMap<String, Option<EntityId>>,
}

/// Input for merge-patch operations.
///
/// Only keys explicitly present in the patch body appear here; a `None`
/// entry means the patch sets the field to null.
#[derive(Debug, Clone, Default)]
pub struct RecordPatch {
    /// Identifier carried in the body, if any; must match the path id.
    pub id: Option<EntityId>,
    /// Patched scalar fields
    pub fields: BTreeMap<String, Option<Value>>,
    /// Patched references
    pub refs: BTreeMap<String, Option<EntityId>>,
}

impl RecordPatch {
    /// Returns `true` if the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.refs.is_empty()
    }
}
