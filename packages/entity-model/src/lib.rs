//! Field kinds, runtime values, identifiers, and schema types.
//!
//! This crate defines the vocabulary shared by the entity store and the
//! REST layer: what kinds of fields an entity can have, how values of
//! those kinds are represented at runtime, and how entity types describe
//! themselves (scalar fields, many-to-one references, identifier kind).

mod id;
mod schema;
mod value;

pub use id::{EntityId, IdError, IdKind};
pub use schema::{EntityModel, EntitySchema, FieldDef, ReferenceDef, SchemaBuilder};
pub use value::{FieldKind, Value, ValueError};

/// Query key suffix used for reference criteria and DTO keys (`addressId`).
pub const REFERENCE_KEY_SUFFIX: &str = "Id";

/// Returns the wire key for a reference name (`address` -> `addressId`).
#[must_use]
pub fn reference_key(name: &str) -> String {
    format!("{}{}", name, REFERENCE_KEY_SUFFIX)
}
