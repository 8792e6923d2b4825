//! Entity schema definitions.

use serde::{Deserialize, Serialize};

use crate::id::IdKind;
use crate::value::FieldKind;

/// Scalar field declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Field name as it appears on the wire.
    pub name: String,
    /// Declared kind.
    pub kind: FieldKind,
    /// Whether the field must be non-null on every persisted record.
    #[serde(default)]
    pub required: bool,
}

/// Many-to-one reference declaration.
///
/// Required vs optional is a schema-level tagged property: any cycle in the
/// required-reference graph is rejected at model registration, so a valid
/// model can always be populated leaves-first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceDef {
    /// Reference name; the wire key is `<name>Id`.
    pub name: String,
    /// Target entity type name.
    pub target: String,
    /// Whether the reference must be set on every persisted record.
    #[serde(default)]
    pub required: bool,
}

/// Schema of one entity type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySchema {
    /// Entity type name (`Order`).
    pub name: String,
    /// Plural REST path segment (`orders`).
    pub resource: String,
    /// Identifier kind for this entity type.
    pub id_kind: IdKind,
    /// Scalar fields in declaration order.
    #[serde(default)]
    pub fields: Vec<FieldDef>,
    /// Many-to-one references in declaration order.
    #[serde(default)]
    pub references: Vec<ReferenceDef>,
}

impl EntitySchema {
    /// Creates a new schema builder.
    #[must_use]
    pub fn builder(name: &str, resource: &str, id_kind: IdKind) -> SchemaBuilder {
        SchemaBuilder {
            schema: EntitySchema {
                name: name.to_string(),
                resource: resource.to_string(),
                id_kind,
                fields: Vec::new(),
                references: Vec::new(),
            },
        }
    }

    /// Returns the field definition for the given name.
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns the reference definition for the given name.
    pub fn reference(&self, name: &str) -> Option<&ReferenceDef> {
        self.references.iter().find(|r| r.name == name)
    }

    /// Resolves a wire key ending in `Id` back to its reference definition.
    pub fn reference_by_key(&self, key: &str) -> Option<&ReferenceDef> {
        let name = key.strip_suffix(crate::REFERENCE_KEY_SUFFIX)?;
        self.reference(name)
    }
}

/// Chaining builder for [`EntitySchema`].
#[derive(Debug)]
pub struct SchemaBuilder {
    schema: EntitySchema,
}

impl SchemaBuilder {
    /// Adds an optional scalar field.
    #[must_use]
    pub fn field(mut self, name: &str, kind: FieldKind) -> Self {
        self.schema.fields.push(FieldDef {
            name: name.to_string(),
            kind,
            required: false,
        });
        self
    }

    /// Adds a required scalar field.
    #[must_use]
    pub fn required_field(mut self, name: &str, kind: FieldKind) -> Self {
        self.schema.fields.push(FieldDef {
            name: name.to_string(),
            kind,
            required: true,
        });
        self
    }

    /// Adds an optional many-to-one reference.
    #[must_use]
    pub fn reference(mut self, name: &str, target: &str) -> Self {
        self.schema.references.push(ReferenceDef {
            name: name.to_string(),
            target: target.to_string(),
            required: false,
        });
        self
    }

    /// Adds a required many-to-one reference.
    #[must_use]
    pub fn required_reference(mut self, name: &str, target: &str) -> Self {
        self.schema.references.push(ReferenceDef {
            name: name.to_string(),
            target: target.to_string(),
            required: true,
        });
        self
    }

    /// Builds the schema.
    #[must_use]
    pub fn build(self) -> EntitySchema {
        self.schema
    }
}

/// A complete entity model: the set of entity types served by one instance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityModel {
    /// Entity schemas in declaration order.
    pub entities: Vec<EntitySchema>,
}

impl EntityModel {
    /// Creates a model from a list of schemas.
    #[must_use]
    pub fn new(entities: Vec<EntitySchema>) -> Self {
        Self { entities }
    }
}
