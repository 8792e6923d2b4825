//! Store error types.

use thiserror::Error;

use crate::criteria::CriteriaError;

/// Entity store operation errors.
#[derive(Error, Debug, Clone)]
pub enum StoreError {
    /// No entity type is registered for the resource path segment
    #[error("No entity type registered for resource '{resource}'")]
    ResourceNotFound { resource: String },

    /// Record not found
    #[error("{entity} with id '{id}' not found")]
    RecordNotFound { entity: String, id: String },

    /// Identity consistency violation (pre-set id on create, path/body mismatch)
    #[error("Identity conflict for {entity}: {detail}")]
    IdentityConflict { entity: String, detail: String },

    /// Required-field or type validation failure
    #[error("Invalid {entity}: {detail}")]
    Validation { entity: String, detail: String },

    /// Malformed path identifier
    #[error("Invalid {entity} identifier '{id}'")]
    InvalidId { entity: String, id: String },

    /// Criteria parsing failure
    #[error(transparent)]
    Criteria(#[from] CriteriaError),

    /// Malformed sort parameter
    #[error("Invalid sort '{key}': {detail}")]
    InvalidSort { key: String, detail: String },

    /// Entity type declared more than once in the model
    #[error("Entity type '{0}' is declared more than once")]
    DuplicateEntityType(String),

    /// Resource path declared more than once in the model
    #[error("Resource '{0}' is declared more than once")]
    DuplicateResource(String),

    /// Field/reference wire keys collide within one entity type
    #[error("Duplicate wire key '{key}' in entity '{entity}'")]
    DuplicateKey { entity: String, key: String },

    /// Reference targets an entity type absent from the model
    #[error("Reference '{entity}.{reference}' targets unknown entity '{target}'")]
    UnknownReferenceTarget {
        entity: String,
        reference: String,
        target: String,
    },

    /// Required references form a cycle; the model is unsatisfiable
    #[error("Required references form a cycle: {cycle}")]
    RequiredReferenceCycle { cycle: String },

    /// Lock poisoned (RwLock poisoned)
    #[error("Lock poisoned")]
    LockPoisoned,
}
