//! Entity identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Error type for identifier parsing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdError {
    /// The raw text is not a valid identifier of the expected kind.
    #[error("invalid {kind} identifier '{value}'")]
    Invalid {
        /// Expected identifier kind name.
        kind: &'static str,
        /// The raw value that failed to parse.
        value: String,
    },
}

/// Identifier kind declared per entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdKind {
    /// Random v4 UUID, assigned on insert.
    Uuid,
    /// Auto-increment 64-bit sequence, assigned on insert.
    Sequence,
}

impl IdKind {
    /// Display name used in errors.
    pub fn display_name(&self) -> &'static str {
        match self {
            IdKind::Uuid => "uuid",
            IdKind::Sequence => "sequence",
        }
    }
}

/// A persisted entity identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityId {
    /// UUID identifier
    Uuid(Uuid),
    /// Sequence identifier
    Seq(u64),
}

impl EntityId {
    /// Parses raw path text as an identifier of the given kind.
    pub fn parse(kind: IdKind, raw: &str) -> Result<Self, IdError> {
        match kind {
            IdKind::Uuid => Uuid::parse_str(raw)
                .map(EntityId::Uuid)
                .map_err(|_| IdError::Invalid {
                    kind: "uuid",
                    value: raw.to_string(),
                }),
            IdKind::Sequence => raw
                .parse::<u64>()
                .map(EntityId::Seq)
                .map_err(|_| IdError::Invalid {
                    kind: "sequence",
                    value: raw.to_string(),
                }),
        }
    }

    /// Parses text without knowing the target identifier kind.
    ///
    /// Tries UUID first, then sequence. Used for reference values and
    /// criteria, where a well-formed id of the wrong kind simply matches
    /// nothing.
    pub fn parse_lenient(raw: &str) -> Result<Self, IdError> {
        if let Ok(uuid) = Uuid::parse_str(raw) {
            return Ok(EntityId::Uuid(uuid));
        }
        raw.parse::<u64>()
            .map(EntityId::Seq)
            .map_err(|_| IdError::Invalid {
                kind: "uuid or sequence",
                value: raw.to_string(),
            })
    }

    /// Parses a JSON value as an identifier (number or string form).
    pub fn from_json(json: &serde_json::Value) -> Result<Self, IdError> {
        match json {
            serde_json::Value::Number(n) => {
                n.as_u64().map(EntityId::Seq).ok_or_else(|| IdError::Invalid {
                    kind: "sequence",
                    value: n.to_string(),
                })
            }
            serde_json::Value::String(s) => Self::parse_lenient(s),
            other => Err(IdError::Invalid {
                kind: "uuid or sequence",
                value: other.to_string(),
            }),
        }
    }

    /// Wire JSON representation: UUIDs as strings, sequences as numbers.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            EntityId::Uuid(uuid) => serde_json::Value::String(uuid.to_string()),
            EntityId::Seq(seq) => serde_json::Value::from(*seq),
        }
    }

    /// Returns a fresh random UUID identifier.
    pub fn random_uuid() -> Self {
        EntityId::Uuid(Uuid::new_v4())
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Uuid(uuid) => write!(f, "{}", uuid),
            EntityId::Seq(seq) => write!(f, "{}", seq),
        }
    }
}
