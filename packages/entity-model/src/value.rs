//! Field kinds and runtime value representation.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for value parsing and validation.
#[derive(Debug, Error, PartialEq)]
pub enum ValueError {
    /// The JSON value does not match the declared field kind.
    #[error("expected {expected} value, got {got}")]
    KindMismatch {
        /// Human-readable name of the expected kind.
        expected: String,
        /// Short description of what was received.
        got: String,
    },

    /// A timestamp string was not valid RFC 3339.
    #[error("invalid timestamp '{value}': {detail}")]
    InvalidTimestamp { value: String, detail: String },

    /// An enum value is not in the allowed set.
    #[error("value '{value}' is not one of the allowed enum values")]
    UnknownEnumValue { value: String },
}

/// Kinds of scalar fields supported by entity schemas.
///
/// Enum fields carry their allowed value set in the schema; at runtime an
/// enum value is stored as a validated string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// UTF-8 string
    String,
    /// 64-bit signed integer
    Integer,
    /// 64-bit floating point decimal
    Decimal,
    /// Boolean value
    Boolean,
    /// RFC 3339 timestamp, stored in UTC
    Timestamp,
    /// Closed string set declared by the schema
    Enum {
        /// Allowed values, in declaration order.
        values: Vec<String>,
    },
}

impl FieldKind {
    /// Returns `true` if values of this kind have a total order usable by
    /// range operators (`greaterThan`, `lessThan`, ...).
    pub fn supports_range(&self) -> bool {
        matches!(
            self,
            FieldKind::Integer | FieldKind::Decimal | FieldKind::Timestamp
        )
    }

    /// Returns `true` if substring operators (`contains`,
    /// `doesNotContain`) apply to this kind. Enum values are strings at
    /// runtime, so they qualify.
    pub fn supports_contains(&self) -> bool {
        matches!(self, FieldKind::String | FieldKind::Enum { .. })
    }

    /// Short display name used in error messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Integer => "integer",
            FieldKind::Decimal => "decimal",
            FieldKind::Boolean => "boolean",
            FieldKind::Timestamp => "timestamp",
            FieldKind::Enum { .. } => "enum",
        }
    }
}

/// Runtime value of a scalar field.
///
/// Each variant corresponds to a [`FieldKind`]; enum values are stored as
/// strings after validation against the schema's allowed set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// UTF-8 string (also the representation of enum values)
    String(String),
    /// 64-bit signed integer
    Integer(i64),
    /// 64-bit floating point decimal
    Decimal(f64),
    /// Boolean value
    Boolean(bool),
    /// UTC timestamp
    Timestamp(DateTime<Utc>),
}

impl Value {
    /// Parses a JSON value according to the declared field kind.
    ///
    /// # Arguments
    /// * `kind` - Declared kind of the field
    /// * `json` - Incoming JSON value (must not be JSON null)
    ///
    /// # Returns
    /// `Result<Value, ValueError>` containing the typed value or an error.
    pub fn from_json(kind: &FieldKind, json: &serde_json::Value) -> Result<Self, ValueError> {
        let mismatch = |got: &serde_json::Value| ValueError::KindMismatch {
            expected: kind.display_name().to_string(),
            got: json_type_name(got).to_string(),
        };

        match kind {
            FieldKind::String => json
                .as_str()
                .map(|s| Value::String(s.to_string()))
                .ok_or_else(|| mismatch(json)),
            FieldKind::Integer => json
                .as_i64()
                .map(Value::Integer)
                .ok_or_else(|| mismatch(json)),
            FieldKind::Decimal => json
                .as_f64()
                .map(Value::Decimal)
                .ok_or_else(|| mismatch(json)),
            FieldKind::Boolean => json
                .as_bool()
                .map(Value::Boolean)
                .ok_or_else(|| mismatch(json)),
            FieldKind::Timestamp => {
                let raw = json.as_str().ok_or_else(|| mismatch(json))?;
                let parsed = DateTime::parse_from_rfc3339(raw).map_err(|e| {
                    ValueError::InvalidTimestamp {
                        value: raw.to_string(),
                        detail: e.to_string(),
                    }
                })?;
                Ok(Value::Timestamp(parsed.with_timezone(&Utc)))
            }
            FieldKind::Enum { values } => {
                let raw = json.as_str().ok_or_else(|| mismatch(json))?;
                if !values.iter().any(|v| v == raw) {
                    return Err(ValueError::UnknownEnumValue {
                        value: raw.to_string(),
                    });
                }
                Ok(Value::String(raw.to_string()))
            }
        }
    }

    /// Parses a raw query-parameter string according to the field kind.
    ///
    /// Criteria values arrive as plain strings, so string-ish kinds take
    /// the text as-is and the rest parse from their canonical text form.
    pub fn from_text(kind: &FieldKind, raw: &str) -> Result<Self, ValueError> {
        match kind {
            FieldKind::String => Ok(Value::String(raw.to_string())),
            FieldKind::Integer => raw.parse::<i64>().map(Value::Integer).map_err(|_| {
                ValueError::KindMismatch {
                    expected: "integer".to_string(),
                    got: format!("'{}'", raw),
                }
            }),
            FieldKind::Decimal => raw.parse::<f64>().map(Value::Decimal).map_err(|_| {
                ValueError::KindMismatch {
                    expected: "decimal".to_string(),
                    got: format!("'{}'", raw),
                }
            }),
            FieldKind::Boolean => match raw {
                "true" => Ok(Value::Boolean(true)),
                "false" => Ok(Value::Boolean(false)),
                other => Err(ValueError::KindMismatch {
                    expected: "boolean".to_string(),
                    got: format!("'{}'", other),
                }),
            },
            FieldKind::Timestamp => {
                let parsed = DateTime::parse_from_rfc3339(raw).map_err(|e| {
                    ValueError::InvalidTimestamp {
                        value: raw.to_string(),
                        detail: e.to_string(),
                    }
                })?;
                Ok(Value::Timestamp(parsed.with_timezone(&Utc)))
            }
            FieldKind::Enum { values } => {
                if !values.iter().any(|v| v == raw) {
                    return Err(ValueError::UnknownEnumValue {
                        value: raw.to_string(),
                    });
                }
                Ok(Value::String(raw.to_string()))
            }
        }
    }

    /// Converts this value to its wire JSON representation.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Integer(i) => serde_json::Value::from(*i),
            Value::Decimal(d) => serde_json::Value::from(*d),
            Value::Boolean(b) => serde_json::Value::Bool(*b),
            Value::Timestamp(ts) => serde_json::Value::String(ts.to_rfc3339()),
        }
    }

    /// Compares two values of the same kind.
    ///
    /// Returns `None` for cross-kind comparisons and for NaN decimals.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
            (Value::Decimal(a), Value::Decimal(b)) => a.partial_cmp(b),
            (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
            (Value::Timestamp(a), Value::Timestamp(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

fn json_type_name(json: &serde_json::Value) -> &'static str {
    match json {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
