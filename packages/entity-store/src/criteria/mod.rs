//! Criteria filter engine.
//!
//! Turns `field.operator=value` query parameters into a typed conjunctive
//! predicate AST. Filters are parsed against an entity schema, so every
//! operator/kind combination is checked up front; values that parse but
//! match nothing yield empty result sets rather than errors.

mod parser;
mod predicate;

use entity_model::{EntityId, FieldKind, Value};
use thiserror::Error;

/// Criteria parsing errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CriteriaError {
    /// Filter key names no field, reference, or `id`
    #[error("Unknown filter field '{field}' for entity '{entity}'")]
    UnknownField { entity: String, field: String },

    /// Filter key has no `.operator` suffix
    #[error("Filter key '{key}' is missing an operator suffix")]
    MissingOperator { key: String },

    /// Operator suffix is not a known operator
    #[error("Unknown filter operator '{op}'")]
    UnknownOperator { op: String },

    /// Operator does not apply to the field's kind
    #[error("Operator '{op}' is not supported for {kind} field '{field}'")]
    UnsupportedOperator {
        field: String,
        op: String,
        kind: String,
    },

    /// Filter value failed to parse for the field's kind
    #[error("Invalid filter value for '{field}': {detail}")]
    InvalidValue { field: String, detail: String },
}

/// Filter operators, named as they appear in query parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Equals,
    NotEquals,
    In,
    Specified,
    Contains,
    DoesNotContain,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
}

impl Operator {
    /// Parses an operator suffix (`equals`, `greaterThan`, ...).
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "equals" => Some(Operator::Equals),
            "notEquals" => Some(Operator::NotEquals),
            "in" => Some(Operator::In),
            "specified" => Some(Operator::Specified),
            "contains" => Some(Operator::Contains),
            "doesNotContain" => Some(Operator::DoesNotContain),
            "greaterThan" => Some(Operator::GreaterThan),
            "greaterThanOrEqual" => Some(Operator::GreaterThanOrEqual),
            "lessThan" => Some(Operator::LessThan),
            "lessThanOrEqual" => Some(Operator::LessThanOrEqual),
            _ => None,
        }
    }

    /// Query-parameter spelling of this operator.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Equals => "equals",
            Operator::NotEquals => "notEquals",
            Operator::In => "in",
            Operator::Specified => "specified",
            Operator::Contains => "contains",
            Operator::DoesNotContain => "doesNotContain",
            Operator::GreaterThan => "greaterThan",
            Operator::GreaterThanOrEqual => "greaterThanOrEqual",
            Operator::LessThan => "lessThan",
            Operator::LessThanOrEqual => "lessThanOrEqual",
        }
    }

    /// Operators applicable to every target kind.
    pub fn is_universal(&self) -> bool {
        matches!(
            self,
            Operator::Equals | Operator::NotEquals | Operator::In | Operator::Specified
        )
    }

    /// Substring operators.
    pub fn is_contains(&self) -> bool {
        matches!(self, Operator::Contains | Operator::DoesNotContain)
    }

    /// Ordering operators.
    pub fn is_range(&self) -> bool {
        matches!(
            self,
            Operator::GreaterThan
                | Operator::GreaterThanOrEqual
                | Operator::LessThan
                | Operator::LessThanOrEqual
        )
    }
}

/// What a filter applies to.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    /// The entity identifier (`id.equals=...`)
    Id,
    /// A scalar field
    Field { name: String, kind: FieldKind },
    /// A reference, filtered by the referenced identifier (`addressId.equals=...`)
    Reference { name: String },
}

/// Parsed filter operand.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Single typed value
    Value(Value),
    /// Value list for `in`
    Values(Vec<Value>),
    /// Single identifier
    Id(EntityId),
    /// Identifier list for `in`; unparseable entries are dropped since
    /// they cannot match any row
    Ids(Vec<EntityId>),
    /// Null check for `specified`
    Specified(bool),
    /// An id value of no recognizable shape; matches no row
    NoMatch,
}

/// One parsed filter.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub target: Target,
    pub op: Operator,
    pub operand: Operand,
}

/// A conjunction of filters. Empty criteria match every record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Criteria {
    filters: Vec<Filter>,
}

impl Criteria {
    /// Criteria that match every record.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns the parsed filters.
    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub(crate) fn from_filters(filters: Vec<Filter>) -> Self {
        Self { filters }
    }
}
