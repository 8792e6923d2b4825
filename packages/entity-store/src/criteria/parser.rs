//! Query-parameter criteria parsing.

use entity_model::{EntityId, EntitySchema, FieldKind, Value};

use super::{Criteria, CriteriaError, Filter, Operand, Operator, Target};

impl Criteria {
    /// Parses `field.operator=value` pairs against an entity schema.
    ///
    /// Reserved pagination/sort keys must be stripped by the caller; every
    /// remaining key must resolve to the id, a scalar field, or a
    /// reference key (`<name>Id`).
    pub fn parse(schema: &EntitySchema, pairs: &[(String, String)]) -> Result<Self, CriteriaError> {
        let mut filters = Vec::with_capacity(pairs.len());
        for (key, raw_value) in pairs {
            filters.push(parse_filter(schema, key, raw_value)?);
        }
        Ok(Criteria::from_filters(filters))
    }
}

fn parse_filter(
    schema: &EntitySchema,
    key: &str,
    raw_value: &str,
) -> Result<Filter, CriteriaError> {
    let (field_part, op_part) =
        key.rsplit_once('.')
            .ok_or_else(|| CriteriaError::MissingOperator {
                key: key.to_string(),
            })?;

    let op = Operator::parse(op_part).ok_or_else(|| CriteriaError::UnknownOperator {
        op: op_part.to_string(),
    })?;

    let target = resolve_target(schema, field_part)?;
    check_operator(&target, op, field_part)?;
    let operand = parse_operand(&target, op, field_part, raw_value)?;

    Ok(Filter {
        target,
        op,
        operand,
    })
}

fn resolve_target(schema: &EntitySchema, field_part: &str) -> Result<Target, CriteriaError> {
    if field_part == "id" {
        return Ok(Target::Id);
    }
    if let Some(field) = schema.field(field_part) {
        return Ok(Target::Field {
            name: field.name.clone(),
            kind: field.kind.clone(),
        });
    }
    if let Some(reference) = schema.reference_by_key(field_part) {
        return Ok(Target::Reference {
            name: reference.name.clone(),
        });
    }
    Err(CriteriaError::UnknownField {
        entity: schema.name.clone(),
        field: field_part.to_string(),
    })
}

fn check_operator(target: &Target, op: Operator, field_part: &str) -> Result<(), CriteriaError> {
    if op.is_universal() {
        return Ok(());
    }

    let unsupported = |kind: &str| CriteriaError::UnsupportedOperator {
        field: field_part.to_string(),
        op: op.as_str().to_string(),
        kind: kind.to_string(),
    };

    match target {
        Target::Id => Err(unsupported("id")),
        Target::Reference { .. } => Err(unsupported("reference")),
        Target::Field { kind, .. } => {
            if op.is_contains() && kind.supports_contains() {
                Ok(())
            } else if op.is_range() && kind.supports_range() {
                Ok(())
            } else {
                Err(unsupported(kind.display_name()))
            }
        }
    }
}

fn parse_operand(
    target: &Target,
    op: Operator,
    field_part: &str,
    raw_value: &str,
) -> Result<Operand, CriteriaError> {
    if op == Operator::Specified {
        return match raw_value {
            "true" => Ok(Operand::Specified(true)),
            "false" => Ok(Operand::Specified(false)),
            other => Err(CriteriaError::InvalidValue {
                field: field_part.to_string(),
                detail: format!("specified takes true or false, got '{}'", other),
            }),
        };
    }

    match target {
        // Id-shaped targets parse leniently: a well-formed id of the wrong
        // kind matches nothing, and that is an empty result, not an error.
        Target::Id | Target::Reference { .. } => {
            if op == Operator::In {
                let ids = raw_value
                    .split(',')
                    .filter_map(|part| EntityId::parse_lenient(part.trim()).ok())
                    .collect();
                Ok(Operand::Ids(ids))
            } else {
                match EntityId::parse_lenient(raw_value) {
                    Ok(id) => Ok(Operand::Id(id)),
                    Err(_) => Ok(Operand::NoMatch),
                }
            }
        }
        Target::Field { name, kind } => {
            let invalid = |e: entity_model::ValueError| CriteriaError::InvalidValue {
                field: name.clone(),
                detail: e.to_string(),
            };
            // Substring needles are plain text, never validated against an
            // enum's allowed set.
            if op.is_contains() {
                return Ok(Operand::Value(Value::String(raw_value.to_string())));
            }
            // An enum value outside the allowed set matches nothing, like a
            // well-formed id of the wrong kind.
            let lenient = matches!(kind, FieldKind::Enum { .. });
            if op == Operator::In {
                if lenient {
                    let values = raw_value
                        .split(',')
                        .filter_map(|part| Value::from_text(kind, part.trim()).ok())
                        .collect();
                    Ok(Operand::Values(values))
                } else {
                    let values = raw_value
                        .split(',')
                        .map(|part| Value::from_text(kind, part.trim()).map_err(invalid))
                        .collect::<Result<Vec<_>, _>>()?;
                    Ok(Operand::Values(values))
                }
            } else {
                match Value::from_text(kind, raw_value) {
                    Ok(value) => Ok(Operand::Value(value)),
                    Err(_) if lenient => Ok(Operand::NoMatch),
                    Err(e) => Err(invalid(e)),
                }
            }
        }
    }
}
