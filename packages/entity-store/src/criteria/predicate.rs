//! Criteria evaluation against entity records.

use std::cmp::Ordering;

use entity_model::{EntityId, Value};

use crate::entity::EntityRecord;

use super::{Criteria, Filter, Operand, Operator, Target};

impl Criteria {
    /// Returns `true` if the record satisfies every filter.
    pub fn matches(&self, record: &EntityRecord) -> bool {
        self.filters().iter().all(|f| f.matches(record))
    }
}

impl Filter {
    fn matches(&self, record: &EntityRecord) -> bool {
        match &self.target {
            Target::Id => eval_id(self.op, &self.operand, Some(record.id)),
            Target::Reference { name } => eval_id(self.op, &self.operand, record.reference(name)),
            Target::Field { name, .. } => eval_value(self.op, &self.operand, record.field(name)),
        }
    }
}

fn eval_id(op: Operator, operand: &Operand, actual: Option<EntityId>) -> bool {
    if let Operand::Specified(want) = operand {
        return actual.is_some() == *want;
    }
    let Some(id) = actual else {
        // A null reference satisfies only specified=false.
        return false;
    };
    match (op, operand) {
        (Operator::Equals, Operand::Id(x)) => id == *x,
        (Operator::NotEquals, Operand::Id(x)) => id != *x,
        (Operator::In, Operand::Ids(xs)) => xs.contains(&id),
        // No persisted row carries an id of unrecognizable shape.
        (Operator::Equals | Operator::In, Operand::NoMatch) => false,
        (Operator::NotEquals, Operand::NoMatch) => true,
        _ => false,
    }
}

fn eval_value(op: Operator, operand: &Operand, actual: Option<&Value>) -> bool {
    if let Operand::Specified(want) = operand {
        return actual.is_some() == *want;
    }
    let Some(value) = actual else {
        // SQL-style tri-state: null matches neither equals nor notEquals.
        return false;
    };
    match (op, operand) {
        (Operator::Equals, Operand::Value(x)) => value == x,
        (Operator::NotEquals, Operand::Value(x)) => value != x,
        (Operator::In, Operand::Values(xs)) => xs.contains(value),
        (Operator::Contains, Operand::Value(Value::String(needle))) => match value {
            Value::String(s) => s.contains(needle),
            _ => false,
        },
        (Operator::DoesNotContain, Operand::Value(Value::String(needle))) => match value {
            Value::String(s) => !s.contains(needle),
            _ => false,
        },
        (Operator::GreaterThan, Operand::Value(x)) => {
            value.compare(x) == Some(Ordering::Greater)
        }
        (Operator::GreaterThanOrEqual, Operand::Value(x)) => {
            matches!(value.compare(x), Some(Ordering::Greater | Ordering::Equal))
        }
        (Operator::LessThan, Operand::Value(x)) => value.compare(x) == Some(Ordering::Less),
        (Operator::LessThanOrEqual, Operand::Value(x)) => {
            matches!(value.compare(x), Some(Ordering::Less | Ordering::Equal))
        }
        _ => false,
    }
}
