//! # Filter Predicates
//!
//! Storage-agnostic filter representation: field constraints combined
//! with `and`/`or`.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::resource::Resource;

/// Field constraint operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOperator {
    Eq,
    /// Not equal (`neq`, or its synonym `ne`)
    Neq,
    In,
    Nin,
    Lt,
    Gt,
    Lte,
    Gte,
}

impl FilterOperator {
    /// Parse an operator name
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "eq" => Some(FilterOperator::Eq),
            "neq" | "ne" => Some(FilterOperator::Neq),
            "in" => Some(FilterOperator::In),
            "nin" => Some(FilterOperator::Nin),
            "lt" => Some(FilterOperator::Lt),
            "gt" => Some(FilterOperator::Gt),
            "lte" => Some(FilterOperator::Lte),
            "gte" => Some(FilterOperator::Gte),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Eq => "eq",
            FilterOperator::Neq => "neq",
            FilterOperator::In => "in",
            FilterOperator::Nin => "nin",
            FilterOperator::Lt => "lt",
            FilterOperator::Gt => "gt",
            FilterOperator::Lte => "lte",
            FilterOperator::Gte => "gte",
        }
    }

    /// `in`/`nin` take a list of values
    pub fn takes_list(&self) -> bool {
        matches!(self, FilterOperator::In | FilterOperator::Nin)
    }

    /// Ordering operators take a string or a number
    pub fn is_ordering(&self) -> bool {
        matches!(
            self,
            FilterOperator::Lt | FilterOperator::Gt | FilterOperator::Lte | FilterOperator::Gte
        )
    }
}

/// `{field, operator, value}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldConstraint {
    pub field: String,
    pub operator: FilterOperator,
    pub value: Value,
}

impl FieldConstraint {
    pub fn new(field: impl Into<String>, operator: FilterOperator, value: Value) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
        }
    }

    pub fn eq(field: impl Into<String>, value: Value) -> Self {
        Self::new(field, FilterOperator::Eq, value)
    }

    /// The constraint with numbers and booleans in its value spelled as
    /// strings, for comparison against string-only identity fields
    fn as_identity(&self) -> FieldConstraint {
        fn stringify(value: &Value) -> Value {
            match value {
                Value::Number(n) => Value::String(n.to_string()),
                Value::Bool(b) => Value::String(b.to_string()),
                Value::Array(items) => Value::Array(items.iter().map(stringify).collect()),
                other => other.clone(),
            }
        }
        FieldConstraint::new(self.field.clone(), self.operator, stringify(&self.value))
    }

    /// Check a single field value against this constraint
    pub fn matches_value(&self, field_value: Option<&Value>) -> bool {
        let field_value = field_value.unwrap_or(&Value::Null);

        match self.operator {
            FilterOperator::Eq => values_equal(field_value, &self.value),
            FilterOperator::Neq => !values_equal(field_value, &self.value),
            FilterOperator::In => self
                .value
                .as_array()
                .map(|list| list.iter().any(|v| values_equal(field_value, v)))
                .unwrap_or(false),
            FilterOperator::Nin => self
                .value
                .as_array()
                .map(|list| !list.iter().any(|v| values_equal(field_value, v)))
                .unwrap_or(true),
            FilterOperator::Lt => compare_values(field_value, &self.value) == Some(Ordering::Less),
            FilterOperator::Gt => {
                compare_values(field_value, &self.value) == Some(Ordering::Greater)
            }
            FilterOperator::Lte => matches!(
                compare_values(field_value, &self.value),
                Some(Ordering::Less | Ordering::Equal)
            ),
            FilterOperator::Gte => matches!(
                compare_values(field_value, &self.value),
                Some(Ordering::Greater | Ordering::Equal)
            ),
        }
    }
}

/// A filter: a field constraint, or a boolean combination of filters
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Constraint(FieldConstraint),
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
}

impl Predicate {
    pub fn constraint(field: impl Into<String>, operator: FilterOperator, value: Value) -> Self {
        Predicate::Constraint(FieldConstraint::new(field, operator, value))
    }

    /// AND this predicate with another, flattening nested ANDs
    pub fn and(self, other: Predicate) -> Predicate {
        match (self, other) {
            (Predicate::And(mut left), Predicate::And(right)) => {
                left.extend(right);
                Predicate::And(left)
            }
            (Predicate::And(mut left), other) => {
                left.push(other);
                Predicate::And(left)
            }
            (this, other) => Predicate::And(vec![this, other]),
        }
    }

    /// Evaluate against a resource. `id` and `type` address the resource's
    /// identity; any other field is an attribute.
    pub fn matches(&self, resource: &Resource) -> bool {
        match self {
            Predicate::Constraint(constraint) => match constraint.field.as_str() {
                "id" => {
                    let id = resource.id().map(|id| Value::String(id.to_string()));
                    constraint.as_identity().matches_value(id.as_ref())
                }
                "type" => {
                    let resource_type = Value::String(resource.resource_type().to_string());
                    constraint.as_identity().matches_value(Some(&resource_type))
                }
                field => constraint.matches_value(resource.attribute(field)),
            },
            Predicate::And(predicates) => predicates.iter().all(|p| p.matches(resource)),
            Predicate::Or(predicates) => predicates.iter().any(|p| p.matches(resource)),
        }
    }
}

/// Equality that treats numbers by value (`1 == 1.0`)
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => a == b,
    }
}

/// Order two JSON values of the same kind. Mixed kinds are unordered.
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}
