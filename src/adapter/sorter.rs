//! Resource sorting for find queries
//!
//! Multi-key, stable and deterministic.

use std::cmp::Ordering;

use serde_json::Value;

use crate::types::{Resource, Sort, SortDirection};

/// Sorts resources by attribute (or `id`)
pub struct ResourceSorter;

impl ResourceSorter {
    /// Sort in place. Later keys only break ties left by earlier ones;
    /// resources equal on every key keep their relative order.
    pub fn sort(resources: &mut [Resource], sorts: &[Sort]) {
        if sorts.is_empty() {
            return;
        }

        resources.sort_by(|a, b| {
            sorts
                .iter()
                .map(|sort| {
                    let ordering = Self::compare_values(
                        Self::sort_value(a, &sort.field).as_ref(),
                        Self::sort_value(b, &sort.field).as_ref(),
                    );
                    match sort.direction {
                        SortDirection::Asc => ordering,
                        SortDirection::Desc => ordering.reverse(),
                    }
                })
                .find(|ordering| *ordering != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });
    }

    fn sort_value(resource: &Resource, field: &str) -> Option<Value> {
        match field {
            "id" => resource.id().map(|id| Value::String(id.to_string())),
            field => resource.attribute(field).cloned(),
        }
    }

    /// Compares two JSON values for sorting.
    ///
    /// Ordering rules:
    /// - missing < null < bool < number < string
    /// - For same types, natural ordering
    fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
        match (a, b) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(a_val), Some(b_val)) => {
                let type_order = |v: &Value| -> u8 {
                    match v {
                        Value::Null => 0,
                        Value::Bool(_) => 1,
                        Value::Number(_) => 2,
                        Value::String(_) => 3,
                        Value::Array(_) => 4,
                        Value::Object(_) => 5,
                    }
                };

                let a_type = type_order(a_val);
                let b_type = type_order(b_val);
                if a_type != b_type {
                    return a_type.cmp(&b_type);
                }

                crate::types::filter::compare_values(a_val, b_val).unwrap_or(Ordering::Equal)
            }
        }
    }
}
