//! # Query Parameters
//!
//! Typed form of the JSON:API query-string parameters.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::filter::Predicate;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// One sort key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    pub field: String,
    pub direction: SortDirection,
}

impl Sort {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Result window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub offset: Option<usize>,
    pub limit: Option<usize>,
}

impl Page {
    pub fn is_unbounded(&self) -> bool {
        self.offset.is_none() && self.limit.is_none()
    }
}

/// Sparse fieldsets: type name to allowed field names
pub type Fields = BTreeMap<String, Vec<String>>;

/// Parsed query parameters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    /// `None` when no `fields` parameter was sent at all
    pub fields: Option<Fields>,

    pub sort: Option<Vec<Sort>>,

    /// `None` when no `include` parameter was sent
    pub include: Option<Vec<String>>,

    pub filter: Option<Predicate>,

    pub page: Page,

    /// Parameters outside the JSON:API families, untouched
    pub custom: BTreeMap<String, String>,
}
