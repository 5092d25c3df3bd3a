//! # Linkage
//!
//! The identity-only payload of a relationship: nothing (empty to-one),
//! one resource identifier, or an ordered list of them (to-many).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::api_error::ApiError;

/// Linkage construction errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LinkageError {
    /// An entry without string `type` and `id` members
    #[error("Invalid linkage value: {0}")]
    InvalidLinkage(String),

    /// `add` called on a to-one linkage
    #[error("You can only add values to Linkage objects for to-many relationships.")]
    NotToMany,
}

impl From<LinkageError> for ApiError {
    fn from(err: LinkageError) -> Self {
        ApiError::bad_request("Invalid linkage").with_detail(err.to_string())
    }
}

/// A `{type, id}` pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceIdentifier {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub id: String,
}

impl ResourceIdentifier {
    pub fn new(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: id.into(),
        }
    }

    /// Parse one identifier object, rejecting anything without string members
    pub fn from_json(value: &Value) -> Result<Self, LinkageError> {
        match (
            value.get("type").and_then(Value::as_str),
            value.get("id").and_then(Value::as_str),
        ) {
            (Some(resource_type), Some(id)) => Ok(Self::new(resource_type, id)),
            _ => Err(LinkageError::InvalidLinkage(value.to_string())),
        }
    }
}

/// Relationship linkage
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Linkage {
    /// Empty to-one relationship (`null`)
    Empty,
    /// To-one relationship
    Single(ResourceIdentifier),
    /// To-many relationship, possibly empty
    Many(Vec<ResourceIdentifier>),
}

impl Linkage {
    /// Empty to-many linkage
    pub fn empty_many() -> Self {
        Linkage::Many(Vec::new())
    }

    /// Build a to-many linkage, preserving order
    pub fn many(identifiers: impl IntoIterator<Item = ResourceIdentifier>) -> Self {
        Linkage::Many(identifiers.into_iter().collect())
    }

    /// Parse the wire form: `null`, an identifier object, or an array of them
    pub fn from_json(value: &Value) -> Result<Self, LinkageError> {
        match value {
            Value::Null => Ok(Linkage::Empty),
            Value::Array(items) => {
                let mut linkage = Linkage::empty_many();
                for item in items {
                    linkage.add(ResourceIdentifier::from_json(item)?)?;
                }
                Ok(linkage)
            }
            Value::Object(_) => Ok(Linkage::Single(ResourceIdentifier::from_json(value)?)),
            other => Err(LinkageError::InvalidLinkage(other.to_string())),
        }
    }

    /// Append to a to-many linkage
    pub fn add(&mut self, identifier: ResourceIdentifier) -> Result<(), LinkageError> {
        match self {
            Linkage::Many(items) => {
                items.push(identifier);
                Ok(())
            }
            _ => Err(LinkageError::NotToMany),
        }
    }

    /// Clear the linkage, keeping its cardinality
    pub fn empty(&mut self) {
        *self = match self {
            Linkage::Many(_) => Linkage::empty_many(),
            _ => Linkage::Empty,
        };
    }

    pub fn is_to_many(&self) -> bool {
        matches!(self, Linkage::Many(_))
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Linkage::Empty => true,
            Linkage::Single(_) => false,
            Linkage::Many(items) => items.is_empty(),
        }
    }

    /// All identifiers, in order
    pub fn identifiers(&self) -> Vec<&ResourceIdentifier> {
        match self {
            Linkage::Empty => Vec::new(),
            Linkage::Single(identifier) => vec![identifier],
            Linkage::Many(items) => items.iter().collect(),
        }
    }

    pub fn contains(&self, identifier: &ResourceIdentifier) -> bool {
        self.identifiers().into_iter().any(|i| i == identifier)
    }

    pub fn to_json(&self) -> Value {
        match self {
            Linkage::Empty => Value::Null,
            Linkage::Single(identifier) => identifier_json(identifier),
            Linkage::Many(items) => Value::Array(items.iter().map(identifier_json).collect()),
        }
    }
}

fn identifier_json(identifier: &ResourceIdentifier) -> Value {
    serde_json::json!({"type": identifier.resource_type, "id": identifier.id})
}

impl Serialize for Linkage {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}
