//! # Storage Adapters
//!
//! The storage capability the pipeline calls through. One adapter may
//! serve many resource types; the registry decides which adapter owns
//! which type.

mod memory;
mod sorter;

use futures_util::future::BoxFuture;
use thiserror::Error;

use crate::types::{
    AddToRelationshipQuery, ApiError, CreateQuery, DeleteQuery, FindQuery, PrimaryData, Records,
    RemoveFromRelationshipQuery, Resource, UpdateQuery,
};

pub use memory::MemoryAdapter;
pub use sorter::ResourceSorter;

/// Adapter failures
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AdapterError {
    /// No resource with the given type and id
    #[error("No {resource_type} found with id {id}.")]
    NotFound { resource_type: String, id: String },

    /// The write collides with existing data
    #[error("{0}")]
    Conflict(String),

    /// The request is well-formed but cannot be applied
    #[error("{0}")]
    Invalid(String),

    /// Storage failure; never shown to clients
    #[error("{0}")]
    Other(String),
}

impl AdapterError {
    pub fn not_found(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        AdapterError::NotFound {
            resource_type: resource_type.into(),
            id: id.into(),
        }
    }

    /// HTTP status for this error
    pub fn status_code(&self) -> u16 {
        match self {
            AdapterError::NotFound { .. } => 404,
            AdapterError::Conflict(_) => 409,
            AdapterError::Invalid(_) => 400,
            AdapterError::Other(_) => 500,
        }
    }

    /// Client-facing form of this error
    pub fn to_api_error(&self) -> ApiError {
        match self {
            AdapterError::NotFound { .. } => {
                ApiError::not_found("Resource not found").with_detail(self.to_string())
            }
            AdapterError::Conflict(detail) => ApiError::conflict("Conflict").with_detail(detail),
            AdapterError::Invalid(detail) => {
                ApiError::bad_request("Invalid request").with_detail(detail)
            }
            AdapterError::Other(_) => ApiError::internal(
                "An unknown error occurred while trying to process this request.",
            ),
        }
    }
}

/// What a find produced
#[derive(Debug, Clone, PartialEq)]
pub struct FindResult {
    /// A resource for singular finds, a collection otherwise
    pub primary: PrimaryData,

    pub included: Vec<Resource>,

    /// Matching records before pagination; `None` for singular finds
    pub total: Option<usize>,
}

/// Storage contract consumed by the query executors
pub trait Adapter: Send + Sync {
    /// Fetch by id, ids, or filter, with sort, pagination, sparse fields
    /// and included relationships applied
    fn find<'a>(&'a self, query: &'a FindQuery) -> BoxFuture<'a, Result<FindResult, AdapterError>>;

    /// Persist new resources, returning them as stored (ids assigned)
    fn create<'a>(&'a self, query: &'a CreateQuery)
        -> BoxFuture<'a, Result<Records, AdapterError>>;

    /// Apply partial updates, returning the updated resources
    fn update<'a>(&'a self, query: &'a UpdateQuery)
        -> BoxFuture<'a, Result<Records, AdapterError>>;

    fn delete<'a>(&'a self, query: &'a DeleteQuery) -> BoxFuture<'a, Result<(), AdapterError>>;

    fn add_to_relationship<'a>(
        &'a self,
        query: &'a AddToRelationshipQuery,
    ) -> BoxFuture<'a, Result<(), AdapterError>>;

    fn remove_from_relationship<'a>(
        &'a self,
        query: &'a RemoveFromRelationshipQuery,
    ) -> BoxFuture<'a, Result<(), AdapterError>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AdapterError::not_found("people", "1").status_code(), 404);
        assert_eq!(AdapterError::Conflict("dup".into()).status_code(), 409);
        assert_eq!(AdapterError::Invalid("bad".into()).status_code(), 400);
        assert_eq!(AdapterError::Other("io".into()).status_code(), 500);
    }

    #[test]
    fn test_other_errors_are_opaque() {
        let api = AdapterError::Other("connection refused at 10.0.0.3".into()).to_api_error();
        assert_eq!(api.status, 500);
        assert!(api.detail.is_none());

        let api = AdapterError::not_found("people", "42").to_api_error();
        assert_eq!(api.detail.as_deref(), Some("No people found with id 42."));
    }
}
