//! # Data Model
//!
//! Passive value types flowing through the request pipeline.

pub mod api_error;
pub mod collection;
pub mod document;
pub mod filter;
pub mod linkage;
pub mod media_type;
pub mod params;
pub mod query;
pub mod request;
pub mod resource;
pub mod response;

pub use api_error::{ApiError, ApiErrors, ApiResult, ErrorSource};
pub use collection::Collection;
pub use document::{Document, PrimaryData};
pub use filter::{FieldConstraint, FilterOperator, Predicate};
pub use linkage::{Linkage, LinkageError, ResourceIdentifier};
pub use params::{Fields, Page, QueryParams, Sort, SortDirection};
pub use query::{
    AddToRelationshipQuery, CreateQuery, DeleteQuery, FindQuery, FindQueryOptions, Query,
    QueryError, QueryResult, Records, RemoveFromRelationshipQuery, UpdateQuery,
};
pub use request::{IdOrIds, Method, PreparedRequest, Request, TransportContext};
pub use resource::Resource;
pub use response::Response;
