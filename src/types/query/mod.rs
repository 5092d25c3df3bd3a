//! # Queries
//!
//! Immutable, validated descriptions of one storage operation. Each query
//! checks its required fields at construction time, so an invalid query
//! never reaches an adapter.

mod create;
mod delete;
mod find;
mod relationship;
mod update;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};
use thiserror::Error;

use super::api_error::{ApiError, ApiErrors, ApiResult};
use super::collection::Collection;
use super::document::PrimaryData;
use super::resource::Resource;

pub use create::CreateQuery;
pub use delete::DeleteQuery;
pub use find::{FindQuery, FindQueryOptions};
pub use relationship::{AddToRelationshipQuery, RemoveFromRelationshipQuery};
pub use update::UpdateQuery;

/// Query construction errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    #[error("Missing required query field(s): {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        ApiError::internal("Invalid query").with_detail(err.to_string())
    }
}

/// Fail unless every named field is present and non-empty
pub(crate) fn assert_fields_present(fields: &[(&'static str, bool)]) -> Result<(), QueryError> {
    let missing: Vec<&'static str> = fields
        .iter()
        .filter(|(_, present)| !present)
        .map(|(name, _)| *name)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(QueryError::MissingFields(missing))
    }
}

/// What an executed query produced, before it is rendered
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    /// Response status; 200 when unset
    pub status: Option<u16>,

    pub headers: BTreeMap<String, String>,

    /// `None` means the response has no primary data at all (204)
    pub primary: Option<PrimaryData>,

    pub included: Vec<Resource>,

    pub meta: Map<String, Value>,
}

impl QueryResult {
    pub fn with_primary(primary: PrimaryData) -> Self {
        Self {
            primary: Some(primary),
            ..Default::default()
        }
    }

    pub fn no_content() -> Self {
        Self {
            status: Some(204),
            ..Default::default()
        }
    }
}

/// Post-processes a successful query result
pub type ReturningHook = Arc<dyn Fn(QueryResult) -> ApiResult<QueryResult> + Send + Sync>;

/// Recovers from (or rewrites) an adapter failure
pub type CatchHook = Arc<dyn Fn(ApiErrors) -> ApiResult<QueryResult> + Send + Sync>;

/// Members every query carries
#[derive(Clone, Default)]
pub struct QueryBase {
    resource_type: String,
    returning: Option<ReturningHook>,
    catch: Option<CatchHook>,
}

impl QueryBase {
    pub fn new(resource_type: impl Into<String>) -> Result<Self, QueryError> {
        let resource_type = resource_type.into();
        assert_fields_present(&[("type", !resource_type.is_empty())])?;
        Ok(Self {
            resource_type,
            returning: None,
            catch: None,
        })
    }

    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    /// Run the hooks over an adapter outcome. `catch` only sees adapter
    /// failures; an error raised by `returning` goes straight out.
    pub fn finish(&self, outcome: ApiResult<QueryResult>) -> ApiResult<QueryResult> {
        match outcome {
            Ok(result) => match &self.returning {
                Some(returning) => returning(result),
                None => Ok(result),
            },
            Err(errors) => match &self.catch {
                Some(catch) => catch(errors),
                None => Err(errors),
            },
        }
    }
}

impl fmt::Debug for QueryBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryBase")
            .field("resource_type", &self.resource_type)
            .field("returning", &self.returning.is_some())
            .field("catch", &self.catch.is_some())
            .finish()
    }
}

/// Resources a create or update carries
#[derive(Debug, Clone, PartialEq)]
pub enum Records {
    One(Resource),
    Many(Collection),
}

impl Records {
    pub fn iter(&self) -> std::slice::Iter<'_, Resource> {
        match self {
            Records::One(resource) => std::slice::from_ref(resource).iter(),
            Records::Many(collection) => collection.iter(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Records::One(_) => 1,
            Records::Many(collection) => collection.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Records> for PrimaryData {
    fn from(records: Records) -> Self {
        match records {
            Records::One(resource) => PrimaryData::Resource(resource),
            Records::Many(collection) => PrimaryData::Collection(collection),
        }
    }
}

/// One storage operation
#[derive(Debug, Clone)]
pub enum Query {
    Find(FindQuery),
    Create(CreateQuery),
    Update(UpdateQuery),
    Delete(DeleteQuery),
    AddToRelationship(AddToRelationshipQuery),
    RemoveFromRelationship(RemoveFromRelationshipQuery),
}

impl Query {
    pub fn base(&self) -> &QueryBase {
        match self {
            Query::Find(q) => &q.base,
            Query::Create(q) => &q.base,
            Query::Update(q) => &q.base,
            Query::Delete(q) => &q.base,
            Query::AddToRelationship(q) => &q.base,
            Query::RemoveFromRelationship(q) => &q.base,
        }
    }

    fn base_mut(&mut self) -> &mut QueryBase {
        match self {
            Query::Find(q) => &mut q.base,
            Query::Create(q) => &mut q.base,
            Query::Update(q) => &mut q.base,
            Query::Delete(q) => &mut q.base,
            Query::AddToRelationship(q) => &mut q.base,
            Query::RemoveFromRelationship(q) => &mut q.base,
        }
    }

    pub fn resource_type(&self) -> &str {
        self.base().resource_type()
    }

    /// Operation name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Query::Find(_) => "find",
            Query::Create(_) => "create",
            Query::Update(_) => "update",
            Query::Delete(_) => "delete",
            Query::AddToRelationship(_) => "add_to_relationship",
            Query::RemoveFromRelationship(_) => "remove_from_relationship",
        }
    }

    /// Copy of this query with a `returning` hook
    pub fn with_returning<F>(mut self, hook: F) -> Self
    where
        F: Fn(QueryResult) -> ApiResult<QueryResult> + Send + Sync + 'static,
    {
        self.base_mut().returning = Some(Arc::new(hook));
        self
    }

    /// Copy of this query with a `catch` hook
    pub fn with_catch<F>(mut self, hook: F) -> Self
    where
        F: Fn(ApiErrors) -> ApiResult<QueryResult> + Send + Sync + 'static,
    {
        self.base_mut().catch = Some(Arc::new(hook));
        self
    }
}
