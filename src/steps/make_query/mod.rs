//! # Query Builders
//!
//! Pure functions from a prepared request to the [`Query`] its verb calls
//! for. No I/O happens here; the executors in `do_query` run the result.

mod delete;
mod get;
mod patch;
mod post;

pub use delete::make_delete;
pub use get::make_get;
pub use patch::make_patch;
pub use post::make_post;

use crate::registry::ResourceTypeRegistry;
use crate::types::{ApiError, ApiResult, Linkage, Method, PreparedRequest, PrimaryData, Query};

/// Build the query for the request's verb
pub fn make_query(prepared: &PreparedRequest, registry: &ResourceTypeRegistry) -> ApiResult<Query> {
    match prepared.method {
        Method::Get => make_get(prepared, registry),
        Method::Post => make_post(prepared),
        Method::Patch => make_patch(prepared),
        Method::Delete => make_delete(prepared),
    }
}

/// Whether the body was sent with the bulk extension
fn uses_bulk(prepared: &PreparedRequest) -> bool {
    prepared.request.extensions().iter().any(|ext| ext == "bulk")
}

fn bulk_required(detail: &str) -> ApiError {
    ApiError::bad_request("Bulk extension required").with_detail(detail)
}

/// The id of a relationship request's owner
fn owner_id(prepared: &PreparedRequest) -> ApiResult<&str> {
    prepared
        .id_or_ids()
        .and_then(|ids| ids.as_single())
        .ok_or_else(|| {
            ApiError::bad_request("Invalid relationship request")
                .with_detail("Relationship requests must target a single resource.")
                .into()
        })
}

/// Linkage body of a relationship add/remove; only to-many makes sense
fn to_many_linkage(prepared: &PreparedRequest) -> ApiResult<Linkage> {
    match &prepared.primary {
        Some(PrimaryData::Linkage(linkage @ Linkage::Many(_))) => Ok(linkage.clone()),
        _ => Err(ApiError::bad_request("Invalid linkage")
            .with_detail("To add to or remove from a to-many relationship, send an array of resource identifier objects.")
            .with_pointer("/data")
            .into()),
    }
}

#[cfg(test)]
pub(super) mod fixtures {
    use serde_json::json;

    use crate::types::{Method, PreparedRequest, PrimaryData, QueryParams, Request};

    pub const JSON_API: &str = "application/vnd.api+json";
    pub const BULK: &str = "application/vnd.api+json; ext=\"bulk\"";

    pub fn prepared(method: Method, request: Request, primary: Option<PrimaryData>) -> PreparedRequest {
        let request = match &primary {
            Some(_) if request.content_type.is_none() => request.with_body(JSON_API, json!({"data": null})),
            _ => request,
        };
        PreparedRequest {
            method,
            request,
            params: QueryParams::default(),
            primary,
        }
    }

    pub fn bulk(method: Method, request: Request, primary: PrimaryData) -> PreparedRequest {
        prepared(method, request.with_body(BULK, json!({"data": []})), Some(primary))
    }
}
