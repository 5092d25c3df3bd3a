//! # HTTP Binding
//!
//! Maps axum requests onto the controller's normalized [`ApiRequest`] and
//! its [`ApiResponse`] back onto HTTP.
//!
//! Routes:
//! - `/:type`
//! - `/:type/:id`
//! - `/:type/:id/relationships/:relationship`

mod server;

pub use server::HttpServer;

use std::sync::Arc;

use axum::body::{to_bytes, Body, Bytes};
use axum::extract::{Path, Query, Request, State};
use axum::http::header::{ACCEPT, CONTENT_TYPE, HOST};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::Router;
use serde::Deserialize;
use serde_json::Value;

use crate::controller::{ApiController, QueryTransform};
use crate::types::{
    ApiError, IdOrIds, Request as ApiRequest, Response as ApiResponse, TransportContext,
};

/// Largest request body read
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Shared state of the API routes
#[derive(Clone)]
pub struct ApiState {
    pub controller: Arc<ApiController>,

    /// Prefix for absolute request URIs; the `Host` header is used when
    /// unset
    pub base_url: Option<String>,
}

impl ApiState {
    pub fn new(controller: ApiController) -> Self {
        Self {
            controller: Arc::new(controller),
            base_url: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into().trim_end_matches('/').to_string());
        self
    }
}

/// Path segments of an API route
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RouteParams {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub id: Option<String>,
    pub relationship: Option<String>,
}

/// The JSON:API routes, for every registered type
pub fn api_routes(state: ApiState) -> Router {
    Router::new()
        .route("/:type", any(handle))
        .route("/:type/:id", any(handle))
        .route("/:type/:id/relationships/:relationship", any(handle))
        .with_state(state)
}

async fn handle(
    State(state): State<ApiState>,
    Path(route): Path<RouteParams>,
    request: Request,
) -> ApiResponse {
    dispatch(&state, route, request, None).await
}

/// Run one HTTP request through the controller. Custom routes call this
/// directly to supply a query transform.
pub async fn dispatch(
    state: &ApiState,
    route: RouteParams,
    request: Request,
    transform: Option<QueryTransform>,
) -> ApiResponse {
    let (parts, body) = request.into_parts();
    let accepts = header_str(&parts, ACCEPT);

    let bytes = match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(err) => {
            let error = ApiError::bad_request("Request body could not be read.").with_detail(err.to_string());
            return state
                .controller
                .response_from_external_error(error, accepts.as_deref())
                .await;
        }
    };

    let request = match to_api_request(state, &parts, route, &bytes) {
        Ok(request) => request,
        Err(error) => {
            return state
                .controller
                .response_from_external_error(error, accepts.as_deref())
                .await;
        }
    };

    let transport = TransportContext {
        headers: parts.headers,
        extensions: parts.extensions,
    };
    state.controller.handle(request, transport, transform).await
}

/// Normalize the HTTP request. Fails only on input the pipeline can't
/// even represent: an unparseable query string or body.
fn to_api_request(
    state: &ApiState,
    parts: &Parts,
    route: RouteParams,
    body: &Bytes,
) -> Result<ApiRequest, ApiError> {
    let query_params = Query::<Vec<(String, String)>>::try_from_uri(&parts.uri)
        .map(|Query(pairs)| pairs)
        .map_err(|err| {
            ApiError::bad_request("Invalid query string").with_detail(err.body_text())
        })?;

    let body = if body.iter().all(u8::is_ascii_whitespace) {
        None
    } else {
        Some(serde_json::from_slice::<Value>(body).map_err(|err| {
            ApiError::bad_request("Request contains invalid JSON.").with_detail(err.to_string())
        })?)
    };

    let allow_label = parts.method == axum::http::Method::GET
        && route.id.is_some()
        && route.relationship.is_none();

    Ok(ApiRequest {
        method: parts.method.as_str().to_string(),
        uri: absolute_uri(state, parts),
        resource_type: route.resource_type,
        id_or_ids: route.id.map(IdOrIds::Id),
        relationship: route.relationship,
        allow_label,
        content_type: header_str(parts, CONTENT_TYPE),
        accepts: header_str(parts, ACCEPT),
        body,
        query_params,
    })
}

fn header_str(parts: &Parts, name: axum::http::HeaderName) -> Option<String> {
    parts
        .headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

fn absolute_uri(state: &ApiState, parts: &Parts) -> String {
    let path = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    match (&state.base_url, header_str(parts, HOST)) {
        (Some(base), _) => format!("{}{}", base, path),
        (None, Some(host)) => format!("http://{}{}", host, path),
        (None, None) => parts.uri.to_string(),
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let mut builder = axum::http::Response::builder().status(status);
        for (name, value) in &self.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let body = match (&self.body, &self.content_type) {
            (Some(document), Some(content_type)) if status != StatusCode::NO_CONTENT => {
                builder = builder.header(CONTENT_TYPE, content_type.as_str());
                Body::from(document.to_string())
            }
            _ => Body::empty(),
        };

        builder
            .body(body)
            .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
    }
}
