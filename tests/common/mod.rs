//! Shared fixture: people, organizations and schools behind the full HTTP
//! stack, plus the custom endpoints that exercise query transforms.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use aeroapi::adapter::{Adapter, MemoryAdapter};
use aeroapi::controller::{query_transform, ApiController};
use aeroapi::http::{api_routes, dispatch, ApiState, RouteParams, MAX_BODY_BYTES};
use aeroapi::registry::{ResourceTypeRegistry, TypeDescription, UrlTemplates};
use aeroapi::types::{
    ApiError, FilterOperator, IdOrIds, Linkage, PrimaryData, Predicate, Query, Resource,
    ResourceIdentifier, Response as ApiResponse,
};
use axum::body::{to_bytes, Body};
use axum::extract::{Path, Query as QueryString, Request, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::get;
use axum::Router;
use serde_json::{json, Map, Value};
use tower::ServiceExt;

pub const BASE_URL: &str = "http://127.0.0.1:3000";
pub const JSON_API: &str = "application/vnd.api+json";
pub const BULK: &str = "application/vnd.api+json; ext=\"bulk\"";

pub const NON_BINARY_ID: &str = "59af14d3bbd18cd55ea08ea1";
pub const HIDDEN_ORG_ID: &str = "59af14d3bbd18cd55ea08ea2";
pub const ORG_ID: &str = "54419d550a5069a2129ef254";
pub const SCHOOL_ID: &str = "5a5934cfc810949cebeecc33";

fn resource(resource_type: &str, id: &str, attributes: Value) -> Resource {
    let attributes: Map<String, Value> = match attributes {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    Resource::new(resource_type, Some(id.to_string()), attributes, Default::default()).unwrap()
}

fn person(id: &str, name: &str, gender: &str) -> Resource {
    resource("people", id, json!({"name": name, "gender": gender}))
}

fn liaisons(mut org: Resource, people: &[&str]) -> Resource {
    org.set_relationship(
        "liaisons",
        Linkage::many(people.iter().map(|id| ResourceIdentifier::new("people", *id))),
    )
    .unwrap();
    org
}

pub fn seed() -> Vec<Resource> {
    vec![
        person("53f54dd98d1e62ff12539db2", "John Smith", "male"),
        person("53f54dd98d1e62ff12539db3", "Jane Doe", "female"),
        person(NON_BINARY_ID, "Jordi Jones", "other"),
        person("53f54dd98d1e62ff12539db4", "Doug Wilson", "male"),
        person("53f54dd98d1e62ff12539db5", "Ava Adams", "female"),
        liaisons(
            resource("organizations", ORG_ID, json!({"name": "ELV"})),
            &["53f54dd98d1e62ff12539db2"],
        ),
        liaisons(
            resource("organizations", HIDDEN_ORG_ID, json!({"name": "Hidden"})),
            &[],
        ),
        liaisons(
            resource("schools", SCHOOL_ID, json!({"name": "Anytown High", "isCollege": false})),
            &["53f54dd98d1e62ff12539db3", "53f54dd98d1e62ff12539db4"],
        ),
    ]
}

pub fn registry() -> ResourceTypeRegistry {
    let memory = MemoryAdapter::new()
        .with_subtype("schools", "organizations")
        .with_resources(seed());
    let adapter: Arc<dyn Adapter> = Arc::new(memory);

    ResourceTypeRegistry::builder()
        .with_type(
            "people",
            TypeDescription::new()
                .with_adapter(adapter.clone())
                .with_url_templates(UrlTemplates::conventional(BASE_URL, "people"))
                .with_label("non-binary-label", |_, _| async {
                    Ok(Some(IdOrIds::many([NON_BINARY_ID])))
                })
                .with_label("nobody", |_, _| async { Ok(None) }),
        )
        .with_type(
            "organizations",
            TypeDescription::new()
                .with_adapter(adapter)
                .with_url_templates(UrlTemplates::conventional(BASE_URL, "organizations"))
                .with_before_render(|mut org, _| async move {
                    if org.id() == Some(HIDDEN_ORG_ID) {
                        return Ok(None);
                    }
                    org.set_attribute("addedBeforeRender", json!(true))?;
                    Ok(Some(org))
                }),
        )
        .with_type(
            "schools",
            TypeDescription::new().with_parent_type("organizations"),
        )
        .build()
        .unwrap()
}

pub fn state() -> ApiState {
    ApiState::new(ApiController::new(Arc::new(registry()))).with_base_url(BASE_URL)
}

fn people_route() -> RouteParams {
    RouteParams {
        resource_type: "people".to_string(),
        ..Default::default()
    }
}

/// `/people/non-binary`: people whose gender is neither male nor female
async fn non_binary(State(state): State<ApiState>, request: Request) -> ApiResponse {
    let transform = query_transform(|query| async move {
        match query {
            Query::Find(find) => Ok(Query::Find(find.and_filter(Predicate::constraint(
                "gender",
                FilterOperator::Nin,
                json!(["male", "female"]),
            )))),
            other => Ok(other),
        }
    });
    dispatch(&state, people_route(), request, Some(transform)).await
}

/// `/people/custom-filter-test?customNameFilter=...`
async fn custom_filter(
    State(state): State<ApiState>,
    QueryString(params): QueryString<HashMap<String, String>>,
    request: Request,
) -> ApiResponse {
    let name = params.get("customNameFilter").cloned().unwrap_or_default();
    let transform = query_transform(move |query| async move {
        match query {
            Query::Find(find) => Ok(Query::Find(
                find.and_filter(Predicate::constraint("name", FilterOperator::Eq, json!(name))),
            )),
            other => Ok(other),
        }
    });
    dispatch(&state, people_route(), request, Some(transform)).await
}

/// `/people/with-names`: collection plus `meta.names`
async fn with_names(State(state): State<ApiState>, request: Request) -> ApiResponse {
    let transform = query_transform(|query| async move {
        Ok(query.with_returning(|mut result| {
            let names: Vec<Value> = result
                .primary
                .as_ref()
                .map(PrimaryData::resources)
                .unwrap_or_default()
                .into_iter()
                .filter_map(|r| r.attribute("name").cloned())
                .collect();
            result.meta.insert("names".to_string(), Value::Array(names));
            Ok(result)
        }))
    });
    dispatch(&state, people_route(), request, Some(transform)).await
}

/// `/request-that-errors/:type/:id`: always fails with a custom status
async fn request_that_errors(
    State(state): State<ApiState>,
    Path((resource_type, id)): Path<(String, String)>,
    request: Request,
) -> ApiResponse {
    fn custom() -> ApiError {
        ApiError::new(499).with_title("custom error as string")
    }
    let transform = query_transform(|query| async move {
        Ok(query
            .with_returning(|_| Err(custom().into()))
            .with_catch(|_| Err(custom().into())))
    });
    let route = RouteParams {
        resource_type,
        id: Some(id),
        relationship: None,
    };
    dispatch(&state, route, request, Some(transform)).await
}

pub fn app() -> Router {
    let state = state();
    Router::new()
        .route("/people/non-binary", get(non_binary))
        .route("/people/custom-filter-test", get(custom_filter))
        .route("/people/with-names", get(with_names))
        .route("/request-that-errors/:type/:id", get(request_that_errors))
        .with_state(state.clone())
        .merge(api_routes(state))
}

/// A response, decoded
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Names of the primary resources, in order
    pub fn names(&self) -> Vec<String> {
        self.body["data"]
            .as_array()
            .map(|data| {
                data.iter()
                    .filter_map(|r| r["attributes"]["name"].as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}

pub async fn send(app: Router, request: axum::http::Request<Body>) -> TestResponse {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), MAX_BODY_BYTES).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    TestResponse {
        status,
        headers,
        body,
    }
}

pub async fn get_json(app: Router, uri: &str) -> TestResponse {
    let request = axum::http::Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::ACCEPT, JSON_API)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn send_json(
    app: Router,
    method: &str,
    uri: &str,
    content_type: &str,
    body: Value,
) -> TestResponse {
    let request = axum::http::Request::builder()
        .method(method)
        .uri(uri)
        .header(header::ACCEPT, JSON_API)
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}
