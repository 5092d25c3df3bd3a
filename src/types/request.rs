//! # Request
//!
//! The normalized request an HTTP binding hands to the controller, and the
//! validated form the pipeline builds from it.

use std::fmt;

use axum::http::{Extensions, HeaderMap};
use serde_json::Value;

use super::document::PrimaryData;
use super::params::QueryParams;

/// Supported HTTP verbs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl Method {
    /// Parse a verb name, case-insensitively
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "get" => Some(Method::Get),
            "post" => Some(Method::Post),
            "patch" => Some(Method::Patch),
            "delete" => Some(Method::Delete),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "get",
            Method::Post => "post",
            Method::Patch => "patch",
            Method::Delete => "delete",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The id segment of a request: one id (or label), or several ids
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdOrIds {
    Id(String),
    Ids(Vec<String>),
}

impl IdOrIds {
    pub fn single(id: impl Into<String>) -> Self {
        IdOrIds::Id(id.into())
    }

    pub fn many<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        IdOrIds::Ids(ids.into_iter().map(Into::into).collect())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            IdOrIds::Id(id) => id.is_empty(),
            IdOrIds::Ids(ids) => ids.is_empty(),
        }
    }

    pub fn as_single(&self) -> Option<&str> {
        match self {
            IdOrIds::Id(id) => Some(id),
            IdOrIds::Ids(_) => None,
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        match self {
            IdOrIds::Id(single) => single == id,
            IdOrIds::Ids(ids) => ids.iter().any(|i| i == id),
        }
    }
}

/// Framework-side request/response state, opaque to the pipeline and
/// handed to label mappers and transform hooks
#[derive(Debug, Clone, Default)]
pub struct TransportContext {
    pub headers: HeaderMap,
    pub extensions: Extensions,
}

/// A normalized inbound request
#[derive(Debug, Clone, Default)]
pub struct Request {
    /// Raw verb, validated by the pipeline
    pub method: String,

    /// Absolute URI of the request, used for top-level self links
    pub uri: String,

    pub resource_type: String,

    pub id_or_ids: Option<IdOrIds>,

    /// Set when the request targets `/{type}/{id}/relationships/{name}`
    pub relationship: Option<String>,

    /// Whether the id segment may be a label
    pub allow_label: bool,

    pub content_type: Option<String>,

    pub accepts: Option<String>,

    pub body: Option<Value>,

    /// Decoded query-string pairs, in order
    pub query_params: Vec<(String, String)>,
}

impl Request {
    pub fn new(
        method: impl Into<String>,
        uri: impl Into<String>,
        resource_type: impl Into<String>,
    ) -> Self {
        Self {
            method: method.into(),
            uri: uri.into(),
            resource_type: resource_type.into(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id_or_ids = Some(IdOrIds::single(id));
        self
    }

    pub fn with_ids(mut self, ids: IdOrIds) -> Self {
        self.id_or_ids = Some(ids);
        self
    }

    pub fn with_relationship(mut self, name: impl Into<String>) -> Self {
        self.relationship = Some(name.into());
        self
    }

    pub fn allowing_label(mut self) -> Self {
        self.allow_label = true;
        self
    }

    pub fn with_accepts(mut self, accepts: impl Into<String>) -> Self {
        self.accepts = Some(accepts.into());
        self
    }

    pub fn with_body(mut self, content_type: impl Into<String>, body: Value) -> Self {
        self.content_type = Some(content_type.into());
        self.body = Some(body);
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.push((key.into(), value.into()));
        self
    }

    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }

    pub fn about_relationship(&self) -> bool {
        self.relationship.is_some()
    }

    /// Extensions named in the `ext` media type parameter of the body
    pub fn extensions(&self) -> Vec<String> {
        self.content_type
            .as_deref()
            .map(super::media_type::MediaType::parse)
            .and_then(|media| media.param("ext").map(str::to_string))
            .map(|ext| {
                ext.split(',')
                    .map(|e| e.trim().to_string())
                    .filter(|e| !e.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// A request after validation, label resolution, parameter parsing and
/// body parsing
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub method: Method,
    pub request: Request,
    pub params: QueryParams,
    /// Parsed body data, after `beforeSave`
    pub primary: Option<PrimaryData>,
}

impl PreparedRequest {
    pub fn resource_type(&self) -> &str {
        &self.request.resource_type
    }

    pub fn id_or_ids(&self) -> Option<&IdOrIds> {
        self.request.id_or_ids.as_ref()
    }

    pub fn relationship(&self) -> Option<&str> {
        self.request.relationship.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_method_parse() {
        assert_eq!(Method::parse("GET"), Some(Method::Get));
        assert_eq!(Method::parse("patch"), Some(Method::Patch));
        assert_eq!(Method::parse("put"), None);
    }

    #[test]
    fn test_extensions() {
        let request = Request::new("post", "/people", "people")
            .with_body("application/vnd.api+json; ext=\"bulk,jsonpatch\"", json!({}));
        assert_eq!(request.extensions(), vec!["bulk", "jsonpatch"]);

        let plain = Request::new("get", "/people", "people");
        assert!(plain.extensions().is_empty());
    }

    #[test]
    fn test_id_or_ids() {
        assert!(IdOrIds::many(Vec::<String>::new()).is_empty());
        assert!(IdOrIds::many(["1", "2"]).contains("2"));
        assert_eq!(IdOrIds::single("7").as_single(), Some("7"));
    }
}
