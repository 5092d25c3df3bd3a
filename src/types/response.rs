//! # Response
//!
//! What the controller hands back to the HTTP binding.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use super::api_error::ApiError;
use super::document::PrimaryData;
use super::media_type::JSON_API;
use super::resource::Resource;

/// A fully assembled response
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,

    pub content_type: Option<String>,

    pub headers: BTreeMap<String, String>,

    /// Errors that replaced any data
    pub errors: Vec<ApiError>,

    pub primary: Option<PrimaryData>,

    pub included: Vec<Resource>,

    pub meta: Map<String, Value>,

    /// Serialized document; `None` for 204 responses
    pub body: Option<Value>,
}

impl Default for Response {
    fn default() -> Self {
        Self {
            status: 200,
            content_type: Some(JSON_API.to_string()),
            headers: BTreeMap::new(),
            errors: Vec::new(),
            primary: None,
            included: Vec::new(),
            meta: Map::new(),
            body: None,
        }
    }
}

impl Response {
    pub fn is_error(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Body as a JSON string, if any
    pub fn body_string(&self) -> Option<String> {
        self.body.as_ref().map(Value::to_string)
    }
}
