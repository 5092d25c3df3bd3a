//! # API Errors
//!
//! Client-facing error objects, and the normalization of arbitrary
//! failures into them.

use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::adapter::AdapterError;

use super::linkage::LinkageError;
use super::query::QueryError;

/// Result type for every pipeline stage
pub type ApiResult<T> = Result<T, ApiErrors>;

const UNKNOWN_ERROR_TITLE: &str =
    "An unknown error occurred while trying to process this request.";

/// Where in the request an error originated
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ErrorSource {
    /// JSON pointer into the request document
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pointer: Option<String>,

    /// Query parameter that caused the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,
}

/// A single JSON:API error object
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiError {
    /// HTTP status, rendered as a string on the wire
    #[serde(serialize_with = "status_as_string")]
    pub status: u16,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<ErrorSource>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Map<String, Value>>,
}

fn status_as_string<S: Serializer>(status: &u16, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&status.to_string())
}

impl ApiError {
    /// Create an error with only a status
    pub fn new(status: u16) -> Self {
        Self {
            status,
            code: None,
            title: None,
            detail: None,
            source: None,
            meta: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Point at the query parameter that caused the error
    pub fn with_parameter(mut self, parameter: impl Into<String>) -> Self {
        self.source.get_or_insert_with(ErrorSource::default).parameter = Some(parameter.into());
        self
    }

    /// Point at the location in the request document that caused the error
    pub fn with_pointer(mut self, pointer: impl Into<String>) -> Self {
        self.source.get_or_insert_with(ErrorSource::default).pointer = Some(pointer.into());
        self
    }

    pub fn with_meta(mut self, meta: Map<String, Value>) -> Self {
        self.meta = Some(meta);
        self
    }

    /// 400 Bad Request
    pub fn bad_request(title: impl Into<String>) -> Self {
        Self::new(400).with_title(title)
    }

    /// 404 Not Found
    pub fn not_found(title: impl Into<String>) -> Self {
        Self::new(404).with_title(title)
    }

    /// 405 Method Not Allowed
    pub fn method_not_allowed(title: impl Into<String>) -> Self {
        Self::new(405).with_title(title)
    }

    /// 406 Not Acceptable
    pub fn not_acceptable(title: impl Into<String>) -> Self {
        Self::new(406).with_title(title)
    }

    /// 409 Conflict
    pub fn conflict(title: impl Into<String>) -> Self {
        Self::new(409).with_title(title)
    }

    /// 415 Unsupported Media Type
    pub fn unsupported_media_type(title: impl Into<String>) -> Self {
        Self::new(415).with_title(title)
    }

    /// 500 Internal Server Error
    pub fn internal(title: impl Into<String>) -> Self {
        Self::new(500).with_title(title)
    }

    /// Normalize any error into an API error.
    ///
    /// Errors that already know their client-facing shape keep it; anything
    /// else becomes an opaque 500 so internals never leak to the client.
    pub fn from_error(err: &(dyn std::error::Error + 'static)) -> Self {
        if let Some(api) = err.downcast_ref::<ApiError>() {
            return api.clone();
        }
        if let Some(adapter) = err.downcast_ref::<AdapterError>() {
            return adapter.to_api_error();
        }
        if let Some(linkage) = err.downcast_ref::<LinkageError>() {
            return ApiError::from(linkage.clone());
        }
        if let Some(query) = err.downcast_ref::<QueryError>() {
            return ApiError::from(query.clone());
        }
        Self::internal(UNKNOWN_ERROR_TITLE)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.status)?;
        if let Some(title) = &self.title {
            write!(f, " {}", title)?;
        }
        if let Some(detail) = &self.detail {
            write!(f, ": {}", detail)?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

/// An ordered set of errors discovered by one pipeline stage
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiErrors(Vec<ApiError>);

impl ApiErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: ApiError) {
        self.0.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ApiError> {
        self.0.iter()
    }

    pub fn first(&self) -> Option<&ApiError> {
        self.0.first()
    }

    /// Status of the response carrying these errors: the first error's.
    pub fn status(&self) -> Option<u16> {
        self.0.first().map(|e| e.status)
    }

    pub fn into_vec(self) -> Vec<ApiError> {
        self.0
    }

    /// `Ok(())` when nothing was collected, the set otherwise
    pub fn into_result(self) -> ApiResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ApiErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiErrors {}

impl From<ApiError> for ApiErrors {
    fn from(error: ApiError) -> Self {
        Self(vec![error])
    }
}

impl From<Vec<ApiError>> for ApiErrors {
    fn from(errors: Vec<ApiError>) -> Self {
        Self(errors)
    }
}

impl From<LinkageError> for ApiErrors {
    fn from(error: LinkageError) -> Self {
        ApiError::from(error).into()
    }
}

impl From<QueryError> for ApiErrors {
    fn from(error: QueryError) -> Self {
        ApiError::from(error).into()
    }
}

impl From<AdapterError> for ApiErrors {
    fn from(error: AdapterError) -> Self {
        error.to_api_error().into()
    }
}

impl FromIterator<ApiError> for ApiErrors {
    fn from_iter<I: IntoIterator<Item = ApiError>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<ApiError> for ApiErrors {
    fn extend<I: IntoIterator<Item = ApiError>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl IntoIterator for ApiErrors {
    type Item = ApiError;
    type IntoIter = std::vec::IntoIter<ApiError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serialization_omits_missing_members() {
        let error = ApiError::new(499).with_title("custom error as string");
        let json = serde_json::to_value(&error).unwrap();
        assert_eq!(json, json!({"status": "499", "title": "custom error as string"}));
    }

    #[test]
    fn test_source_parameter() {
        let error = ApiError::bad_request("Invalid sort").with_parameter("sort");
        let json = serde_json::to_value(&error).unwrap();
        assert_eq!(json["source"], json!({"parameter": "sort"}));
    }

    #[test]
    fn test_from_error_keeps_api_errors() {
        let original = ApiError::conflict("taken").with_detail("id 1 exists");
        let normalized = ApiError::from_error(&original);
        assert_eq!(normalized, original);
    }

    #[test]
    fn test_from_error_hides_unknown_errors() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let normalized = ApiError::from_error(&io);
        assert_eq!(normalized.status, 500);
        assert_eq!(normalized.title.as_deref(), Some(UNKNOWN_ERROR_TITLE));
        assert!(normalized.detail.is_none());
    }

    #[test]
    fn test_errors_status_is_first_status() {
        let errors: ApiErrors = vec![ApiError::new(409), ApiError::new(400)].into();
        assert_eq!(errors.status(), Some(409));
        assert_eq!(errors.len(), 2);
    }
}
