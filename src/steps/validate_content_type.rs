//! Request body media type checks.

use crate::types::media_type::{MediaType, JSON_API};
use crate::types::{ApiError, ApiErrors, ApiResult, Request};

/// A body must be sent as JSON:API, with no parameters besides `ext`, and
/// every named extension must be one the server supports.
pub fn validate_content_type(request: &Request, supported_ext: &[String]) -> ApiResult<()> {
    let Some(raw) = request.content_type.as_deref() else {
        return Err(ApiError::unsupported_media_type("Missing Content-Type")
            .with_detail(format!("Request bodies must be sent as {}.", JSON_API))
            .into());
    };

    let media = MediaType::parse(raw);
    if media.essence != JSON_API {
        return Err(ApiError::unsupported_media_type("Unsupported Media Type")
            .with_detail(format!(
                "The request's Content-Type must be {}, but you provided {}.",
                JSON_API, media.essence
            ))
            .into());
    }

    let mut errors = ApiErrors::new();

    let unknown_params: Vec<&str> = media
        .params
        .iter()
        .map(|(name, _)| name.as_str())
        .filter(|name| *name != "ext")
        .collect();
    if !unknown_params.is_empty() {
        errors.push(
            ApiError::unsupported_media_type("Invalid Media Type Parameter(s)").with_detail(
                format!(
                    "The request's Content-Type may only carry the ext parameter; found: {}.",
                    unknown_params.join(", ")
                ),
            ),
        );
    }

    let unsupported: Vec<String> = request
        .extensions()
        .into_iter()
        .filter(|ext| !supported_ext.contains(ext))
        .collect();
    if !unsupported.is_empty() {
        errors.push(
            ApiError::unsupported_media_type("Unsupported Extension(s)").with_detail(format!(
                "This endpoint does not support the extension(s): {}.",
                unsupported.join(", ")
            )),
        );
    }

    errors.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(content_type: &str) -> Request {
        Request::new("post", "/people", "people").with_body(content_type, json!({"data": null}))
    }

    #[test]
    fn test_plain_json_api_accepted() {
        assert!(validate_content_type(&request(JSON_API), &[]).is_ok());
    }

    #[test]
    fn test_other_media_types_rejected() {
        let errors = validate_content_type(&request("application/json"), &[]).unwrap_err();
        assert_eq!(errors.status(), Some(415));
    }

    #[test]
    fn test_extensions_checked() {
        let bulk = request("application/vnd.api+json; ext=bulk");
        assert_eq!(validate_content_type(&bulk, &[]).unwrap_err().status(), Some(415));
        assert!(validate_content_type(&bulk, &["bulk".to_string()]).is_ok());
    }

    #[test]
    fn test_problems_collected() {
        let bad = request("application/vnd.api+json; charset=utf-8; ext=bulk");
        let errors = validate_content_type(&bad, &[]).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_missing_content_type() {
        let mut no_type = request(JSON_API);
        no_type.content_type = None;
        assert_eq!(validate_content_type(&no_type, &[]).unwrap_err().status(), Some(415));
    }
}
