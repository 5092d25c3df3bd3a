//! Method and body preconditions.

use crate::types::{ApiError, ApiResult, Method, Request};

/// The verb must be one the pipeline dispatches on
pub fn check_method(request: &Request) -> ApiResult<Method> {
    Method::parse(&request.method).ok_or_else(|| {
        ApiError::method_not_allowed("Method not supported")
            .with_detail(format!(
                "The method \"{}\" is not supported.",
                request.method
            ))
            .into()
    })
}

/// POST and PATCH need a body, as does DELETE on a relationship. GET
/// never takes one; DELETE on a collection may (bulk delete).
pub fn check_body_existence(request: &Request, method: Method) -> ApiResult<()> {
    let needs_body = match method {
        Method::Post | Method::Patch => true,
        Method::Delete => request.about_relationship(),
        Method::Get => false,
    };
    let allows_body = needs_body || method == Method::Delete;

    match (request.has_body(), needs_body, allows_body) {
        (false, true, _) => Err(ApiError::bad_request("Request body missing")
            .with_detail("This request needs a body, but didn't have one.")
            .into()),
        (true, _, false) => Err(ApiError::bad_request("Unexpected request body")
            .with_detail("This request should not have a body, but does.")
            .into()),
        _ => Ok(()),
    }
}
