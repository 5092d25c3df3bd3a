//! Request document shape checks.

use serde_json::Value;

use crate::types::{ApiError, ApiErrors, ApiResult};

/// Check the body is a document whose `data` is null, a resource object
/// or an array of them. Every problem found is reported.
pub fn validate_document(body: &Value) -> ApiResult<()> {
    let Some(document) = body.as_object() else {
        return Err(invalid("The request body must be a JSON object.", "").into());
    };
    let Some(data) = document.get("data") else {
        return Err(invalid("The request document must contain a data member.", "/data").into());
    };

    let mut errors = ApiErrors::new();
    match data {
        Value::Null => {}
        Value::Object(_) => check_resource_object(data, "/data", &mut errors),
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                check_resource_object(item, &format!("/data/{}", i), &mut errors);
            }
        }
        _ => errors.push(invalid(
            "data must be null, an object, or an array of objects.",
            "/data",
        )),
    }

    if let Some(meta) = document.get("meta") {
        if !meta.is_object() {
            errors.push(invalid("meta must be an object.", "/meta"));
        }
    }

    errors.into_result()
}

fn check_resource_object(value: &Value, pointer: &str, errors: &mut ApiErrors) {
    let Some(object) = value.as_object() else {
        errors.push(invalid("Every resource object must be a JSON object.", pointer));
        return;
    };

    match object.get("type") {
        Some(Value::String(t)) if !t.is_empty() => {}
        _ => errors.push(invalid(
            "Every resource object must have a string type.",
            &format!("{}/type", pointer),
        )),
    }

    if let Some(id) = object.get("id") {
        if !id.is_string() {
            errors.push(invalid("Resource ids must be strings.", &format!("{}/id", pointer)));
        }
    }

    for member in ["attributes", "meta"] {
        if let Some(v) = object.get(member) {
            if !v.is_object() {
                errors.push(invalid(
                    &format!("{} must be an object.", member),
                    &format!("{}/{}", pointer, member),
                ));
            }
        }
    }

    match object.get("relationships") {
        None => {}
        Some(Value::Object(relationships)) => {
            for (name, relationship) in relationships {
                let has_data = relationship
                    .as_object()
                    .map_or(false, |r| r.contains_key("data"));
                if !has_data {
                    errors.push(invalid(
                        "Every relationship object must contain a data member.",
                        &format!("{}/relationships/{}", pointer, name),
                    ));
                }
            }
        }
        Some(_) => errors.push(invalid(
            "relationships must be an object.",
            &format!("{}/relationships", pointer),
        )),
    }
}

fn invalid(detail: &str, pointer: &str) -> ApiError {
    ApiError::bad_request("Request document invalid")
        .with_detail(detail)
        .with_pointer(pointer)
}
