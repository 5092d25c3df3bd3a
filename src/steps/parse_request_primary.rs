//! Body `data` to typed primary data.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::types::{ApiError, ApiErrors, ApiResult, Collection, Linkage, PrimaryData, Resource};

/// Parse `data` from an already validated document. Relationship
/// endpoints take linkage; everything else takes resource objects.
pub fn parse_request_primary(data: &Value, about_relationship: bool) -> ApiResult<PrimaryData> {
    if about_relationship {
        let linkage = Linkage::from_json(data)
            .map_err(|e| ApiError::from(e).with_pointer("/data"))?;
        return Ok(PrimaryData::Linkage(linkage));
    }

    match data {
        Value::Null => Ok(PrimaryData::Null),
        Value::Array(items) => {
            let mut errors = ApiErrors::new();
            let mut resources = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                match resource_from_json(item, &format!("/data/{}", i)) {
                    Ok(resource) => resources.push(resource),
                    Err(e) => errors.extend(e),
                }
            }
            errors.into_result()?;
            Ok(PrimaryData::Collection(Collection::new(resources)))
        }
        other => Ok(PrimaryData::Resource(resource_from_json(other, "/data")?)),
    }
}

fn resource_from_json(value: &Value, pointer: &str) -> ApiResult<Resource> {
    let resource_type = value.get("type").and_then(Value::as_str).unwrap_or_default();
    let id = value.get("id").and_then(Value::as_str).map(str::to_string);
    let attributes = value
        .get("attributes")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    let mut errors = ApiErrors::new();
    let mut relationships = BTreeMap::new();
    if let Some(raw) = value.get("relationships").and_then(Value::as_object) {
        for (name, relationship) in raw {
            let data = relationship.get("data").unwrap_or(&Value::Null);
            match Linkage::from_json(data) {
                Ok(linkage) => {
                    relationships.insert(name.clone(), linkage);
                }
                Err(e) => errors.push(
                    ApiError::from(e)
                        .with_pointer(format!("{}/relationships/{}/data", pointer, name)),
                ),
            }
        }
    }
    errors.into_result()?;

    let mut resource = Resource::new(resource_type, id, attributes, relationships).map_err(|errs| {
        errs.into_iter()
            .map(|e| e.with_pointer(pointer.to_string()))
            .collect::<ApiErrors>()
    })?;

    if let Some(meta) = value.get("meta").and_then(Value::as_object) {
        *resource.meta_mut() = meta.clone();
    }
    Ok(resource)
}
