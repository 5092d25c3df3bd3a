//! Body resources must belong to the endpoint's type family.

use crate::registry::ResourceTypeRegistry;
use crate::types::{ApiError, ApiResult, PrimaryData};

/// Every resource in the body must be of the endpoint type or one of its
/// registered subtypes. Violations are reported as a single 409 listing
/// each offending type once.
pub fn validate_resources(
    endpoint_type: &str,
    primary: &PrimaryData,
    registry: &ResourceTypeRegistry,
) -> ApiResult<()> {
    let mut invalid: Vec<&str> = Vec::new();
    for resource in primary.resources() {
        let resource_type = resource.resource_type();
        let allowed = registry.has_type(resource_type)
            && registry.is_type_or_subtype(resource_type, endpoint_type);
        if !allowed && !invalid.contains(&resource_type) {
            invalid.push(resource_type);
        }
    }

    if invalid.is_empty() {
        return Ok(());
    }

    let valid: Vec<&str> = registry
        .type_names()
        .into_iter()
        .filter(|t| registry.is_type_or_subtype(t, endpoint_type))
        .collect();

    Err(ApiError::conflict(
        "Some of the resources you provided are of a type that doesn't belong in this collection.",
    )
    .with_detail(format!(
        "Valid types for this collection are: {}. Invalid types: {}.",
        valid.join(", "),
        invalid.join(", ")
    ))
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::adapter::{Adapter, MemoryAdapter};
    use crate::registry::TypeDescription;
    use crate::types::{Collection, Resource};

    fn registry() -> ResourceTypeRegistry {
        let adapter: Arc<dyn Adapter> = Arc::new(MemoryAdapter::new());
        ResourceTypeRegistry::builder()
            .with_type("organizations", TypeDescription::new().with_adapter(adapter.clone()))
            .with_type("schools", TypeDescription::new().with_parent_type("organizations"))
            .with_type("people", TypeDescription::new().with_adapter(adapter))
            .build()
            .unwrap()
    }

    fn collection(types: &[&str]) -> PrimaryData {
        PrimaryData::Collection(Collection::new(
            types
                .iter()
                .enumerate()
                .map(|(i, t)| Resource::identified(*t, i.to_string()))
                .collect(),
        ))
    }

    #[test]
    fn test_subtypes_allowed() {
        let registry = registry();
        assert!(validate_resources("organizations", &collection(&["organizations", "schools"]), &registry).is_ok());
    }

    #[test]
    fn test_foreign_types_conflict() {
        let registry = registry();
        let errors = validate_resources(
            "schools",
            &collection(&["schools", "organizations", "people", "people"]),
            &registry,
        )
        .unwrap_err();

        assert_eq!(errors.len(), 1);
        let error = errors.first().unwrap();
        assert_eq!(error.status, 409);
        assert_eq!(
            error.detail.as_deref(),
            Some("Valid types for this collection are: schools. Invalid types: organizations, people.")
        );
    }

    #[test]
    fn test_linkage_and_null_have_nothing_to_check() {
        let registry = registry();
        assert!(validate_resources("people", &PrimaryData::Null, &registry).is_ok());
    }
}
