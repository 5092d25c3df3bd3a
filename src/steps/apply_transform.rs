//! Runs a type's `beforeSave` / `beforeRender` hook over data.
//!
//! Each resource goes through the hook registered for its own type (or an
//! ancestor's). Collections are transformed member by member, in order,
//! and members the hook removes are dropped. Linkage and null pass
//! through.

use std::sync::Arc;

use crate::registry::{ResourceTypeRegistry, TransformContext, TransformMode};
use crate::types::{ApiResult, Collection, PrimaryData, Resource};

/// Transform primary data. A removed single resource becomes null.
pub async fn apply_transform(
    data: PrimaryData,
    mode: TransformMode,
    registry: &ResourceTypeRegistry,
    ctx: &Arc<TransformContext>,
) -> ApiResult<PrimaryData> {
    match data {
        PrimaryData::Resource(resource) => Ok(transform_one(resource, mode, registry, ctx)
            .await?
            .map_or(PrimaryData::Null, PrimaryData::Resource)),
        PrimaryData::Collection(collection) => {
            let resources = apply_transform_all(collection.into_resources(), mode, registry, ctx).await?;
            Ok(PrimaryData::Collection(Collection::new(resources)))
        }
        other => Ok(other),
    }
}

/// Transform a list of resources (e.g. `included`), dropping removals
pub async fn apply_transform_all(
    resources: Vec<Resource>,
    mode: TransformMode,
    registry: &ResourceTypeRegistry,
    ctx: &Arc<TransformContext>,
) -> ApiResult<Vec<Resource>> {
    let mut kept = Vec::with_capacity(resources.len());
    for resource in resources {
        if let Some(resource) = transform_one(resource, mode, registry, ctx).await? {
            kept.push(resource);
        }
    }
    Ok(kept)
}

async fn transform_one(
    resource: Resource,
    mode: TransformMode,
    registry: &ResourceTypeRegistry,
    ctx: &Arc<TransformContext>,
) -> ApiResult<Option<Resource>> {
    match registry.transform_for(resource.resource_type(), mode) {
        Some(hook) => hook(resource, Arc::clone(ctx)).await,
        None => Ok(Some(resource)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::adapter::{Adapter, MemoryAdapter};
    use crate::registry::TypeDescription;
    use crate::types::{ApiError, Linkage};

    fn registry() -> ResourceTypeRegistry {
        let adapter: Arc<dyn Adapter> = Arc::new(MemoryAdapter::new());
        ResourceTypeRegistry::builder()
            .with_type(
                "organizations",
                TypeDescription::new()
                    .with_adapter(adapter.clone())
                    .with_before_render(|mut resource, _| async move {
                        if resource.id() == Some("hidden") {
                            return Ok(None);
                        }
                        resource.set_attribute("addedBeforeRender", json!(true))?;
                        Ok(Some(resource))
                    })
                    .with_before_save(|_, _| async { Err(ApiError::new(499).with_title("custom error as string").into()) }),
            )
            .with_type("schools", TypeDescription::new().with_parent_type("organizations"))
            .with_type("people", TypeDescription::new().with_adapter(adapter))
            .build()
            .unwrap()
    }

    fn ctx() -> Arc<TransformContext> {
        Arc::new(TransformContext::default())
    }

    #[tokio::test]
    async fn test_collection_transformed_in_order_with_removals() {
        let data = PrimaryData::Collection(Collection::new(vec![
            Resource::identified("organizations", "a"),
            Resource::identified("organizations", "hidden"),
            Resource::identified("schools", "b"),
            Resource::identified("people", "c"),
        ]));

        let PrimaryData::Collection(out) =
            apply_transform(data, TransformMode::BeforeRender, &registry(), &ctx()).await.unwrap()
        else {
            panic!("expected a collection");
        };

        let ids: Vec<_> = out.iter().map(|r| r.id().unwrap()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(out.resources()[1].attribute("addedBeforeRender"), Some(&json!(true)));
        assert_eq!(out.resources()[2].attribute("addedBeforeRender"), None);
    }

    #[tokio::test]
    async fn test_removed_single_resource_is_null() {
        let data = PrimaryData::Resource(Resource::identified("organizations", "hidden"));
        let out = apply_transform(data, TransformMode::BeforeRender, &registry(), &ctx()).await.unwrap();
        assert_eq!(out, PrimaryData::Null);
    }

    #[tokio::test]
    async fn test_hook_errors_surface() {
        let data = PrimaryData::Resource(Resource::identified("schools", "s"));
        let errors = apply_transform(data, TransformMode::BeforeSave, &registry(), &ctx())
            .await
            .unwrap_err();
        assert_eq!(errors.status(), Some(499));
    }

    #[tokio::test]
    async fn test_linkage_passes_through() {
        let data = PrimaryData::Linkage(Linkage::empty_many());
        let out = apply_transform(data.clone(), TransformMode::BeforeSave, &registry(), &ctx())
            .await
            .unwrap();
        assert_eq!(out, data);
    }
}
