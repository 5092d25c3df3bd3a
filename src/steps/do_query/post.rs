use crate::adapter::Adapter;
use crate::registry::ResourceTypeRegistry;
use crate::types::{AddToRelationshipQuery, ApiResult, CreateQuery, QueryResult, Records};

/// Create, answering 201 with the stored data. A single created
/// resource also gets a `Location` header when its type has a self link
/// template.
pub(super) async fn create(
    adapter: &dyn Adapter,
    query: &CreateQuery,
    registry: &ResourceTypeRegistry,
) -> ApiResult<QueryResult> {
    let created = adapter.create(query).await?;

    let location = match &created {
        Records::One(resource) => resource.id().and_then(|id| {
            registry
                .url_templates_for(resource.resource_type())
                .and_then(|templates| templates.resource_link(resource.resource_type(), id))
        }),
        Records::Many(_) => None,
    };

    let mut result = QueryResult::with_primary(created.into());
    result.status = Some(201);
    if let Some(location) = location {
        result.headers.insert("Location".to_string(), location);
    }
    Ok(result)
}

pub(super) async fn add(adapter: &dyn Adapter, query: &AddToRelationshipQuery) -> ApiResult<QueryResult> {
    adapter.add_to_relationship(query).await?;
    Ok(QueryResult::no_content())
}
