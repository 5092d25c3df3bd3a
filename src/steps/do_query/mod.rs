//! # Query Executors
//!
//! Run a built [`Query`] against the type's adapter and shape the outcome
//! into a [`QueryResult`]. Executors never retry; adapter failures pass
//! through the query's `catch` hook and then out as-is.

mod delete;
mod get;
mod patch;
mod post;

use std::sync::Arc;

use tracing::debug;

use crate::adapter::Adapter;
use crate::registry::ResourceTypeRegistry;
use crate::types::{ApiError, ApiResult, PreparedRequest, Query, QueryResult};

/// Execute `query`, then run its `returning` / `catch` hooks
pub async fn do_query(
    query: Query,
    prepared: &PreparedRequest,
    registry: &ResourceTypeRegistry,
) -> ApiResult<QueryResult> {
    let adapter = adapter_for(registry, query.resource_type())?;
    debug!(query = query.name(), resource_type = query.resource_type(), "executing query");

    let outcome = match &query {
        Query::Find(find) => get::run(adapter.as_ref(), find, prepared.relationship()).await,
        Query::Create(create) => post::create(adapter.as_ref(), create, registry).await,
        Query::AddToRelationship(add) => post::add(adapter.as_ref(), add).await,
        Query::Update(update) => patch::run(adapter.as_ref(), update, prepared.relationship()).await,
        Query::Delete(delete) => delete::run(adapter.as_ref(), delete).await,
        Query::RemoveFromRelationship(remove) => delete::remove(adapter.as_ref(), remove).await,
    };

    query.base().finish(outcome)
}

fn adapter_for(registry: &ResourceTypeRegistry, resource_type: &str) -> ApiResult<Arc<dyn Adapter>> {
    registry.adapter(resource_type).ok_or_else(|| {
        ApiError::internal("No adapter")
            .with_detail(format!("No adapter is registered for {}.", resource_type))
            .into()
    })
}

#[cfg(test)]
pub(super) mod fixtures {
    use std::sync::Arc;

    use serde_json::{Map, Value};

    use crate::adapter::{Adapter, MemoryAdapter};
    use crate::registry::{ResourceTypeRegistry, TypeDescription, UrlTemplates};
    use crate::types::{Linkage, Resource, ResourceIdentifier};

    pub fn person(id: &str, name: &str, friends: &[&str]) -> Resource {
        let mut attributes = Map::new();
        attributes.insert("name".to_string(), Value::from(name));
        let mut resource = Resource::new("people", Some(id.to_string()), attributes, Default::default()).unwrap();
        resource
            .set_relationship(
                "friends",
                Linkage::many(friends.iter().map(|f| ResourceIdentifier::new("people", *f))),
            )
            .unwrap();
        resource
    }

    pub fn people() -> (Arc<MemoryAdapter>, ResourceTypeRegistry) {
        let memory = Arc::new(MemoryAdapter::new().with_resources(vec![
            person("1", "John Smith", &["2"]),
            person("2", "Jane Doe", &[]),
            person("3", "Doug Wilson", &["1", "2"]),
        ]));
        let adapter: Arc<dyn Adapter> = memory.clone();
        let registry = ResourceTypeRegistry::builder()
            .with_type(
                "people",
                TypeDescription::new()
                    .with_adapter(adapter)
                    .with_url_templates(UrlTemplates::conventional("http://127.0.0.1:3000", "people")),
            )
            .build()
            .unwrap();
        (memory, registry)
    }
}
