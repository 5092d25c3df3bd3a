use serde_json::Value;

use crate::adapter::Adapter;
use crate::types::{ApiError, ApiResult, FindQuery, PrimaryData, QueryResult};

/// Run a find. For a relationship request the owner's linkage for that
/// relationship becomes the primary data.
pub(super) async fn run(
    adapter: &dyn Adapter,
    query: &FindQuery,
    relationship: Option<&str>,
) -> ApiResult<QueryResult> {
    let found = adapter.find(query).await?;

    if let Some(name) = relationship {
        let linkage = match &found.primary {
            PrimaryData::Resource(owner) => owner.relationship(name).cloned(),
            _ => None,
        };
        let Some(linkage) = linkage else {
            return Err(ApiError::not_found("Relationship not found")
                .with_detail(format!("{} has no relationship named {}.", query.resource_type(), name))
                .into());
        };
        return Ok(QueryResult::with_primary(PrimaryData::Linkage(linkage)));
    }

    let mut result = QueryResult::with_primary(found.primary);
    result.included = found.included;
    if let Some(total) = found.total {
        result.meta.insert("total".to_string(), Value::from(total));
    }
    Ok(result)
}
