use crate::adapter::Adapter;
use crate::types::{ApiResult, DeleteQuery, QueryResult, RemoveFromRelationshipQuery};

pub(super) async fn run(adapter: &dyn Adapter, query: &DeleteQuery) -> ApiResult<QueryResult> {
    adapter.delete(query).await?;
    Ok(QueryResult::no_content())
}

pub(super) async fn remove(
    adapter: &dyn Adapter,
    query: &RemoveFromRelationshipQuery,
) -> ApiResult<QueryResult> {
    adapter.remove_from_relationship(query).await?;
    Ok(QueryResult::no_content())
}
