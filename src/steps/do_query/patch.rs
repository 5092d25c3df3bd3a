use crate::adapter::Adapter;
use crate::types::{ApiResult, QueryResult, UpdateQuery};

/// Update, answering with the updated resources. Replacing a
/// relationship answers 204.
pub(super) async fn run(
    adapter: &dyn Adapter,
    query: &UpdateQuery,
    relationship: Option<&str>,
) -> ApiResult<QueryResult> {
    let updated = adapter.update(query).await?;
    if relationship.is_some() {
        return Ok(QueryResult::no_content());
    }
    Ok(QueryResult::with_primary(updated.into()))
}
