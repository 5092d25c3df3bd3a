use crate::registry::ResourceTypeRegistry;
use crate::types::{ApiResult, FindQuery, FindQueryOptions, IdOrIds, PreparedRequest, Query};

use super::owner_id;

/// A find for the request. Relationship requests fetch the owner alone;
/// everything else carries the parsed parameters, with the type's
/// default includes standing in when `include` was not sent.
pub fn make_get(prepared: &PreparedRequest, registry: &ResourceTypeRegistry) -> ApiResult<Query> {
    let resource_type = prepared.resource_type().to_string();

    if prepared.relationship().is_some() {
        let id = owner_id(prepared)?;
        let query = FindQuery::new(FindQueryOptions {
            resource_type,
            id_or_ids: Some(IdOrIds::single(id)),
            ..Default::default()
        })?;
        return Ok(Query::Find(query));
    }

    let params = &prepared.params;
    let include = params
        .include
        .clone()
        .unwrap_or_else(|| registry.default_includes(&resource_type));

    let query = FindQuery::new(FindQueryOptions {
        id_or_ids: prepared.id_or_ids().cloned(),
        fields: params.fields.clone(),
        sort: params.sort.clone(),
        filter: params.filter.clone(),
        include,
        page: params.page,
        resource_type,
    })?;
    Ok(Query::Find(query))
}
