//! Label resolution.
//!
//! A request's id segment may be a label (`/people/me`) rather than an id.
//! If the type registers a mapper for that exact label, the mapper decides
//! which ids it stands for; anything else passes through untouched.

use tracing::debug;

use crate::registry::ResourceTypeRegistry;
use crate::types::{ApiResult, IdOrIds, TransportContext};

/// Resolve `id_or_ids` through the type's label mappers. `Ok(None)` means
/// the label matched nothing.
pub async fn label_to_ids(
    resource_type: &str,
    id_or_ids: &IdOrIds,
    registry: &ResourceTypeRegistry,
    transport: &TransportContext,
) -> ApiResult<Option<IdOrIds>> {
    let IdOrIds::Id(label) = id_or_ids else {
        return Ok(Some(id_or_ids.clone()));
    };

    let (Some(mapper), Some(adapter)) = (
        registry.label_mapper(resource_type, label),
        registry.adapter(resource_type),
    ) else {
        return Ok(Some(id_or_ids.clone()));
    };

    let mapped = mapper(adapter, transport.clone()).await?;
    debug!(resource_type, label = %label, mapped = ?mapped, "resolved label");
    Ok(mapped)
}

/// Whether a mapped label leaves nothing to query
pub fn is_empty_mapping(mapped: &Option<IdOrIds>) -> bool {
    match mapped {
        None => true,
        Some(IdOrIds::Ids(ids)) => ids.is_empty(),
        Some(IdOrIds::Id(_)) => false,
    }
}
