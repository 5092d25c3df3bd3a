use crate::types::{
    ApiError, ApiErrors, ApiResult, PreparedRequest, PrimaryData, Query, Records, Resource,
    UpdateQuery,
};

use super::{bulk_required, owner_id, uses_bulk};

/// Update resources, or replace a relationship's linkage
pub fn make_patch(prepared: &PreparedRequest) -> ApiResult<Query> {
    let resource_type = prepared.resource_type();

    if let Some(relationship) = prepared.relationship() {
        let id = owner_id(prepared)?;
        let Some(PrimaryData::Linkage(linkage)) = &prepared.primary else {
            return Err(ApiError::bad_request("Invalid linkage")
                .with_detail("Replacing a relationship requires resource linkage.")
                .with_pointer("/data")
                .into());
        };
        let mut patch = Resource::identified(resource_type, id);
        patch.set_relationship(relationship, linkage.clone())?;
        return Ok(Query::Update(UpdateQuery::new(resource_type, Records::One(patch))?));
    }

    let patch = match (prepared.id_or_ids(), &prepared.primary) {
        (Some(ids), Some(PrimaryData::Resource(resource))) => {
            let target = ids.as_single().unwrap_or_default();
            if resource.id() != Some(target) {
                return Err(ApiError::conflict("Resource id mismatch")
                    .with_detail(format!(
                        "The id of the resource you provided doesn't match the id in the URL ({}).",
                        target
                    ))
                    .with_pointer("/data/id")
                    .into());
            }
            Records::One(resource.clone())
        }
        (Some(_), _) => {
            return Err(ApiError::bad_request("Invalid request body")
                .with_detail("Updating a single resource requires a single resource object.")
                .with_pointer("/data")
                .into())
        }
        (None, Some(PrimaryData::Collection(collection))) => {
            if !uses_bulk(prepared) {
                return Err(bulk_required(
                    "You must use the bulk extension to update multiple resources at once.",
                )
                .into());
            }
            let missing: ApiErrors = collection
                .iter()
                .enumerate()
                .filter(|(_, resource)| resource.id().is_none())
                .map(|(i, _)| {
                    ApiError::bad_request("Missing resource id")
                        .with_detail("Every resource in a bulk update must have an id.")
                        .with_pointer(format!("/data/{}/id", i))
                })
                .collect();
            missing.into_result()?;
            Records::Many(collection.clone())
        }
        (None, _) => {
            return Err(bulk_required(
                "To update without an id in the URL, send an array of resources using the bulk extension.",
            )
            .into())
        }
    };

    Ok(Query::Update(UpdateQuery::new(resource_type, patch)?))
}
