use crate::types::{
    ApiResult, DeleteQuery, IdOrIds, PreparedRequest, PrimaryData, Query,
    RemoveFromRelationshipQuery,
};

use super::{bulk_required, owner_id, to_many_linkage, uses_bulk};

/// Delete resources, or remove linkage from a to-many relationship.
/// Without an id in the URL, the ids come from a bulk body.
pub fn make_delete(prepared: &PreparedRequest) -> ApiResult<Query> {
    let resource_type = prepared.resource_type();

    if let Some(relationship) = prepared.relationship() {
        let id = owner_id(prepared)?;
        let linkage = to_many_linkage(prepared)?;
        let query = RemoveFromRelationshipQuery::new(resource_type, id, relationship, linkage)?;
        return Ok(Query::RemoveFromRelationship(query));
    }

    if let Some(ids) = prepared.id_or_ids() {
        return Ok(Query::Delete(DeleteQuery::new(resource_type, ids.clone())?));
    }

    match &prepared.primary {
        Some(PrimaryData::Collection(collection)) if uses_bulk(prepared) => {
            let ids = IdOrIds::many(collection.iter().filter_map(|r| r.id()));
            if ids.is_empty() {
                return Err(bulk_required("A bulk delete must identify at least one resource.").into());
            }
            Ok(Query::Delete(DeleteQuery::new(resource_type, ids)?))
        }
        _ => Err(bulk_required(
            "To delete without an id in the URL, send the resources to delete using the bulk extension.",
        )
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::make_query::fixtures::{bulk, prepared};
    use crate::types::{Collection, Linkage, Method, Request, Resource, ResourceIdentifier};

    #[test]
    fn test_delete_by_url_id() {
        let request = prepared(Method::Delete, Request::new("DELETE", "/people/1", "people").with_id("1"), None);
        let Query::Delete(query) = make_delete(&request).unwrap() else {
            panic!("expected a delete");
        };
        assert_eq!(query.id_or_ids(), &IdOrIds::single("1"));
    }

    #[test]
    fn test_bulk_delete_takes_ids_from_body() {
        let people = Collection::new(vec![Resource::identified("people", "a"), Resource::identified("people", "b")]);
        let request = bulk(Method::Delete, Request::new("DELETE", "/people", "people"), people.into());
        let Query::Delete(query) = make_delete(&request).unwrap() else {
            panic!("expected a delete");
        };
        assert_eq!(query.id_or_ids(), &IdOrIds::many(["a", "b"]));
    }

    #[test]
    fn test_collection_delete_without_ids_rejected() {
        let request = prepared(Method::Delete, Request::new("DELETE", "/people", "people"), None);
        assert_eq!(make_delete(&request).unwrap_err().status(), Some(400));
    }

    #[test]
    fn test_relationship_remove() {
        let request = prepared(
            Method::Delete,
            Request::new("DELETE", "/people/1/relationships/friends", "people")
                .with_id("1")
                .with_relationship("friends"),
            Some(Linkage::many(vec![ResourceIdentifier::new("people", "2")]).into()),
        );
        assert!(matches!(make_delete(&request).unwrap(), Query::RemoveFromRelationship(_)));
    }
}
