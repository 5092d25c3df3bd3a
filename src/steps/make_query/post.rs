use crate::types::{
    AddToRelationshipQuery, ApiError, ApiResult, CreateQuery, PreparedRequest, PrimaryData, Query,
    Records,
};

use super::{bulk_required, owner_id, to_many_linkage, uses_bulk};

/// Create resources, or append to a to-many relationship
pub fn make_post(prepared: &PreparedRequest) -> ApiResult<Query> {
    let resource_type = prepared.resource_type();

    if let Some(relationship) = prepared.relationship() {
        let id = owner_id(prepared)?;
        let linkage = to_many_linkage(prepared)?;
        let query = AddToRelationshipQuery::new(resource_type, id, relationship, linkage)?;
        return Ok(Query::AddToRelationship(query));
    }

    if prepared.id_or_ids().is_some() {
        return Err(ApiError::method_not_allowed("Method not allowed")
            .with_detail("You can't POST to an individual resource URI.")
            .into());
    }

    let records = match &prepared.primary {
        Some(PrimaryData::Resource(resource)) => Records::One(resource.clone()),
        Some(PrimaryData::Collection(collection)) => {
            if !uses_bulk(prepared) {
                return Err(bulk_required(
                    "You must use the bulk extension to create multiple resources at once.",
                )
                .into());
            }
            Records::Many(collection.clone())
        }
        _ => {
            return Err(ApiError::bad_request("Invalid request body")
                .with_detail("Creating resources requires a resource object or an array of them.")
                .with_pointer("/data")
                .into())
        }
    };

    Ok(Query::Create(CreateQuery::new(resource_type, records)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::make_query::fixtures::{bulk, prepared};
    use crate::types::{Collection, Linkage, Method, Request, Resource, ResourceIdentifier};

    #[test]
    fn test_single_create() {
        let request = prepared(
            Method::Post,
            Request::new("POST", "/people", "people"),
            Some(Resource::identified("people", "new").into()),
        );
        let Query::Create(query) = make_post(&request).unwrap() else {
            panic!("expected a create");
        };
        assert_eq!(query.records().len(), 1);
    }

    #[test]
    fn test_collection_needs_bulk() {
        let people = Collection::new(vec![Resource::identified("people", "a"), Resource::identified("people", "b")]);

        let plain = prepared(Method::Post, Request::new("POST", "/people", "people"), Some(people.clone().into()));
        assert_eq!(make_post(&plain).unwrap_err().status(), Some(400));

        let with_bulk = bulk(Method::Post, Request::new("POST", "/people", "people"), people.into());
        assert!(matches!(make_post(&with_bulk).unwrap(), Query::Create(_)));
    }

    #[test]
    fn test_post_to_individual_resource() {
        let request = prepared(
            Method::Post,
            Request::new("POST", "/people/1", "people").with_id("1"),
            Some(Resource::identified("people", "1").into()),
        );
        assert_eq!(make_post(&request).unwrap_err().status(), Some(405));
    }

    #[test]
    fn test_null_body_rejected() {
        let request = prepared(Method::Post, Request::new("POST", "/people", "people"), Some(PrimaryData::Null));
        assert_eq!(make_post(&request).unwrap_err().status(), Some(400));
    }

    #[test]
    fn test_relationship_add() {
        let linkage = Linkage::many(vec![ResourceIdentifier::new("people", "2")]);
        let request = prepared(
            Method::Post,
            Request::new("POST", "/people/1/relationships/friends", "people")
                .with_id("1")
                .with_relationship("friends"),
            Some(linkage.clone().into()),
        );
        let Query::AddToRelationship(query) = make_post(&request).unwrap() else {
            panic!("expected an add");
        };
        assert_eq!(query.id(), "1");
        assert_eq!(query.relationship_name(), "friends");
        assert_eq!(query.linkage(), &linkage);
    }

    #[test]
    fn test_relationship_add_needs_to_many_linkage() {
        let request = prepared(
            Method::Post,
            Request::new("POST", "/people/1/relationships/boss", "people")
                .with_id("1")
                .with_relationship("boss"),
            Some(Linkage::Single(ResourceIdentifier::new("people", "2")).into()),
        );
        assert_eq!(make_post(&request).unwrap_err().status(), Some(400));
    }
}
