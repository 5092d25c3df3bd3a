use super::{assert_fields_present, QueryBase, QueryError};
use crate::types::linkage::Linkage;

/// Append linkage to a to-many relationship
#[derive(Debug, Clone)]
pub struct AddToRelationshipQuery {
    pub(crate) base: QueryBase,
    id: String,
    relationship_name: String,
    linkage: Linkage,
}

impl AddToRelationshipQuery {
    pub fn new(
        resource_type: impl Into<String>,
        id: impl Into<String>,
        relationship_name: impl Into<String>,
        linkage: Linkage,
    ) -> Result<Self, QueryError> {
        let base = QueryBase::new(resource_type)?;
        let id = id.into();
        let relationship_name = relationship_name.into();
        assert_fields_present(&[
            ("id", !id.is_empty()),
            ("relationshipName", !relationship_name.is_empty()),
        ])?;

        Ok(Self {
            base,
            id,
            relationship_name,
            linkage,
        })
    }

    pub fn resource_type(&self) -> &str {
        self.base.resource_type()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn relationship_name(&self) -> &str {
        &self.relationship_name
    }

    pub fn linkage(&self) -> &Linkage {
        &self.linkage
    }
}

/// Remove linkage from a to-many relationship
#[derive(Debug, Clone)]
pub struct RemoveFromRelationshipQuery {
    pub(crate) base: QueryBase,
    id: String,
    relationship_name: String,
    linkage: Linkage,
}

impl RemoveFromRelationshipQuery {
    pub fn new(
        resource_type: impl Into<String>,
        id: impl Into<String>,
        relationship_name: impl Into<String>,
        linkage: Linkage,
    ) -> Result<Self, QueryError> {
        let base = QueryBase::new(resource_type)?;
        let id = id.into();
        let relationship_name = relationship_name.into();
        assert_fields_present(&[
            ("id", !id.is_empty()),
            ("relationshipName", !relationship_name.is_empty()),
        ])?;

        Ok(Self {
            base,
            id,
            relationship_name,
            linkage,
        })
    }

    pub fn resource_type(&self) -> &str {
        self.base.resource_type()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn relationship_name(&self) -> &str {
        &self.relationship_name
    }

    pub fn linkage(&self) -> &Linkage {
        &self.linkage
    }
}
