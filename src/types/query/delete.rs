use super::{assert_fields_present, QueryBase, QueryError};
use crate::types::request::IdOrIds;

/// Delete one resource, or several by id
#[derive(Debug, Clone)]
pub struct DeleteQuery {
    pub(crate) base: QueryBase,
    id_or_ids: IdOrIds,
}

impl DeleteQuery {
    pub fn new(resource_type: impl Into<String>, id_or_ids: IdOrIds) -> Result<Self, QueryError> {
        let base = QueryBase::new(resource_type)?;
        assert_fields_present(&[("id", !id_or_ids.is_empty())])?;
        Ok(Self { base, id_or_ids })
    }

    pub fn resource_type(&self) -> &str {
        self.base.resource_type()
    }

    pub fn id_or_ids(&self) -> &IdOrIds {
        &self.id_or_ids
    }
}
