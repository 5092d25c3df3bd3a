use super::{assert_fields_present, QueryBase, QueryError, Records};

/// Create one or more resources
#[derive(Debug, Clone)]
pub struct CreateQuery {
    pub(crate) base: QueryBase,
    records: Records,
}

impl CreateQuery {
    pub fn new(resource_type: impl Into<String>, records: Records) -> Result<Self, QueryError> {
        let base = QueryBase::new(resource_type)?;
        assert_fields_present(&[("records", !records.is_empty())])?;
        Ok(Self { base, records })
    }

    pub fn resource_type(&self) -> &str {
        self.base.resource_type()
    }

    pub fn records(&self) -> &Records {
        &self.records
    }
}
