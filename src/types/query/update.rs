use super::{assert_fields_present, QueryBase, QueryError, Records};

/// Patch one or more existing resources. Every patch resource carries the
/// id of the resource it updates.
#[derive(Debug, Clone)]
pub struct UpdateQuery {
    pub(crate) base: QueryBase,
    patch: Records,
}

impl UpdateQuery {
    pub fn new(resource_type: impl Into<String>, patch: Records) -> Result<Self, QueryError> {
        let base = QueryBase::new(resource_type)?;
        assert_fields_present(&[
            ("patch", !patch.is_empty()),
            ("id", patch.iter().all(|r| r.id().is_some_and(|id| !id.is_empty()))),
        ])?;
        Ok(Self { base, patch })
    }

    pub fn resource_type(&self) -> &str {
        self.base.resource_type()
    }

    pub fn patch(&self) -> &Records {
        &self.patch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::resource::Resource;
    use std::collections::BTreeMap;

    #[test]
    fn test_patch_needs_ids() {
        let anonymous = Resource::new("people", None, Default::default(), BTreeMap::new()).unwrap();
        let err = UpdateQuery::new("people", Records::One(anonymous)).unwrap_err();
        assert_eq!(err, QueryError::MissingFields(vec!["id"]));

        let identified = Resource::identified("people", "1");
        assert!(UpdateQuery::new("people", Records::One(identified)).is_ok());
    }
}
