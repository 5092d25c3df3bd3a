use super::{QueryBase, QueryError};
use crate::types::filter::Predicate;
use crate::types::params::{Fields, Page, Sort};
use crate::types::request::IdOrIds;

/// Inputs for a [`FindQuery`]
#[derive(Debug, Clone, Default)]
pub struct FindQueryOptions {
    pub resource_type: String,
    pub id_or_ids: Option<IdOrIds>,
    pub fields: Option<Fields>,
    pub sort: Option<Vec<Sort>>,
    pub filter: Option<Predicate>,
    pub include: Vec<String>,
    pub page: Page,
}

/// Fetch one resource, several by id, or a filtered collection
#[derive(Debug, Clone)]
pub struct FindQuery {
    pub(crate) base: QueryBase,
    id_or_ids: Option<IdOrIds>,
    fields: Option<Fields>,
    sort: Option<Vec<Sort>>,
    filter: Option<Predicate>,
    include: Vec<String>,
    page: Page,
}

impl FindQuery {
    pub fn new(opts: FindQueryOptions) -> Result<Self, QueryError> {
        Ok(Self {
            base: QueryBase::new(opts.resource_type)?,
            id_or_ids: opts.id_or_ids,
            fields: opts.fields,
            sort: opts.sort,
            filter: opts.filter,
            include: opts.include,
            page: opts.page,
        })
    }

    pub fn resource_type(&self) -> &str {
        self.base.resource_type()
    }

    pub fn id_or_ids(&self) -> Option<&IdOrIds> {
        self.id_or_ids.as_ref()
    }

    /// A single id was requested, so the result is one resource
    pub fn is_singular(&self) -> bool {
        matches!(self.id_or_ids, Some(IdOrIds::Id(_)))
    }

    pub fn fields(&self) -> Option<&Fields> {
        self.fields.as_ref()
    }

    pub fn sort(&self) -> Option<&[Sort]> {
        self.sort.as_deref()
    }

    pub fn filter(&self) -> Option<&Predicate> {
        self.filter.as_ref()
    }

    pub fn include(&self) -> &[String] {
        &self.include
    }

    pub fn page(&self) -> Page {
        self.page
    }

    /// Copy of this query with an extra filter ANDed on
    pub fn and_filter(mut self, predicate: Predicate) -> Self {
        self.filter = Some(match self.filter.take() {
            Some(existing) => existing.and(predicate),
            None => predicate,
        });
        self
    }

    pub fn with_sort(mut self, sort: Vec<Sort>) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn with_include(mut self, include: Vec<String>) -> Self {
        self.include = include;
        self
    }

    pub fn with_page(mut self, page: Page) -> Self {
        self.page = page;
        self
    }

    pub fn with_fields(mut self, fields: Fields) -> Self {
        self.fields = Some(fields);
        self
    }
}
