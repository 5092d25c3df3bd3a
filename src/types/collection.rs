//! # Collection
//!
//! Ordered "many" primary data. An empty collection is not the same thing
//! as null primary data.

use super::resource::Resource;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collection {
    resources: Vec<Resource>,
}

impl Collection {
    pub fn new(resources: Vec<Resource>) -> Self {
        Self { resources }
    }

    pub fn push(&mut self, resource: Resource) {
        self.resources.push(resource);
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Resource> {
        self.resources.iter()
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn into_resources(self) -> Vec<Resource> {
        self.resources
    }
}

impl From<Vec<Resource>> for Collection {
    fn from(resources: Vec<Resource>) -> Self {
        Self::new(resources)
    }
}

impl FromIterator<Resource> for Collection {
    fn from_iter<I: IntoIterator<Item = Resource>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl IntoIterator for Collection {
    type Item = Resource;
    type IntoIter = std::vec::IntoIter<Resource>;

    fn into_iter(self) -> Self::IntoIter {
        self.resources.into_iter()
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a Resource;
    type IntoIter = std::slice::Iter<'a, Resource>;

    fn into_iter(self) -> Self::IntoIter {
        self.resources.iter()
    }
}
