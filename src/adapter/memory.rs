//! In-memory adapter
//!
//! Keeps every resource in a process-local map. Supports the whole
//! adapter contract, so it backs the CLI server and the test suites.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use futures_util::future::BoxFuture;
use tracing::debug;

use crate::types::{
    AddToRelationshipQuery, Collection, CreateQuery, DeleteQuery, Fields, FindQuery, IdOrIds,
    Linkage, PrimaryData, Records, RemoveFromRelationshipQuery, Resource, ResourceIdentifier,
    UpdateQuery,
};

use super::{Adapter, AdapterError, FindResult, ResourceSorter};

/// Resources by type, in insertion order
type ResourceStore = HashMap<String, Vec<Resource>>;

/// Process-local storage backend
#[derive(Debug, Default)]
pub struct MemoryAdapter {
    store: RwLock<ResourceStore>,
    /// Child type to parent type
    parents: HashMap<String, String>,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `child` a subtype of `parent`: finds on the parent also
    /// return the child's resources
    pub fn with_subtype(mut self, child: impl Into<String>, parent: impl Into<String>) -> Self {
        self.parents.insert(child.into(), parent.into());
        self
    }

    /// Seed resources, keeping their ids
    pub fn with_resources(self, resources: impl IntoIterator<Item = Resource>) -> Self {
        if let Ok(mut store) = self.store.write() {
            for resource in resources {
                store
                    .entry(resource.resource_type().to_string())
                    .or_default()
                    .push(resource);
            }
        }
        self
    }

    /// Number of stored resources of exactly this type
    pub fn count(&self, resource_type: &str) -> usize {
        self.store
            .read()
            .map(|store| store.get(resource_type).map_or(0, Vec::len))
            .unwrap_or(0)
    }

    /// `resource_type` and all of its descendants
    fn family(&self, resource_type: &str) -> Vec<String> {
        let mut family = vec![resource_type.to_string()];
        let mut i = 0;
        while i < family.len() {
            let current = family[i].clone();
            family.extend(
                self.parents
                    .iter()
                    .filter(|(_, parent)| **parent == current)
                    .map(|(child, _)| child.clone()),
            );
            i += 1;
        }
        family
    }

    fn read_store(&self) -> Result<std::sync::RwLockReadGuard<'_, ResourceStore>, AdapterError> {
        self.store
            .read()
            .map_err(|e| AdapterError::Other(e.to_string()))
    }

    fn write_store(&self) -> Result<std::sync::RwLockWriteGuard<'_, ResourceStore>, AdapterError> {
        self.store
            .write()
            .map_err(|e| AdapterError::Other(e.to_string()))
    }

    fn find_now(&self, query: &FindQuery) -> Result<FindResult, AdapterError> {
        let store = self.read_store()?;
        let family = self.family(query.resource_type());

        let mut matches: Vec<Resource> = family
            .iter()
            .filter_map(|t| store.get(t))
            .flatten()
            .filter(|r| match query.id_or_ids() {
                Some(ids) => r.id().map_or(false, |id| ids.contains(id)),
                None => true,
            })
            .filter(|r| query.filter().map_or(true, |f| f.matches(r)))
            .cloned()
            .collect();

        if let Some(IdOrIds::Id(id)) = query.id_or_ids() {
            let mut resource = matches
                .pop()
                .ok_or_else(|| AdapterError::not_found(query.resource_type(), id.clone()))?;
            let mut included = Self::collect_included(&store, std::slice::from_ref(&resource), query.include());
            Self::apply_fields(query.fields(), std::slice::from_mut(&mut resource));
            Self::apply_fields(query.fields(), &mut included);
            return Ok(FindResult {
                primary: PrimaryData::Resource(resource),
                included,
                total: None,
            });
        }

        let total = matches.len();
        match (query.sort(), query.id_or_ids()) {
            (Some(sort), _) => ResourceSorter::sort(&mut matches, sort),
            // unsorted id lists come back in the order they were asked for
            (None, Some(IdOrIds::Ids(ids))) => {
                matches.sort_by_key(|r| r.id().and_then(|id| ids.iter().position(|i| i == id)))
            }
            (None, _) => {}
        }

        let page = query.page();
        let mut primary: Vec<Resource> = matches
            .into_iter()
            .skip(page.offset.unwrap_or(0))
            .take(page.limit.unwrap_or(usize::MAX))
            .collect();

        let mut included = Self::collect_included(&store, &primary, query.include());
        Self::apply_fields(query.fields(), &mut primary);
        Self::apply_fields(query.fields(), &mut included);

        Ok(FindResult {
            primary: PrimaryData::Collection(Collection::new(primary)),
            included,
            total: Some(total),
        })
    }

    /// Follow each dotted include path from the primary resources
    fn collect_included(store: &ResourceStore, primary: &[Resource], paths: &[String]) -> Vec<Resource> {
        let mut seen: HashSet<ResourceIdentifier> =
            primary.iter().filter_map(Resource::identifier).collect();
        let mut included = Vec::new();

        for path in paths {
            let mut frontier: Vec<Resource> = primary.to_vec();
            for segment in path.split('.') {
                let targets: Vec<ResourceIdentifier> = frontier
                    .iter()
                    .filter_map(|r| r.relationship(segment))
                    .flat_map(|linkage| linkage.identifiers().into_iter().cloned())
                    .collect();

                frontier = targets
                    .iter()
                    .filter_map(|identifier| Self::lookup(store, identifier))
                    .cloned()
                    .collect();

                for resource in &frontier {
                    if let Some(identifier) = resource.identifier() {
                        if seen.insert(identifier) {
                            included.push(resource.clone());
                        }
                    }
                }
            }
        }
        included
    }

    fn lookup<'s>(store: &'s ResourceStore, identifier: &ResourceIdentifier) -> Option<&'s Resource> {
        store
            .get(&identifier.resource_type)?
            .iter()
            .find(|r| r.id() == Some(identifier.id.as_str()))
    }

    fn apply_fields(fields: Option<&Fields>, resources: &mut [Resource]) {
        let Some(fields) = fields else { return };
        for resource in resources {
            if let Some(allowed) = fields.get(resource.resource_type()) {
                resource.retain_fields(allowed);
            }
        }
    }

    /// Validates the whole batch before storing any of it
    fn create_now(&self, query: &CreateQuery) -> Result<Records, AdapterError> {
        let mut store = self.write_store()?;
        let mut created: Vec<Resource> = Vec::with_capacity(query.records().len());

        for resource in query.records().iter() {
            let mut resource = resource.clone();
            match resource.id() {
                Some(id) => {
                    let taken = store
                        .get(resource.resource_type())
                        .map_or(false, |bucket| bucket.iter().any(|r| r.id() == Some(id)))
                        || created
                            .iter()
                            .any(|r| r.resource_type() == resource.resource_type() && r.id() == Some(id));
                    if taken {
                        return Err(AdapterError::Conflict(format!(
                            "A {} with id {} already exists.",
                            resource.resource_type(),
                            id
                        )));
                    }
                }
                None => resource.set_id(uuid::Uuid::new_v4().to_string()),
            }
            created.push(resource);
        }

        for resource in &created {
            store
                .entry(resource.resource_type().to_string())
                .or_default()
                .push(resource.clone());
        }

        debug!(resource_type = query.resource_type(), count = created.len(), "created resources");
        Ok(match query.records() {
            Records::One(_) => match created.pop() {
                Some(resource) => Records::One(resource),
                None => Records::Many(Collection::default()),
            },
            Records::Many(_) => Records::Many(Collection::new(created)),
        })
    }

    /// Applies every patch to a copy first; the store only changes when
    /// all of them succeed
    fn update_now(&self, query: &UpdateQuery) -> Result<Records, AdapterError> {
        let mut store = self.write_store()?;
        let family = self.family(query.resource_type());
        let mut staged: Vec<Resource> = Vec::new();
        let mut order = Vec::with_capacity(query.patch().len());

        for patch in query.patch().iter() {
            let id = patch.id().unwrap_or_default();
            let slot = match staged.iter().position(|r| r.id() == Some(id)) {
                Some(slot) => slot,
                None => {
                    let existing = family
                        .iter()
                        .filter_map(|t| store.get(t))
                        .flatten()
                        .find(|r| r.id() == Some(id))
                        .ok_or_else(|| AdapterError::not_found(query.resource_type(), id))?;
                    staged.push(existing.clone());
                    staged.len() - 1
                }
            };

            let target = &mut staged[slot];
            for (name, value) in patch.attributes() {
                target
                    .set_attribute(name.clone(), value.clone())
                    .map_err(|e| AdapterError::Invalid(e.to_string()))?;
            }
            for (name, linkage) in patch.relationships() {
                target
                    .set_relationship(name.clone(), linkage.clone())
                    .map_err(|e| AdapterError::Invalid(e.to_string()))?;
            }
            order.push(slot);
        }

        for resource in &staged {
            if let Some(existing) = store
                .iter_mut()
                .filter(|(t, _)| family.contains(t))
                .flat_map(|(_, bucket)| bucket.iter_mut())
                .find(|r| r.id() == resource.id())
            {
                *existing = resource.clone();
            }
        }

        let mut updated: Vec<Resource> = order.into_iter().map(|slot| staged[slot].clone()).collect();
        Ok(match query.patch() {
            Records::One(_) => match updated.pop() {
                Some(resource) => Records::One(resource),
                None => Records::Many(Collection::default()),
            },
            Records::Many(_) => Records::Many(Collection::new(updated)),
        })
    }

    fn delete_now(&self, query: &DeleteQuery) -> Result<(), AdapterError> {
        let mut store = self.write_store()?;
        let family = self.family(query.resource_type());
        let ids: Vec<&str> = match query.id_or_ids() {
            IdOrIds::Id(id) => vec![id.as_str()],
            IdOrIds::Ids(ids) => ids.iter().map(String::as_str).collect(),
        };

        for id in &ids {
            let exists = family
                .iter()
                .filter_map(|t| store.get(t))
                .flatten()
                .any(|r| r.id() == Some(*id));
            if !exists {
                return Err(AdapterError::not_found(query.resource_type(), *id));
            }
        }

        for t in &family {
            if let Some(bucket) = store.get_mut(t) {
                bucket.retain(|r| !r.id().map_or(false, |id| ids.contains(&id)));
            }
        }
        Ok(())
    }

    /// Run `edit` on the named to-many relationship of one resource
    fn edit_relationship<F>(
        &self,
        resource_type: &str,
        id: &str,
        relationship_name: &str,
        edit: F,
    ) -> Result<(), AdapterError>
    where
        F: FnOnce(&mut Vec<ResourceIdentifier>),
    {
        let mut store = self.write_store()?;
        let family = self.family(resource_type);
        let owner = store
            .iter_mut()
            .filter(|(t, _)| family.contains(t))
            .flat_map(|(_, bucket)| bucket.iter_mut())
            .find(|r| r.id() == Some(id))
            .ok_or_else(|| AdapterError::not_found(resource_type, id))?;

        let mut items: Vec<ResourceIdentifier> = match owner.relationship(relationship_name) {
            None => Vec::new(),
            Some(Linkage::Many(items)) => items.clone(),
            Some(_) => {
                return Err(AdapterError::Invalid(format!(
                    "{} is not a to-many relationship.",
                    relationship_name
                )))
            }
        };
        edit(&mut items);

        owner
            .set_relationship(relationship_name, Linkage::Many(items))
            .map_err(|e| AdapterError::Invalid(e.to_string()))
    }
}

impl Adapter for MemoryAdapter {
    fn find<'a>(&'a self, query: &'a FindQuery) -> BoxFuture<'a, Result<FindResult, AdapterError>> {
        Box::pin(async move { self.find_now(query) })
    }

    fn create<'a>(
        &'a self,
        query: &'a CreateQuery,
    ) -> BoxFuture<'a, Result<Records, AdapterError>> {
        Box::pin(async move { self.create_now(query) })
    }

    fn update<'a>(
        &'a self,
        query: &'a UpdateQuery,
    ) -> BoxFuture<'a, Result<Records, AdapterError>> {
        Box::pin(async move { self.update_now(query) })
    }

    fn delete<'a>(&'a self, query: &'a DeleteQuery) -> BoxFuture<'a, Result<(), AdapterError>> {
        Box::pin(async move { self.delete_now(query) })
    }

    fn add_to_relationship<'a>(
        &'a self,
        query: &'a AddToRelationshipQuery,
    ) -> BoxFuture<'a, Result<(), AdapterError>> {
        Box::pin(async move {
            let additions: Vec<ResourceIdentifier> =
                query.linkage().identifiers().into_iter().cloned().collect();
            self.edit_relationship(query.resource_type(), query.id(), query.relationship_name(), |items| {
                for identifier in additions {
                    if !items.contains(&identifier) {
                        items.push(identifier);
                    }
                }
            })
        })
    }

    fn remove_from_relationship<'a>(
        &'a self,
        query: &'a RemoveFromRelationshipQuery,
    ) -> BoxFuture<'a, Result<(), AdapterError>> {
        Box::pin(async move {
            let removals: Vec<ResourceIdentifier> =
                query.linkage().identifiers().into_iter().cloned().collect();
            self.edit_relationship(query.resource_type(), query.id(), query.relationship_name(), |items| {
                items.retain(|identifier| !removals.contains(identifier));
            })
        })
    }
}
