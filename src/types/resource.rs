//! # Resource
//!
//! One addressable entity: type, optional id, attributes, relationships
//! and meta. Attribute and relationship names may never collide with the
//! reserved members.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use super::api_error::{ApiError, ApiErrors, ApiResult};
use super::linkage::{Linkage, ResourceIdentifier};

/// Member names a resource object reserves for itself
pub const RESERVED_NAMES: [&str; 3] = ["id", "type", "meta"];

pub fn is_reserved(name: &str) -> bool {
    RESERVED_NAMES.contains(&name)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    resource_type: String,
    id: Option<String>,
    attributes: Map<String, Value>,
    relationships: BTreeMap<String, Linkage>,
    meta: Map<String, Value>,
}

impl Resource {
    /// Create a resource, validating member names
    pub fn new(
        resource_type: impl Into<String>,
        id: Option<String>,
        attributes: Map<String, Value>,
        relationships: BTreeMap<String, Linkage>,
    ) -> ApiResult<Self> {
        let resource_type = resource_type.into();
        if resource_type.is_empty() {
            return Err(ApiError::bad_request("Invalid resource")
                .with_detail("Every resource must have a type.")
                .into());
        }

        let errors: ApiErrors = attributes
            .keys()
            .chain(relationships.keys())
            .filter(|name| is_reserved(name))
            .map(|name| reserved_name_error(&resource_type, name))
            .collect();
        errors.into_result()?;

        Ok(Self {
            resource_type,
            id,
            attributes,
            relationships,
            meta: Map::new(),
        })
    }

    /// A resource with no attributes or relationships
    pub fn identified(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: Some(id.into()),
            attributes: Map::new(),
            relationships: BTreeMap::new(),
            meta: Map::new(),
        }
    }

    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    /// Identifier of a resource that has an id
    pub fn identifier(&self) -> Option<ResourceIdentifier> {
        self.id
            .as_ref()
            .map(|id| ResourceIdentifier::new(self.resource_type.clone(), id.clone()))
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: Value) -> ApiResult<()> {
        let name = name.into();
        if is_reserved(&name) {
            return Err(reserved_name_error(&self.resource_type, &name).into());
        }
        self.attributes.insert(name, value);
        Ok(())
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<Value> {
        self.attributes.remove(name)
    }

    pub fn relationships(&self) -> &BTreeMap<String, Linkage> {
        &self.relationships
    }

    pub fn relationship(&self, name: &str) -> Option<&Linkage> {
        self.relationships.get(name)
    }

    pub fn relationship_mut(&mut self, name: &str) -> Option<&mut Linkage> {
        self.relationships.get_mut(name)
    }

    pub fn set_relationship(&mut self, name: impl Into<String>, linkage: Linkage) -> ApiResult<()> {
        let name = name.into();
        if is_reserved(&name) {
            return Err(reserved_name_error(&self.resource_type, &name).into());
        }
        self.relationships.insert(name, linkage);
        Ok(())
    }

    pub fn remove_relationship(&mut self, name: &str) -> Option<Linkage> {
        self.relationships.remove(name)
    }

    pub fn meta(&self) -> &Map<String, Value> {
        &self.meta
    }

    pub fn meta_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.meta
    }

    /// Keep only the listed attributes and relationships
    pub fn retain_fields(&mut self, fields: &[String]) {
        self.attributes.retain(|name, _| fields.contains(name));
        self.relationships.retain(|name, _| fields.contains(name));
    }
}

fn reserved_name_error(resource_type: &str, name: &str) -> ApiError {
    ApiError::bad_request("Invalid resource").with_detail(format!(
        "`{}` is not allowed as an attribute or relationship name (resource type: {}).",
        name, resource_type
    ))
}
