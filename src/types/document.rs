//! # Document
//!
//! The top-level response envelope and its wire serialization.

use std::collections::{BTreeMap, HashSet};

use serde_json::{json, Map, Value};

use crate::registry::UrlTemplates;

use super::api_error::ApiError;
use super::collection::Collection;
use super::linkage::{Linkage, ResourceIdentifier};
use super::resource::Resource;

/// Primary data of a document
#[derive(Debug, Clone, PartialEq)]
pub enum PrimaryData {
    Resource(Resource),
    Collection(Collection),
    Linkage(Linkage),
    Null,
}

impl PrimaryData {
    /// Whether `included` may accompany this data
    pub fn allows_included(&self) -> bool {
        matches!(self, PrimaryData::Resource(_) | PrimaryData::Collection(_))
    }

    /// Resources carried as primary data
    pub fn resources(&self) -> Vec<&Resource> {
        match self {
            PrimaryData::Resource(resource) => vec![resource],
            PrimaryData::Collection(collection) => collection.iter().collect(),
            _ => Vec::new(),
        }
    }
}

impl From<Resource> for PrimaryData {
    fn from(resource: Resource) -> Self {
        PrimaryData::Resource(resource)
    }
}

impl From<Collection> for PrimaryData {
    fn from(collection: Collection) -> Self {
        PrimaryData::Collection(collection)
    }
}

impl From<Linkage> for PrimaryData {
    fn from(linkage: Linkage) -> Self {
        PrimaryData::Linkage(linkage)
    }
}

/// A JSON:API document
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub primary: Option<PrimaryData>,
    pub included: Vec<Resource>,
    pub meta: Map<String, Value>,
    pub errors: Vec<ApiError>,
    pub url_templates: BTreeMap<String, UrlTemplates>,
    pub request_uri: Option<String>,
}

impl Document {
    pub fn new(primary: PrimaryData) -> Self {
        Self {
            primary: Some(primary),
            ..Default::default()
        }
    }

    /// An error document; any data is ignored when errors are present
    pub fn from_errors(errors: Vec<ApiError>) -> Self {
        Self {
            errors,
            ..Default::default()
        }
    }

    pub fn with_included(mut self, included: Vec<Resource>) -> Self {
        self.included = included;
        self
    }

    pub fn with_meta(mut self, meta: Map<String, Value>) -> Self {
        self.meta = meta;
        self
    }

    pub fn with_url_templates(mut self, templates: BTreeMap<String, UrlTemplates>) -> Self {
        self.url_templates = templates;
        self
    }

    pub fn with_request_uri(mut self, uri: impl Into<String>) -> Self {
        self.request_uri = Some(uri.into());
        self
    }

    /// Serialize to the wire shape
    pub fn to_json(&self) -> Value {
        let mut doc = Map::new();

        if !self.errors.is_empty() {
            let errors = self
                .errors
                .iter()
                .map(|e| serde_json::to_value(e).unwrap_or(Value::Null))
                .collect();
            doc.insert("errors".to_string(), Value::Array(errors));
            return Value::Object(doc);
        }

        if let Some(uri) = &self.request_uri {
            doc.insert("links".to_string(), json!({ "self": uri }));
        }

        let data = match &self.primary {
            Some(PrimaryData::Resource(resource)) => self.resource_json(resource),
            Some(PrimaryData::Collection(collection)) => {
                Value::Array(collection.iter().map(|r| self.resource_json(r)).collect())
            }
            Some(PrimaryData::Linkage(linkage)) => linkage.to_json(),
            Some(PrimaryData::Null) | None => Value::Null,
        };
        doc.insert("data".to_string(), data);

        let included = self.deduplicated_included();
        if !included.is_empty() {
            let included = included.into_iter().map(|r| self.resource_json(r)).collect();
            doc.insert("included".to_string(), Value::Array(included));
        }

        if !self.meta.is_empty() {
            doc.insert("meta".to_string(), Value::Object(self.meta.clone()));
        }

        Value::Object(doc)
    }

    /// Included resources minus repeats and minus primary resources. Empty
    /// when the primary data cannot carry included resources.
    fn deduplicated_included(&self) -> Vec<&Resource> {
        let primary = match &self.primary {
            Some(primary) if primary.allows_included() => primary,
            _ => return Vec::new(),
        };

        let mut seen: HashSet<ResourceIdentifier> = primary
            .resources()
            .into_iter()
            .filter_map(Resource::identifier)
            .collect();

        self.included
            .iter()
            .filter(|r| match r.identifier() {
                Some(identifier) => seen.insert(identifier),
                None => true,
            })
            .collect()
    }

    fn resource_json(&self, resource: &Resource) -> Value {
        let templates = self.url_templates.get(resource.resource_type());
        let mut obj = Map::new();

        obj.insert("type".to_string(), json!(resource.resource_type()));
        if let Some(id) = resource.id() {
            obj.insert("id".to_string(), json!(id));
        }
        obj.insert(
            "attributes".to_string(),
            Value::Object(resource.attributes().clone()),
        );

        if !resource.relationships().is_empty() {
            let relationships = resource
                .relationships()
                .iter()
                .map(|(name, linkage)| {
                    let mut relationship = Map::new();
                    if let (Some(templates), Some(id)) = (templates, resource.id()) {
                        let (self_link, related) =
                            templates.relationship_links(resource.resource_type(), id, name);
                        let mut links = Map::new();
                        if let Some(link) = self_link {
                            links.insert("self".to_string(), json!(link));
                        }
                        if let Some(link) = related {
                            links.insert("related".to_string(), json!(link));
                        }
                        if !links.is_empty() {
                            relationship.insert("links".to_string(), Value::Object(links));
                        }
                    }
                    relationship.insert("data".to_string(), linkage.to_json());
                    (name.clone(), Value::Object(relationship))
                })
                .collect();
            obj.insert("relationships".to_string(), Value::Object(relationships));
        }

        let self_link = templates
            .zip(resource.id())
            .and_then(|(t, id)| t.resource_link(resource.resource_type(), id));
        if let Some(link) = self_link {
            obj.insert("links".to_string(), json!({ "self": link }));
        }

        if !resource.meta().is_empty() {
            obj.insert("meta".to_string(), Value::Object(resource.meta().clone()));
        }

        Value::Object(obj)
    }
}
