//! # Resource Type Registry
//!
//! Per-type capability table: which adapter stores a type, its default
//! includes, link templates, transform hooks and label mappers. A type
//! may name a parent type and inherits every capability it does not set
//! itself.
//!
//! The registry is built once at startup and only read afterwards, so it
//! is shared between requests behind an `Arc` without locking.

mod templates;

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use thiserror::Error;

use crate::adapter::Adapter;
use crate::types::{ApiResult, IdOrIds, Request, Resource, TransportContext};

pub use templates::{expand, UrlTemplates};

/// Which transform hook to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformMode {
    BeforeSave,
    BeforeRender,
}

impl TransformMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransformMode::BeforeSave => "beforeSave",
            TransformMode::BeforeRender => "beforeRender",
        }
    }
}

/// What a transform hook can see besides the resource
#[derive(Debug, Clone, Default)]
pub struct TransformContext {
    pub request: Request,
    pub transport: TransportContext,
}

/// A transform hook. `Ok(None)` removes the resource.
pub type TransformFn = Arc<
    dyn Fn(Resource, Arc<TransformContext>) -> BoxFuture<'static, ApiResult<Option<Resource>>>
        + Send
        + Sync,
>;

/// Resolves a label to ids. `Ok(None)` means the label matches nothing.
pub type LabelMapper = Arc<
    dyn Fn(Arc<dyn Adapter>, TransportContext) -> BoxFuture<'static, ApiResult<Option<IdOrIds>>>
        + Send
        + Sync,
>;

/// Registry construction errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistryError {
    #[error("Type {child} names unregistered parent type {parent}")]
    UnknownParent { child: String, parent: String },

    #[error("Type {0} is its own ancestor")]
    InheritanceCycle(String),

    #[error("Type {0} has no adapter, directly or through a parent")]
    MissingAdapter(String),
}

/// Capabilities of one resource type. Unset members fall back to the
/// parent type's.
#[derive(Clone, Default)]
pub struct TypeDescription {
    adapter: Option<Arc<dyn Adapter>>,
    parent_type: Option<String>,
    default_includes: Option<Vec<String>>,
    url_templates: Option<UrlTemplates>,
    before_save: Option<TransformFn>,
    before_render: Option<TransformFn>,
    labels: HashMap<String, LabelMapper>,
}

impl TypeDescription {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_adapter(mut self, adapter: Arc<dyn Adapter>) -> Self {
        self.adapter = Some(adapter);
        self
    }

    pub fn with_parent_type(mut self, parent: impl Into<String>) -> Self {
        self.parent_type = Some(parent.into());
        self
    }

    pub fn with_default_includes<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_includes = Some(paths.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_url_templates(mut self, templates: UrlTemplates) -> Self {
        self.url_templates = Some(templates);
        self
    }

    pub fn with_before_save<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(Resource, Arc<TransformContext>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ApiResult<Option<Resource>>> + Send + 'static,
    {
        self.before_save = Some(boxed_transform(hook));
        self
    }

    pub fn with_before_render<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(Resource, Arc<TransformContext>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ApiResult<Option<Resource>>> + Send + 'static,
    {
        self.before_render = Some(boxed_transform(hook));
        self
    }

    /// Register a label mapper for one label string
    pub fn with_label<F, Fut>(mut self, label: impl Into<String>, mapper: F) -> Self
    where
        F: Fn(Arc<dyn Adapter>, TransportContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ApiResult<Option<IdOrIds>>> + Send + 'static,
    {
        let mapper: LabelMapper = Arc::new(
            move |adapter: Arc<dyn Adapter>,
                  transport: TransportContext|
                  -> BoxFuture<'static, ApiResult<Option<IdOrIds>>> {
                Box::pin(mapper(adapter, transport))
            },
        );
        self.labels.insert(label.into(), mapper);
        self
    }
}

fn boxed_transform<F, Fut>(hook: F) -> TransformFn
where
    F: Fn(Resource, Arc<TransformContext>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ApiResult<Option<Resource>>> + Send + 'static,
{
    Arc::new(
        move |resource: Resource,
              ctx: Arc<TransformContext>|
              -> BoxFuture<'static, ApiResult<Option<Resource>>> {
            Box::pin(hook(resource, ctx))
        },
    )
}

impl fmt::Debug for TypeDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescription")
            .field("adapter", &self.adapter.is_some())
            .field("parent_type", &self.parent_type)
            .field("default_includes", &self.default_includes)
            .field("url_templates", &self.url_templates)
            .field("before_save", &self.before_save.is_some())
            .field("before_render", &self.before_render.is_some())
            .field("labels", &self.labels.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Collects type descriptions and validates them as a whole
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    types: HashMap<String, TypeDescription>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type(mut self, name: impl Into<String>, description: TypeDescription) -> Self {
        self.types.insert(name.into(), description);
        self
    }

    /// Check parents exist, inheritance is acyclic, and every type can
    /// reach an adapter
    pub fn build(self) -> Result<ResourceTypeRegistry, RegistryError> {
        for (name, description) in &self.types {
            if let Some(parent) = &description.parent_type {
                if !self.types.contains_key(parent) {
                    return Err(RegistryError::UnknownParent {
                        child: name.clone(),
                        parent: parent.clone(),
                    });
                }
            }
        }

        let registry = ResourceTypeRegistry { types: self.types };
        for name in registry.types.keys() {
            let mut seen = vec![name.as_str()];
            let mut current = registry.parent_type(name);
            while let Some(parent) = current {
                if seen.contains(&parent) {
                    return Err(RegistryError::InheritanceCycle(name.clone()));
                }
                seen.push(parent);
                current = registry.parent_type(parent);
            }

            if registry.adapter(name).is_none() {
                return Err(RegistryError::MissingAdapter(name.clone()));
            }
        }

        Ok(registry)
    }
}

/// Read-only lookup of type capabilities
#[derive(Debug, Default)]
pub struct ResourceTypeRegistry {
    types: HashMap<String, TypeDescription>,
}

impl ResourceTypeRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    pub fn has_type(&self, resource_type: &str) -> bool {
        self.types.contains_key(resource_type)
    }

    /// Registered type names, sorted
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn parent_type(&self, resource_type: &str) -> Option<&str> {
        self.types.get(resource_type)?.parent_type.as_deref()
    }

    /// The type followed by its ancestors, nearest first
    pub fn type_path(&self, resource_type: &str) -> Vec<&str> {
        let mut path = Vec::new();
        let mut current = self.types.get_key_value(resource_type).map(|(k, _)| k.as_str());
        while let Some(name) = current {
            if path.contains(&name) {
                break;
            }
            path.push(name);
            current = self.parent_type(name);
        }
        path
    }

    /// Whether `resource_type` is `ancestor` or descends from it
    pub fn is_type_or_subtype(&self, resource_type: &str, ancestor: &str) -> bool {
        resource_type == ancestor || self.type_path(resource_type).contains(&ancestor)
    }

    /// First description along the type path for which `pick` yields
    fn inherited<'a, T>(
        &'a self,
        resource_type: &str,
        pick: impl Fn(&'a TypeDescription) -> Option<T>,
    ) -> Option<T> {
        self.type_path(resource_type)
            .into_iter()
            .filter_map(|name| self.types.get(name))
            .find_map(pick)
    }

    pub fn adapter(&self, resource_type: &str) -> Option<Arc<dyn Adapter>> {
        self.inherited(resource_type, |d| d.adapter.clone())
    }

    /// Include paths used when a request names none
    pub fn default_includes(&self, resource_type: &str) -> Vec<String> {
        self.inherited(resource_type, |d| d.default_includes.clone())
            .unwrap_or_default()
    }

    pub fn url_templates_for(&self, resource_type: &str) -> Option<&UrlTemplates> {
        self.inherited(resource_type, |d| d.url_templates.as_ref())
    }

    /// Templates for every type that has (or inherits) any
    pub fn url_templates(&self) -> BTreeMap<String, UrlTemplates> {
        self.types
            .keys()
            .filter_map(|name| {
                self.url_templates_for(name)
                    .map(|templates| (name.clone(), templates.clone()))
            })
            .collect()
    }

    pub fn transform_for(&self, resource_type: &str, mode: TransformMode) -> Option<TransformFn> {
        self.inherited(resource_type, |d| match mode {
            TransformMode::BeforeSave => d.before_save.clone(),
            TransformMode::BeforeRender => d.before_render.clone(),
        })
    }

    pub fn label_mapper(&self, resource_type: &str, label: &str) -> Option<LabelMapper> {
        self.inherited(resource_type, |d| d.labels.get(label).cloned())
    }
}
