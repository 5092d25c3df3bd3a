//! URL templates for resource and relationship links.
//!
//! Templates use `{name}` placeholders. Resource templates see `{type}` and
//! `{id}`; relationship templates additionally see `{ownerType}`,
//! `{ownerId}` and `{path}` (the relationship name).

use serde::{Deserialize, Serialize};

/// Link templates for one resource type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlTemplates {
    /// Resource self link
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,

    /// Relationship self link
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship: Option<String>,

    /// Related resource link
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related: Option<String>,
}

impl UrlTemplates {
    /// Conventional templates rooted at `base_url`
    pub fn conventional(base_url: &str, resource_type: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            self_link: Some(format!("{}/{}/{{id}}", base, resource_type)),
            relationship: Some(format!(
                "{}/{}/{{ownerId}}/relationships/{{path}}",
                base, resource_type
            )),
            related: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.self_link.is_none() && self.relationship.is_none() && self.related.is_none()
    }

    /// Self link for a resource
    pub fn resource_link(&self, resource_type: &str, id: &str) -> Option<String> {
        self.self_link
            .as_deref()
            .map(|t| expand(t, &[("type", resource_type), ("id", id)]))
    }

    /// `(self, related)` links for one relationship of a resource
    pub fn relationship_links(
        &self,
        owner_type: &str,
        owner_id: &str,
        path: &str,
    ) -> (Option<String>, Option<String>) {
        let vars = [
            ("ownerType", owner_type),
            ("ownerId", owner_id),
            ("type", owner_type),
            ("id", owner_id),
            ("path", path),
        ];
        (
            self.relationship.as_deref().map(|t| expand(t, &vars)),
            self.related.as_deref().map(|t| expand(t, &vars)),
        )
    }
}

/// Replace every `{name}` placeholder with its value. Unknown
/// placeholders are left in place.
pub fn expand(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                let name = &after[..close];
                match vars.iter().find(|(key, _)| *key == name) {
                    Some((_, value)) => out.push_str(value),
                    None => {
                        out.push('{');
                        out.push_str(name);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}
