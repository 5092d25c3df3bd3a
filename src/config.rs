//! # Configuration
//!
//! A JSON file describing the server, the pipeline options and the
//! resource types to register. Every field has a default, so `{}` is a
//! valid (if empty) configuration.
//!
//! ```json
//! {
//!   "server": { "port": 3000, "base_url": "http://127.0.0.1:3000" },
//!   "api": { "sort_prefix": "required", "max_page_size": 100 },
//!   "types": {
//!     "organizations": { "default_includes": ["liaisons"] },
//!     "schools": { "parent_type": "organizations" }
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::controller::ApiOptions;
use crate::registry::UrlTemplates;
use crate::steps::{ParamOptions, SortPrefix};

/// Configuration load failures
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Read(#[from] std::io::Error),

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// CORS allowed origins; empty allows any
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Public base URL. Used for absolute request URIs and conventional
    /// link templates.
    #[serde(default)]
    pub base_url: Option<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
            base_url: None,
        }
    }
}

impl ServerConfig {
    pub fn with_port(port: u16) -> Self {
        Self {
            port,
            ..Default::default()
        }
    }

    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Pipeline settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Extensions request bodies may use
    #[serde(default = "default_supported_ext")]
    pub supported_ext: Vec<String>,

    #[serde(default)]
    pub sort_prefix: SortPrefix,

    #[serde(default)]
    pub max_page_size: Option<usize>,
}

fn default_supported_ext() -> Vec<String> {
    vec!["bulk".to_string()]
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            supported_ext: default_supported_ext(),
            sort_prefix: SortPrefix::default(),
            max_page_size: None,
        }
    }
}

impl ApiConfig {
    pub fn to_options(&self) -> ApiOptions {
        ApiOptions {
            supported_ext: self.supported_ext.clone(),
            params: ParamOptions {
                sort_prefix: self.sort_prefix,
                max_page_size: self.max_page_size,
            },
        }
    }
}

/// One registered resource type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeConfig {
    #[serde(default)]
    pub parent_type: Option<String>,

    #[serde(default)]
    pub default_includes: Vec<String>,

    /// Explicit link templates; conventional ones are derived from
    /// `server.base_url` when absent
    #[serde(default)]
    pub url_templates: Option<UrlTemplates>,

    /// Resource objects loaded into the in-memory store at startup
    #[serde(default)]
    pub seed: Vec<Value>,
}

/// The whole configuration file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub api: ApiConfig,

    /// `tracing` filter directive, overridden by `RUST_LOG`
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    #[serde(default)]
    pub types: BTreeMap<String, TypeConfig>,
}

fn default_log_filter() -> String {
    "aeroapi=info,tower_http=info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            api: ApiConfig::default(),
            log_filter: default_log_filter(),
            types: BTreeMap::new(),
        }
    }
}

impl AppConfig {
    /// Load and validate a configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.api.max_page_size == Some(0) {
            return Err(ConfigError::Invalid("api.max_page_size must be > 0".to_string()));
        }

        for (name, description) in &self.types {
            if name.is_empty() {
                return Err(ConfigError::Invalid("type names must not be empty".to_string()));
            }
            if let Some(parent) = &description.parent_type {
                if !self.types.contains_key(parent) {
                    return Err(ConfigError::Invalid(format!(
                        "type '{}' names unknown parent_type '{}'",
                        name, parent
                    )));
                }
            }
            if description.seed.iter().any(|seed| !seed.is_object()) {
                return Err(ConfigError::Invalid(format!(
                    "seed data for '{}' must be resource objects",
                    name
                )));
            }
        }

        Ok(())
    }

    /// Link templates for a type: explicit ones, else conventional ones
    /// under `server.base_url`
    pub fn url_templates_for(&self, resource_type: &str) -> Option<UrlTemplates> {
        let explicit = self
            .types
            .get(resource_type)
            .and_then(|t| t.url_templates.clone());

        explicit.or_else(|| {
            self.server
                .base_url
                .as_deref()
                .map(|base| UrlTemplates::conventional(base, resource_type))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn write(dir: &TempDir, config: Value) -> std::path::PathBuf {
        let path = dir.path().join("aeroapi.json");
        fs::write(&path, config.to_string()).unwrap();
        path
    }

    #[test]
    fn test_defaults() {
        let dir = TempDir::new().unwrap();
        let config = AppConfig::load(&write(&dir, json!({}))).unwrap();

        assert_eq!(config.server.socket_addr(), "127.0.0.1:3000");
        assert_eq!(config.api.supported_ext, vec!["bulk"]);
        assert_eq!(config.api.sort_prefix, SortPrefix::Optional);
        assert!(config.types.is_empty());
    }

    #[test]
    fn test_types_and_options() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            json!({
                "api": {"sort_prefix": "required", "max_page_size": 50},
                "server": {"base_url": "http://localhost:3000/"},
                "types": {
                    "organizations": {"default_includes": ["liaisons"]},
                    "schools": {"parent_type": "organizations"}
                }
            }),
        );
        let config = AppConfig::load(&path).unwrap();

        let options = config.api.to_options();
        assert_eq!(options.params.sort_prefix, SortPrefix::Required);
        assert_eq!(options.params.max_page_size, Some(50));
        assert_eq!(config.types["schools"].parent_type.as_deref(), Some("organizations"));
        assert_eq!(
            config.url_templates_for("schools").and_then(|t| t.self_link),
            Some("http://localhost:3000/schools/{id}".to_string())
        );
    }

    #[test]
    fn test_unknown_parent_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, json!({"types": {"schools": {"parent_type": "organizations"}}}));
        assert!(matches!(AppConfig::load(&path), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_unreadable_and_malformed() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            AppConfig::load(&dir.path().join("missing.json")),
            Err(ConfigError::Read(_))
        ));

        let path = dir.path().join("bad.json");
        fs::write(&path, "{nope").unwrap();
        assert!(matches!(AppConfig::load(&path), Err(ConfigError::Parse(_))));
    }
}
