//! CLI command implementations
//!
//! `serve` boots in a fixed order:
//! 1. Configuration load
//! 2. Logging
//! 3. Registry and seeded in-memory store
//! 4. HTTP server

use std::path::Path;
use std::sync::Arc;

use serde_json::{json, Value};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::adapter::{Adapter, MemoryAdapter};
use crate::config::AppConfig;
use crate::controller::ApiController;
use crate::http::{ApiState, HttpServer};
use crate::registry::{ResourceTypeRegistry, TypeDescription};
use crate::steps::parse_request_primary;

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};

/// Parse arguments and run the chosen command
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.command)
}

pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve { config } => serve(&config),
        Command::Check { config } => check(&config),
    }
}

/// Serve the API until the process is stopped
pub fn serve(config_path: &Path) -> CliResult<()> {
    let config = AppConfig::load(config_path)?;
    init_logging(&config.log_filter);

    let registry = build_registry(&config)?;
    info!(types = ?registry.type_names(), "registered resource types");

    let controller =
        ApiController::new(Arc::new(registry)).with_options(config.api.to_options());
    let mut state = ApiState::new(controller);
    if let Some(base_url) = &config.server.base_url {
        state = state.with_base_url(base_url.clone());
    }
    let server = HttpServer::with_config(config.server.clone(), state);

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
    })
}

/// Validate the configuration and print a summary of what `serve` would
/// register
pub fn check(config_path: &Path) -> CliResult<()> {
    let config = AppConfig::load(config_path)?;
    let registry = build_registry(&config)?;
    let summary = summarize(&config, &registry);
    let rendered = serde_json::to_string_pretty(&summary)
        .map_err(|e| CliError::io_error(format!("JSON error: {}", e)))?;
    println!("{}", rendered);
    Ok(())
}

fn summarize(config: &AppConfig, registry: &ResourceTypeRegistry) -> Value {
    let types: Vec<Value> = registry
        .type_names()
        .into_iter()
        .map(|name| {
            json!({
                "type": name,
                "parent_type": registry.parent_type(name),
                "default_includes": registry.default_includes(name),
                "seeded": config.types.get(name).map_or(0, |t| t.seed.len()),
            })
        })
        .collect();

    json!({
        "listen": config.server.socket_addr(),
        "types": types,
    })
}

/// Install the global subscriber. `RUST_LOG` wins over the configured
/// filter.
fn init_logging(filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    // a subscriber may already be installed (tests)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Build the registry described by `config`. All types share one
/// in-memory store; subtypes live in their root type's family.
pub fn build_registry(config: &AppConfig) -> CliResult<ResourceTypeRegistry> {
    let mut memory = MemoryAdapter::new();
    let mut seeds = Vec::new();

    for (name, description) in &config.types {
        if let Some(parent) = &description.parent_type {
            memory = memory.with_subtype(name.clone(), parent.clone());
        }

        let data = parse_request_primary(&Value::Array(description.seed.clone()), false)
            .map_err(|e| CliError::config_error(format!("Invalid seed data for '{}': {}", name, e)))?;
        for resource in data.resources() {
            if resource.id().is_none() {
                return Err(CliError::config_error(format!(
                    "Seed resources for '{}' must have ids",
                    name
                )));
            }
            seeds.push(resource.clone());
        }
    }

    let adapter: Arc<dyn Adapter> = Arc::new(memory.with_resources(seeds));

    let mut builder = ResourceTypeRegistry::builder();
    for (name, description) in &config.types {
        let mut type_description = match &description.parent_type {
            Some(parent) => TypeDescription::new().with_parent_type(parent.clone()),
            None => TypeDescription::new().with_adapter(adapter.clone()),
        };
        if !description.default_includes.is_empty() {
            type_description =
                type_description.with_default_includes(description.default_includes.clone());
        }
        if let Some(templates) = config.url_templates_for(name) {
            type_description = type_description.with_url_templates(templates);
        }
        builder = builder.with_type(name.clone(), type_description);
    }

    builder
        .build()
        .map_err(|e| CliError::config_error(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::super::errors::CliErrorCode;
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_config(temp_dir: &TempDir, config: Value) -> std::path::PathBuf {
        let config_path = temp_dir.path().join("aeroapi.json");
        fs::write(&config_path, config.to_string()).unwrap();
        config_path
    }

    fn sample() -> Value {
        json!({
            "server": {"base_url": "http://localhost:3000"},
            "types": {
                "organizations": {
                    "seed": [{"type": "organizations", "id": "o1", "attributes": {"name": "ELV"}}]
                },
                "schools": {
                    "parent_type": "organizations",
                    "seed": [{"type": "schools", "id": "s1", "attributes": {"name": "Anytown High"}}]
                },
                "people": {"default_includes": ["friends"]}
            }
        })
    }

    #[test]
    fn test_registry_from_config() {
        let temp_dir = TempDir::new().unwrap();
        let config = AppConfig::load(&create_config(&temp_dir, sample())).unwrap();

        let registry = build_registry(&config).unwrap();
        assert_eq!(registry.type_names(), vec!["organizations", "people", "schools"]);
        assert!(registry.is_type_or_subtype("schools", "organizations"));
        assert!(registry.adapter("schools").is_some());
        assert_eq!(registry.default_includes("people"), vec!["friends"]);
        assert!(registry.url_templates_for("people").is_some());
    }

    #[tokio::test]
    async fn test_seeds_are_queryable_through_parent() {
        use crate::types::{FindQuery, FindQueryOptions};

        let temp_dir = TempDir::new().unwrap();
        let config = AppConfig::load(&create_config(&temp_dir, sample())).unwrap();
        let registry = build_registry(&config).unwrap();

        let adapter = registry.adapter("organizations").unwrap();
        let query = FindQuery::new(FindQueryOptions {
            resource_type: "organizations".to_string(),
            ..Default::default()
        })
        .unwrap();
        let found = adapter.find(&query).await.unwrap();
        assert_eq!(found.total, Some(2));
    }

    #[test]
    fn test_seed_without_id_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = create_config(
            &temp_dir,
            json!({"types": {"people": {"seed": [{"type": "people", "attributes": {}}]}}}),
        );
        let config = AppConfig::load(&path).unwrap();
        let err = build_registry(&config).unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::ConfigError);
    }

    #[test]
    fn test_check_reports_missing_config() {
        let temp_dir = TempDir::new().unwrap();
        let err = check(&temp_dir.path().join("nope.json")).unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::ConfigError);
    }

    #[test]
    fn test_summary() {
        let temp_dir = TempDir::new().unwrap();
        let config = AppConfig::load(&create_config(&temp_dir, sample())).unwrap();
        let registry = build_registry(&config).unwrap();

        let summary = summarize(&config, &registry);
        assert_eq!(summary["listen"], "127.0.0.1:3000");
        assert_eq!(summary["types"][2]["parent_type"], "organizations");
        assert_eq!(summary["types"][2]["seeded"], 1);
    }
}
