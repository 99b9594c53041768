//! Configuration loader with layered sources
//!
//! Loads configuration from multiple sources with the following precedence
//! (highest to lowest):
//! 1. Explicit overrides (e.g. `--schema` on the command line)
//! 2. Environment variables (ACCESS_SCHEMA__*)
//! 3. Configuration file (TOML)
//! 4. Default values

use crate::access_control::{AccessResolver, Schema};
use crate::config::schema::SchemaDocument;
use crate::config::types::{AppConfig, SchemaConfig};
use crate::error::{ConfigError, Result as AppResult};
use config::{Config, Environment, File, FileFormat};
use std::path::Path;
use tracing::debug;

/// Default configuration file paths to check (in order)
const DEFAULT_CONFIG_PATHS: &[&str] = &[
    "access-schema.toml",
    ".access-schema.toml",
    "~/.config/access-schema/config.toml",
    "/etc/access-schema/config.toml",
];

/// Log levels accepted in `logging.level`
const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Load configuration from a TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::from_str(toml_str, FileFormat::Toml))
        .build()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    let app_config: AppConfig = config
        .try_deserialize()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// Load configuration from files and environment
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig, ConfigError> {
    load_config_with_schema(config_path, None)
}

/// Load configuration, replacing `schema.path` with `schema_path` when given
pub fn load_config_with_schema(
    config_path: Option<&str>,
    schema_path: Option<&str>,
) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. Start with defaults (handled by serde defaults on AppConfig)

    // 2. Add configuration file
    if let Some(path) = config_path {
        // Explicit path provided - must exist
        if !Path::new(path).exists() {
            return Err(ConfigError::Load(format!(
                "Configuration file not found: {}",
                path
            )));
        }
        builder = builder.add_source(File::new(path, FileFormat::Toml));
    } else {
        // Try default paths (first existing one wins)
        for path in DEFAULT_CONFIG_PATHS {
            let expanded = shellexpand::tilde(path);
            if Path::new(expanded.as_ref()).exists() {
                debug!(path = %expanded, "Using configuration file");
                builder = builder.add_source(File::new(&expanded, FileFormat::Toml));
                break;
            }
        }
    }

    // 3. Add environment variables with ACCESS_SCHEMA prefix
    // e.g., ACCESS_SCHEMA__LOGGING__LEVEL, ACCESS_SCHEMA__SCHEMA__PATH
    // Double underscore (__) maps to nested keys (logging.level)
    builder = builder.add_source(
        Environment::with_prefix("ACCESS_SCHEMA")
            .separator("__")
            .try_parsing(true),
    );

    // 4. Explicit schema file wins over everything else
    if let Some(path) = schema_path {
        builder = builder
            .set_override("schema.path", path)
            .map_err(|e| ConfigError::Load(e.to_string()))?;
    }

    let config = builder
        .build()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    let app_config: AppConfig = config
        .try_deserialize()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// Validate configuration values
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    let level = config.logging.level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        return Err(ConfigError::Invalid {
            message: format!(
                "logging.level must be one of {}, got: {}",
                LOG_LEVELS.join(", "),
                config.logging.level
            ),
        });
    }

    validate_schema_source(&config.schema)
}

/// Exactly one schema source must be configured
fn validate_schema_source(schema: &SchemaConfig) -> Result<(), ConfigError> {
    match (&schema.path, schema.groups.is_empty()) {
        (Some(path), _) if path.trim().is_empty() => Err(ConfigError::Invalid {
            message: "schema.path must not be empty".to_string(),
        }),
        (Some(_), false) => Err(ConfigError::Invalid {
            message: "schema.path and inline schema.groups are mutually exclusive".to_string(),
        }),
        (None, true) => Err(ConfigError::Missing {
            field: "schema.path or schema.groups".to_string(),
        }),
        _ => Ok(()),
    }
}

/// Read the schema document named by the configuration
pub fn load_schema_document(config: &SchemaConfig) -> Result<SchemaDocument, ConfigError> {
    match &config.path {
        Some(path) => load_schema_file(path),
        None => Ok(SchemaDocument {
            groups: config.groups.clone(),
        }),
    }
}

/// Read and parse a TOML schema document from disk
pub fn load_schema_file(path: &str) -> Result<SchemaDocument, ConfigError> {
    let expanded = shellexpand::tilde(path);
    let source = std::fs::read_to_string(expanded.as_ref()).map_err(|e| {
        ConfigError::Load(format!("Failed to read schema file {}: {}", path, e))
    })?;

    let document = SchemaDocument::from_toml(&source).map_err(|e| {
        ConfigError::Load(format!("Failed to parse schema file {}: {}", path, e))
    })?;

    debug!(path, groups = document.groups.len(), "Loaded schema document");
    Ok(document)
}

/// Load the configured schema and resolve its group references
pub fn load_schema(config: &SchemaConfig) -> Result<Schema, ConfigError> {
    load_schema_document(config)?.to_schema()
}

/// Load the configured schema and initialize a resolver over it
pub fn load_resolver(config: &SchemaConfig) -> AppResult<AccessResolver> {
    let schema = load_schema(config)?;
    Ok(AccessResolver::initialize(schema)?)
}
