//! Configuration types for access-schema
//!
//! This module defines the configuration structure that can be loaded from
//! TOML files and/or environment variables.

use crate::config::schema::GroupDocument;
use serde::Deserialize;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Where the access control schema comes from
    pub schema: SchemaConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Schema source
///
/// Either `path` points to a schema document, or the groups are declared
/// inline as `[[schema.groups]]`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    /// Path of a TOML schema document (`~` is expanded)
    pub path: Option<String>,

    /// Inline group declarations
    pub groups: Vec<GroupDocument>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Output format (pretty, json)
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable output
    #[default]
    Pretty,
    /// JSON structured output
    Json,
}
