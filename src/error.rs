//! Error types for access-schema
//!
//! This module defines the error hierarchy used throughout the crate.
//! Schema initialization failures are fatal and surface as [`SchemaError`];
//! configuration and schema document problems surface as [`ConfigError`].
//! Resolution queries never fail.

use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(String),

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Missing required configuration: {field}")]
    Missing { field: String },

    #[error("Group '{group}' inherits undefined group '{reference}'")]
    UndefinedGroup { group: String, reference: String },

    #[error("Failed to serialize schema: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Fatal errors raised while initializing an access control schema
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Access control schema is empty - please configure at least one group")]
    EmptySchema,

    #[error("Cyclic inheritance of access control groups detected for '{group}'")]
    CyclicInheritance { group: String },

    #[error("Invalid security configuration: duplicate groups with id '{id}'")]
    DuplicateGroupId { id: String },

    #[error("Group '{group}' references unknown group slot {index}")]
    UnknownGroupRef { group: String, index: usize },
}

impl SchemaError {
    pub fn cyclic(group: impl Into<String>) -> Self {
        SchemaError::CyclicInheritance {
            group: group.into(),
        }
    }

    pub fn duplicate_group(id: impl Into<String>) -> Self {
        SchemaError::DuplicateGroupId { id: id.into() }
    }
}

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, AppError>;

/// Result type alias for schema initialization
pub type SchemaResult<T> = std::result::Result<T, SchemaError>;
