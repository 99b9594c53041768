//! Configuration module
//!
//! Handles loading and validating configuration from TOML files and environment
//! variables, and turning schema documents into in-memory schemas.

pub mod loader;
pub mod schema;
pub mod types;

pub use loader::{
    load_config, load_config_from_str, load_config_with_schema, load_resolver, load_schema,
    load_schema_document, load_schema_file,
};
pub use schema::{GroupDocument, SchemaDocument};
pub use types::*;
