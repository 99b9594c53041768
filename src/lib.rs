//! Access control schema resolver
//!
//! Resolves permission groups with inheritance into flat permission sets.
//!
//! ## Features
//!
//! - **Fail-fast initialization** - empty schemas, inheritance cycles and
//!   duplicate group ids are rejected before any query runs
//! - **Union inheritance** - a group grants its own permissions plus
//!   everything it inherits, transitively
//! - **Read-only queries** - an initialized resolver is immutable and can be
//!   shared across threads
//! - **Flexible configuration** via TOML files and environment variables
//!
//! ## Resolution Model
//!
//! ```text
//! schema → validate → index → resolve(id) → { group ids, permission ids }
//! ```
//!
//! ## Example Configuration
//!
//! ```toml
//! [logging]
//! level = "info"
//!
//! [schema]
//! path = "access-control-schema.toml"
//! ```

pub mod access_control;
pub mod config;
pub mod error;

// Re-export main types
pub use access_control::{AccessControl, AccessControlProvider, AccessResolver, Group, Schema};
pub use config::{AppConfig, load_config};
pub use error::{AppError, ConfigError, Result, SchemaError};
