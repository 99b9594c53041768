//! Schema documents
//!
//! Serializable form of an access control schema. Groups reference the
//! groups they inherit by id; converting a document into a [`Schema`]
//! resolves those references into arena handles.
//!
//! ```toml
//! [[groups]]
//! id = "ReadOnly"
//! type = "group"
//! permissions = ["Customer_ReadCustomer"]
//!
//! [[groups]]
//! id = "Admin"
//! type = "role"
//! inherits = ["ReadOnly"]
//! permissions = ["Customer_DeleteCustomer"]
//! ```

use crate::access_control::{Group, GroupRef, Schema};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A whole schema; every declared group is top-level
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaDocument {
    pub groups: Vec<GroupDocument>,
}

/// One declared group
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupDocument {
    pub id: String,

    /// Informational type tag, e.g. "role" or "group"
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub group_type: Option<String>,

    /// Ids of inherited groups
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inherits: Vec<String>,

    /// Ids of owned permissions
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub permissions: Vec<String>,
}

impl SchemaDocument {
    /// Parse a TOML schema document
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        toml::from_str(source).map_err(|e| ConfigError::Load(e.to_string()))
    }

    /// Render the document as TOML, keeping declaration order
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Build a [`Schema`] with every declared group listed as top-level.
    ///
    /// An inherit reference resolves to the first group declared with that
    /// id. Groups declared twice stay distinct, so initializing the result
    /// reports them as duplicates.
    pub fn to_schema(&self) -> Result<Schema, ConfigError> {
        let mut schema = Schema::new();
        let mut by_id: HashMap<&str, GroupRef> = HashMap::new();
        let mut handles = Vec::with_capacity(self.groups.len());

        for declared in &self.groups {
            let mut group =
                Group::new(&declared.id).with_permissions(declared.permissions.iter().cloned());
            if let Some(group_type) = &declared.group_type {
                group = group.with_type(group_type.clone());
            }
            let handle = schema.add_group(group);
            by_id.entry(declared.id.as_str()).or_insert(handle);
            handles.push(handle);
        }

        for (declared, &handle) in self.groups.iter().zip(&handles) {
            for reference in &declared.inherits {
                let parent = by_id.get(reference.as_str()).copied().ok_or_else(|| {
                    ConfigError::UndefinedGroup {
                        group: declared.id.clone(),
                        reference: reference.clone(),
                    }
                })?;
                schema.add_inherit(handle, parent);
            }
        }

        Ok(schema)
    }

    /// Describe an in-memory schema as a document.
    ///
    /// Every stored group is emitted in arena order, including groups that
    /// were only reachable through inheritance.
    pub fn from_schema(schema: &Schema) -> Self {
        let groups = schema
            .groups()
            .map(|(_, group)| GroupDocument {
                id: group.id().to_string(),
                group_type: group.group_type().map(str::to_string),
                inherits: group
                    .inherits()
                    .iter()
                    .filter_map(|handle| schema.group(*handle))
                    .map(|parent| parent.id().to_string())
                    .collect(),
                permissions: group
                    .permissions()
                    .iter()
                    .map(|permission| permission.id().to_string())
                    .collect(),
            })
            .collect();

        Self { groups }
    }
}
