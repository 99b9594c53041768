//! Identifier index
//!
//! Flattens every group and permission reachable from the top-level groups
//! into a single identifier map. Built once, read-only afterwards.

use crate::access_control::schema::{GroupRef, Schema};
use crate::access_control::types::{AccessControl, AccessControlKind};
use crate::error::{SchemaError, SchemaResult};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use tracing::{debug, info, warn};

/// Location of an indexed node inside its [`Schema`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeRef {
    Group(GroupRef),
    Permission { group: GroupRef, slot: usize },
}

impl NodeRef {
    pub const fn kind(&self) -> AccessControlKind {
        match self {
            NodeRef::Group(_) => AccessControlKind::Group,
            NodeRef::Permission { .. } => AccessControlKind::Permission,
        }
    }

    /// Borrow the node this handle points at
    pub fn resolve<'a>(&self, schema: &'a Schema) -> Option<AccessControl<'a>> {
        match *self {
            NodeRef::Group(group) => schema.group(group).map(AccessControl::Group),
            NodeRef::Permission { group, slot } => schema
                .group(group)
                .and_then(|g| g.permissions().get(slot))
                .map(AccessControl::Permission),
        }
    }
}

/// Identifier to node map
#[derive(Debug, Clone, Default)]
pub struct AccessIndex {
    nodes: HashMap<String, NodeRef>,
}

impl AccessIndex {
    /// Build the index from the top-level groups of `schema`.
    ///
    /// A group id bound to any other node is fatal, and so is a permission
    /// id that names a group. A repeated permission id is logged and the
    /// first registration is kept.
    pub fn build(schema: &Schema) -> SchemaResult<Self> {
        let mut index = Self::default();
        for &root in schema.top_level() {
            index.register_group(schema, "<top-level>", root)?;
        }

        info!(
            groups = index.count(AccessControlKind::Group),
            permissions = index.count(AccessControlKind::Permission),
            "Access control index built"
        );
        Ok(index)
    }

    fn register_group(
        &mut self,
        schema: &Schema,
        referrer: &str,
        handle: GroupRef,
    ) -> SchemaResult<()> {
        let group = schema
            .group(handle)
            .ok_or_else(|| SchemaError::UnknownGroupRef {
                group: referrer.to_string(),
                index: handle.index(),
            })?;

        match self.nodes.entry(group.id().to_string()) {
            Entry::Occupied(entry) => {
                if *entry.get() != NodeRef::Group(handle) {
                    return Err(SchemaError::duplicate_group(group.id()));
                }
                debug!(group = group.id(), "Already visited access control group");
                return Ok(());
            }
            Entry::Vacant(entry) => {
                entry.insert(NodeRef::Group(handle));
                debug!(group = group.id(), "Registered access control group");
            }
        }

        for (slot, permission) in group.permissions().iter().enumerate() {
            match self.nodes.entry(permission.id().to_string()) {
                Entry::Occupied(entry) => {
                    if let NodeRef::Group(_) = entry.get() {
                        return Err(SchemaError::duplicate_group(permission.id()));
                    }
                    warn!(
                        permission = permission.id(),
                        group = group.id(),
                        "Security configuration contains duplicate permission id"
                    );
                }
                Entry::Vacant(entry) => {
                    entry.insert(NodeRef::Permission {
                        group: handle,
                        slot,
                    });
                    debug!(
                        permission = permission.id(),
                        "Registered access control permission"
                    );
                }
            }
        }

        for &inherited in group.inherits() {
            self.register_group(schema, group.id(), inherited)?;
        }
        Ok(())
    }

    /// Look up the node bound to `id`
    pub fn get(&self, id: &str) -> Option<NodeRef> {
        self.nodes.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of identifiers bound to nodes of the given kind
    pub fn count(&self, kind: AccessControlKind) -> usize {
        self.nodes.values().filter(|node| node.kind() == kind).count()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access_control::schema::Group;

    #[test]
    fn test_registers_reachable_nodes() {
        let mut schema = Schema::new();
        let base = schema.insert_group(Group::new("Base").with_permission("base_read"));
        let top = schema.add_group(Group::new("Top").with_permission("top_write"));
        schema.add_inherit(top, base);

        let index = AccessIndex::build(&schema).unwrap();
        assert_eq!(index.len(), 4);
        assert_eq!(index.get("Base"), Some(NodeRef::Group(base)));
        assert_eq!(
            index.get("top_write"),
            Some(NodeRef::Permission {
                group: top,
                slot: 0
            })
        );
        assert!(index.get("missing").is_none());
    }

    #[test]
    fn test_unreachable_group_is_not_indexed() {
        let mut schema = Schema::new();
        schema.add_group(Group::new("Top"));
        schema.insert_group(Group::new("Orphan").with_permission("orphan_perm"));

        let index = AccessIndex::build(&schema).unwrap();
        assert!(index.contains("Top"));
        assert!(!index.contains("Orphan"));
        assert!(!index.contains("orphan_perm"));
    }

    #[test]
    fn test_shared_group_registered_once() {
        let mut schema = Schema::new();
        let shared = schema.add_group(Group::new("Shared").with_permission("p"));
        let first = schema.add_group(Group::new("First"));
        schema.add_inherit(first, shared);

        let index = AccessIndex::build(&schema).unwrap();
        assert_eq!(index.count(AccessControlKind::Group), 2);
        assert_eq!(index.count(AccessControlKind::Permission), 1);
    }

    #[test]
    fn test_duplicate_group_id() {
        let mut schema = Schema::new();
        schema.add_group(Group::new("Admin"));
        schema.add_group(Group::new("Admin"));

        assert_eq!(
            AccessIndex::build(&schema).unwrap_err(),
            SchemaError::duplicate_group("Admin")
        );
    }

    #[test]
    fn test_group_id_clashing_with_permission() {
        let mut schema = Schema::new();
        schema.add_group(Group::new("First").with_permission("Second"));
        schema.add_group(Group::new("Second"));

        assert_eq!(
            AccessIndex::build(&schema).unwrap_err(),
            SchemaError::duplicate_group("Second")
        );
    }

    #[test]
    fn test_permission_clashing_with_earlier_group() {
        let mut schema = Schema::new();
        let base = schema.add_group(Group::new("Base").with_permission("read"));
        let top = schema.add_group(Group::new("Top").with_permission("Base"));
        schema.add_inherit(top, base);

        assert_eq!(
            AccessIndex::build(&schema).unwrap_err(),
            SchemaError::duplicate_group("Base")
        );
    }

    #[test]
    fn test_group_permission_clash_ignores_declaration_order() {
        let mut first = Schema::new();
        first.add_group(Group::new("X"));
        first.add_group(Group::new("A").with_permission("X"));

        let mut second = Schema::new();
        second.add_group(Group::new("A").with_permission("X"));
        second.add_group(Group::new("X"));

        for schema in [first, second] {
            assert_eq!(
                AccessIndex::build(&schema).unwrap_err(),
                SchemaError::duplicate_group("X")
            );
        }
    }

    #[test]
    fn test_foreign_handle_names_referrer() {
        let mut other = Schema::new();
        other.add_group(Group::new("One"));
        other.add_group(Group::new("Two"));
        let foreign = other.add_group(Group::new("Three"));

        let mut schema = Schema::new();
        let admin = schema.add_group(Group::new("Admin"));
        schema.add_inherit(admin, foreign);

        assert_eq!(
            AccessIndex::build(&schema).unwrap_err(),
            SchemaError::UnknownGroupRef {
                group: "Admin".to_string(),
                index: 2
            }
        );
    }

    #[test]
    fn test_duplicate_permission_keeps_first() {
        let mut schema = Schema::new();
        let first = schema.add_group(Group::new("First").with_permission("shared_perm"));
        schema.add_group(Group::new("Second").with_permission("shared_perm"));

        let index = AccessIndex::build(&schema).unwrap();
        assert_eq!(
            index.get("shared_perm"),
            Some(NodeRef::Permission {
                group: first,
                slot: 0
            })
        );
    }

    #[test]
    fn test_node_ref_resolve() {
        let mut schema = Schema::new();
        let top = schema.add_group(Group::new("Top").with_permissions(["a", "b"]));

        let node = NodeRef::Permission { group: top, slot: 1 };
        assert_eq!(node.resolve(&schema).map(|n| n.id()), Some("b"));

        let dangling = NodeRef::Permission { group: top, slot: 5 };
        assert!(dangling.resolve(&schema).is_none());
    }
}
