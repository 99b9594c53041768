//! Access control resolver
//!
//! Answers, for a group or permission identifier, the full set of
//! identifiers it grants. Inheritance is a union: a group grants its own
//! permissions plus everything granted by the groups it inherits.

use crate::access_control::index::AccessIndex;
use crate::access_control::schema::{Group, Schema};
use crate::access_control::types::{AccessControl, AccessControlKind, AccessControlProvider};
use crate::access_control::validator;
use crate::error::SchemaResult;
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, trace};

/// Initialized access control schema
///
/// A value of this type only exists once validation and indexing succeeded.
/// It never changes afterwards, so it can be shared freely (e.g. in an
/// `Arc`) and queried from any number of threads.
#[derive(Debug)]
pub struct AccessResolver {
    schema: Schema,
    index: AccessIndex,
}

impl AccessResolver {
    /// Validate `schema` and build its index.
    ///
    /// Fails on the first empty schema, inheritance cycle or duplicate group
    /// id found. A failed schema has to be fixed and initialized again.
    pub fn initialize(schema: Schema) -> SchemaResult<Self> {
        debug!("Initializing access control schema");
        validator::validate(&schema)?;
        let index = AccessIndex::build(&schema)?;
        Ok(Self { schema, index })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn index(&self) -> &AccessIndex {
        &self.index
    }

    /// Permission identifiers granted by `id`, without the group ids
    /// traversed on the way. Sorted for stable output.
    pub fn effective_permissions(&self, id: &str) -> BTreeSet<&str> {
        let mut nodes = HashSet::new();
        self.collect_access_controls(id, &mut nodes);
        nodes
            .into_iter()
            .filter(AccessControl::is_permission)
            .map(|node| node.id())
            .collect()
    }

    /// Check whether `id` grants `permission`
    pub fn grants(&self, id: &str, permission: &str) -> bool {
        let (_, granted) = self.resolve(id);
        granted.contains(permission)
    }

    /// Number of indexed identifiers of each kind
    pub fn counts(&self) -> (usize, usize) {
        (
            self.index.count(AccessControlKind::Group),
            self.index.count(AccessControlKind::Permission),
        )
    }

    fn collect_group_ids(&self, group: &Group, permissions: &mut HashSet<String>) {
        if !permissions.insert(group.id().to_string()) {
            // already collected through another inheritance path
            return;
        }
        trace!(group = group.id(), "Collecting permission ids");
        for permission in group.permissions() {
            permissions.insert(permission.id().to_string());
        }
        for &inherited in group.inherits() {
            if let Some(parent) = self.schema.group(inherited) {
                self.collect_group_ids(parent, permissions);
            }
        }
    }

    fn collect_group_nodes<'a>(
        &'a self,
        group: &'a Group,
        permissions: &mut HashSet<AccessControl<'a>>,
    ) {
        if !permissions.insert(AccessControl::Group(group)) {
            return;
        }
        trace!(group = group.id(), "Collecting permission nodes");
        for permission in group.permissions() {
            permissions.insert(AccessControl::Permission(permission));
        }
        for &inherited in group.inherits() {
            if let Some(parent) = self.schema.group(inherited) {
                self.collect_group_nodes(parent, permissions);
            }
        }
    }
}

impl AccessControlProvider for AccessResolver {
    fn get_access_control(&self, id: &str) -> Option<AccessControl<'_>> {
        self.index.get(id).and_then(|node| node.resolve(&self.schema))
    }

    fn collect_access_control_ids(&self, id: &str, permissions: &mut HashSet<String>) -> bool {
        match self.get_access_control(id) {
            Some(AccessControl::Group(group)) => {
                self.collect_group_ids(group, permissions);
                true
            }
            Some(AccessControl::Permission(_)) => {
                permissions.insert(id.to_string());
                true
            }
            None => {
                trace!(id, "Unknown access control id, treating it as a flat permission");
                permissions.insert(id.to_string());
                false
            }
        }
    }

    fn collect_access_controls<'a>(
        &'a self,
        id: &str,
        permissions: &mut HashSet<AccessControl<'a>>,
    ) -> bool {
        match self.get_access_control(id) {
            Some(AccessControl::Group(group)) => {
                self.collect_group_nodes(group, permissions);
                true
            }
            Some(node) => {
                permissions.insert(node);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SchemaError;
    use rstest::rstest;
    use std::sync::Arc;

    /// ReadOnly <- ReadWrite <- Admin
    fn sample_schema() -> Schema {
        let mut schema = Schema::new();
        let read_only = schema.add_group(Group::new("ReadOnly").with_permissions([
            "Customer_ReadCustomer",
            "Customer_ReadProfile",
            "Customer_ReadAddress",
            "Contract_ReadContract",
            "Contract_ReadContractAsset",
        ]));
        let read_write = schema.add_group(Group::new("ReadWrite").with_permissions([
            "Customer_CreateCustomer",
            "Customer_CreateProfile",
            "Customer_CreateAddress",
            "Contract_CreateContract",
            "Contract_CreateContractAsset",
            "Customer_UpdateCustomer",
            "Customer_UpdateProfile",
            "Customer_UpdateAddress",
            "Contract_UpdateContract",
            "Contract_UpdateContractAsset",
        ]));
        let admin = schema.add_group(Group::new("Admin").with_type("role").with_permissions([
            "Customer_DeleteCustomer",
            "Customer_DeleteProfile",
            "Customer_DeleteAddress",
            "Contract_DeleteContract",
            "Contract_DeleteContractAsset",
            "System_ReadUser",
            "System_CreateUser",
            "System_UpdateUser",
            "System_DeleteUser",
        ]));
        schema.add_inherit(read_write, read_only);
        schema.add_inherit(admin, read_write);
        schema
    }

    fn resolver() -> AccessResolver {
        AccessResolver::initialize(sample_schema()).unwrap()
    }

    #[rstest]
    #[case("Admin", 27, 24)]
    #[case("ReadWrite", 17, 15)]
    #[case("ReadOnly", 6, 5)]
    #[case("System_DeleteUser", 1, 1)]
    fn test_effective_set_sizes(
        #[case] id: &str,
        #[case] with_groups: usize,
        #[case] permissions_only: usize,
    ) {
        let resolver = resolver();

        let (found, ids) = resolver.resolve(id);
        assert!(found);
        assert_eq!(ids.len(), with_groups);

        let mut nodes = HashSet::new();
        assert!(resolver.collect_access_controls(id, &mut nodes));
        assert_eq!(nodes.len(), with_groups);

        assert_eq!(resolver.effective_permissions(id).len(), permissions_only);
    }

    #[test]
    fn test_admin_nodes() {
        let resolver = resolver();
        let mut nodes = HashSet::new();
        assert!(resolver.collect_access_controls("Admin", &mut nodes));

        for id in [
            "Customer_ReadCustomer",
            "Customer_CreateCustomer",
            "Customer_DeleteCustomer",
        ] {
            let node = resolver.get_access_control(id).unwrap();
            assert!(nodes.contains(&node), "missing {id}");
        }
    }

    #[test]
    fn test_read_only_excludes_admin_permissions() {
        let resolver = resolver();
        let (_, ids) = resolver.resolve("ReadOnly");
        assert!(ids.contains("Contract_ReadContractAsset"));
        assert!(!ids.contains("Contract_UpdateContractAsset"));
        assert!(!ids.contains("System_DeleteUser"));
        assert!(resolver.grants("Admin", "Contract_ReadContractAsset"));
        assert!(!resolver.grants("ReadWrite", "System_DeleteUser"));
    }

    #[test]
    fn test_unknown_id() {
        let resolver = resolver();

        let mut ids = HashSet::new();
        assert!(!resolver.collect_access_control_ids("nonexistent", &mut ids));
        assert_eq!(ids, HashSet::from(["nonexistent".to_string()]));

        let mut nodes = HashSet::new();
        assert!(!resolver.collect_access_controls("", &mut nodes));
        assert!(nodes.is_empty());
    }

    #[test]
    fn test_union_inheritance_law() {
        let resolver = resolver();

        let (_, admin) = resolver.resolve("Admin");
        let (_, read_write) = resolver.resolve("ReadWrite");
        let admin_group = resolver.schema().group(resolver.schema().top_level()[2]).unwrap();

        let mut expected: HashSet<String> = admin_group
            .permissions()
            .iter()
            .map(|p| p.id().to_string())
            .collect();
        expected.extend(read_write);
        expected.insert("Admin".to_string());

        assert_eq!(admin, expected);
    }

    #[test]
    fn test_idempotent() {
        let resolver = resolver();
        assert_eq!(resolver.resolve("Admin"), resolver.resolve("Admin"));
        assert_eq!(
            resolver.effective_permissions("ReadWrite"),
            resolver.effective_permissions("ReadWrite")
        );
    }

    #[test]
    fn test_diamond_shared_group() {
        let mut schema = Schema::new();
        let base = schema.add_group(Group::new("Base").with_permissions(["read", "list"]));
        let left = schema.add_group(Group::new("Left").with_permission("write"));
        let right = schema.add_group(Group::new("Right").with_permission("delete"));
        let top = schema.add_group(Group::new("Top"));
        schema.add_inherit(left, base);
        schema.add_inherit(right, base);
        schema.add_inherit(top, left);
        schema.add_inherit(top, right);
        let resolver = AccessResolver::initialize(schema).unwrap();

        let (_, left_ids) = resolver.resolve("Left");
        let (_, right_ids) = resolver.resolve("Right");
        assert!(left_ids.is_superset(&HashSet::from(["read".to_string(), "list".to_string()])));
        assert!(right_ids.is_superset(&HashSet::from(["read".to_string(), "list".to_string()])));

        assert_eq!(
            resolver.effective_permissions("Top"),
            BTreeSet::from(["delete", "list", "read", "write"])
        );
    }

    #[test]
    fn test_principal_with_several_roles() {
        let resolver = resolver();
        let mut ids = HashSet::new();
        let unknown =
            resolver.collect_principal_ids(&["ReadOnly", "Chief", "System_ReadUser"], &mut ids);

        assert_eq!(unknown, vec!["Chief".to_string()]);
        assert!(ids.contains("Chief"));
        assert!(ids.contains("System_ReadUser"));
        assert!(ids.contains("Customer_ReadCustomer"));
        assert!(!ids.contains("Customer_DeleteCustomer"));
    }

    #[test]
    fn test_duplicate_permission_nodes_from_two_groups() {
        let mut schema = Schema::new();
        let first = schema.add_group(Group::new("First").with_permission("shared"));
        let second = schema.add_group(Group::new("Second").with_permission("shared"));
        let both = schema.add_group(Group::new("Both"));
        schema.add_inherit(both, first);
        schema.add_inherit(both, second);
        let resolver = AccessResolver::initialize(schema).unwrap();

        let (_, ids) = resolver.resolve("Both");
        assert_eq!(ids.len(), 4);
        assert_eq!(
            resolver.effective_permissions("Both"),
            BTreeSet::from(["shared"])
        );
    }

    #[test]
    fn test_initialize_failures() {
        assert_eq!(
            AccessResolver::initialize(Schema::new()).unwrap_err(),
            SchemaError::EmptySchema
        );

        let mut schema = sample_schema();
        let read_only = schema.top_level()[0];
        let admin = schema.top_level()[2];
        schema.add_inherit(read_only, admin);
        assert!(matches!(
            AccessResolver::initialize(schema).unwrap_err(),
            SchemaError::CyclicInheritance { .. }
        ));
    }

    #[test]
    fn test_concurrent_queries() {
        let resolver = Arc::new(resolver());
        let (_, expected) = resolver.resolve("Admin");

        std::thread::scope(|scope| {
            for _ in 0..8 {
                let resolver = Arc::clone(&resolver);
                let expected = &expected;
                scope.spawn(move || {
                    for _ in 0..50 {
                        let (found, ids) = resolver.resolve("Admin");
                        assert!(found);
                        assert_eq!(&ids, expected);
                    }
                });
            }
        });
    }
}
