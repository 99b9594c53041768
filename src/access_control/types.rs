//! Access control types
//!
//! Core types shared by the index and the resolver.

use crate::access_control::schema::{Group, Permission};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Kind of node an identifier is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessControlKind {
    Group,
    Permission,
}

impl AccessControlKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            AccessControlKind::Group => "group",
            AccessControlKind::Permission => "permission",
        }
    }
}

impl fmt::Display for AccessControlKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Either a group or a permission borrowed from a schema.
///
/// Equality and hashing use node identity, not the identifier: two
/// permissions declared by different groups with the same id are different
/// nodes. The identifier is still what ends up in resolved id sets.
#[derive(Debug, Clone, Copy)]
pub enum AccessControl<'a> {
    Group(&'a Group),
    Permission(&'a Permission),
}

impl<'a> AccessControl<'a> {
    pub fn id(&self) -> &'a str {
        match self {
            AccessControl::Group(group) => group.id(),
            AccessControl::Permission(permission) => permission.id(),
        }
    }

    pub const fn kind(&self) -> AccessControlKind {
        match self {
            AccessControl::Group(_) => AccessControlKind::Group,
            AccessControl::Permission(_) => AccessControlKind::Permission,
        }
    }

    pub const fn is_group(&self) -> bool {
        matches!(self, AccessControl::Group(_))
    }

    pub const fn is_permission(&self) -> bool {
        matches!(self, AccessControl::Permission(_))
    }
}

impl PartialEq for AccessControl<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (AccessControl::Group(a), AccessControl::Group(b)) => std::ptr::eq(*a, *b),
            (AccessControl::Permission(a), AccessControl::Permission(b)) => std::ptr::eq(*a, *b),
            _ => false,
        }
    }
}

impl Eq for AccessControl<'_> {}

impl Hash for AccessControl<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind().hash(state);
        match self {
            AccessControl::Group(group) => std::ptr::hash(*group, state),
            AccessControl::Permission(permission) => std::ptr::hash(*permission, state),
        }
    }
}

impl fmt::Display for AccessControl<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.kind(), self.id())
    }
}

/// Read access to an initialized access control schema.
///
/// Implementations are immutable once constructed, so every method can be
/// called from many threads at once. Each call only writes to the set it is
/// handed.
pub trait AccessControlProvider {
    /// Raw index lookup
    fn get_access_control(&self, id: &str) -> Option<AccessControl<'_>>;

    /// Add the identifiers granted by `id` to `permissions`.
    ///
    /// Groups contribute their own id, their permission ids and everything
    /// they inherit. An unknown `id` is treated as an opaque permission: it is
    /// still added, but `false` is returned.
    fn collect_access_control_ids(&self, id: &str, permissions: &mut HashSet<String>) -> bool;

    /// Add the nodes granted by `id` to `permissions`.
    ///
    /// Returns `false` and adds nothing when `id` is unknown.
    fn collect_access_controls<'a>(
        &'a self,
        id: &str,
        permissions: &mut HashSet<AccessControl<'a>>,
    ) -> bool;

    /// Resolve `id` into a fresh identifier set
    fn resolve(&self, id: &str) -> (bool, HashSet<String>) {
        let mut permissions = HashSet::new();
        let found = self.collect_access_control_ids(id, &mut permissions);
        (found, permissions)
    }

    /// Collect the identifiers granted by several roles of one principal.
    ///
    /// Returns the roles that were not found in the schema.
    fn collect_principal_ids<S>(
        &self,
        roles: &[S],
        permissions: &mut HashSet<String>,
    ) -> Vec<String>
    where
        S: AsRef<str>,
        Self: Sized,
    {
        let mut unknown = Vec::new();
        for role in roles {
            let role: &str = role.as_ref();
            if !self.collect_access_control_ids(role, permissions) {
                unknown.push(role.to_string());
            }
        }
        unknown
    }
}
