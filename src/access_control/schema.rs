//! Access control schema model
//!
//! Plain data describing groups, the permissions they own and the groups they
//! inherit from. Groups live in an arena owned by [`Schema`] and reference each
//! other through [`GroupRef`] handles, so a group shared by several parents is
//! stored once.

use std::fmt;

/// Handle to a group stored in a [`Schema`]
///
/// Two handles are equal only if they address the same arena slot. Group
/// identity is therefore slot identity, not id equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupRef(usize);

impl GroupRef {
    /// Arena slot of the group
    pub const fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for GroupRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A leaf permission. Grants only itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permission {
    id: String,
}

impl Permission {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// A named collection of permissions plus inherited groups
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    id: String,
    group_type: Option<String>,
    permissions: Vec<Permission>,
    inherits: Vec<GroupRef>,
}

impl Group {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            group_type: None,
            permissions: Vec::new(),
            inherits: Vec::new(),
        }
    }

    /// Set the informational type tag (e.g. "role" or "group")
    pub fn with_type(mut self, group_type: impl Into<String>) -> Self {
        self.group_type = Some(group_type.into());
        self
    }

    /// Append an owned permission
    pub fn with_permission(mut self, id: impl Into<String>) -> Self {
        self.permissions.push(Permission::new(id));
        self
    }

    /// Append several owned permissions, keeping their order
    pub fn with_permissions<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions.extend(ids.into_iter().map(Permission::new));
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn group_type(&self) -> Option<&str> {
        self.group_type.as_deref()
    }

    /// Directly owned permissions in insertion order
    pub fn permissions(&self) -> &[Permission] {
        &self.permissions
    }

    /// Directly inherited groups in insertion order
    pub fn inherits(&self) -> &[GroupRef] {
        &self.inherits
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// Root of initialization: an arena of groups plus the ordered top-level list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    groups: Vec<Group>,
    top_level: Vec<GroupRef>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a group in the arena without listing it as top-level.
    ///
    /// Such a group is only reachable through inheritance.
    pub fn insert_group(&mut self, group: Group) -> GroupRef {
        let handle = GroupRef(self.groups.len());
        self.groups.push(group);
        handle
    }

    /// Store a group and append it to the top-level list
    pub fn add_group(&mut self, group: Group) -> GroupRef {
        let handle = self.insert_group(group);
        self.top_level.push(handle);
        handle
    }

    /// List an already stored group as top-level
    pub fn push_top_level(&mut self, group: GroupRef) {
        self.top_level.push(group);
    }

    /// Record that `child` inherits everything `parent` grants.
    ///
    /// Returns `false` and records nothing when `child` is not stored in this
    /// schema. `parent` is not checked here; validation reports it.
    pub fn add_inherit(&mut self, child: GroupRef, parent: GroupRef) -> bool {
        match self.groups.get_mut(child.0) {
            Some(group) => {
                group.inherits.push(parent);
                true
            }
            None => false,
        }
    }

    /// Look up a group by handle
    pub fn group(&self, group: GroupRef) -> Option<&Group> {
        self.groups.get(group.0)
    }

    /// Top-level groups in declaration order
    pub fn top_level(&self) -> &[GroupRef] {
        &self.top_level
    }

    /// Iterate the top-level groups together with their handles
    pub fn top_level_groups(&self) -> impl Iterator<Item = (GroupRef, &Group)> + '_ {
        self.top_level
            .iter()
            .filter_map(|handle| self.group(*handle).map(|group| (*handle, group)))
    }

    /// Every stored group, top-level or not, in arena order
    pub fn groups(&self) -> impl Iterator<Item = (GroupRef, &Group)> + '_ {
        self.groups
            .iter()
            .enumerate()
            .map(|(index, group)| (GroupRef(index), group))
    }

    pub fn is_empty(&self) -> bool {
        self.top_level.is_empty()
    }
}
