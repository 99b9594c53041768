//! Schema graph validation
//!
//! Rejects empty schemas and cyclic inheritance before the index is built.
//! The first problem found aborts validation.

use crate::access_control::schema::{Group, GroupRef, Schema};
use crate::error::{SchemaError, SchemaResult};
use std::collections::HashSet;
use tracing::{debug, trace};

/// Validate the inheritance graph reachable from the top-level groups.
///
/// Each top-level group starts a depth-first walk with its own "on path"
/// set; meeting a group that is still on the path is a cycle. Groups whose
/// walk already completed are remembered in a separate "finished" set and
/// skipped, so a sub-group shared by several parents is neither re-walked nor
/// mistaken for a cycle.
pub fn validate(schema: &Schema) -> SchemaResult<()> {
    if schema.is_empty() {
        return Err(SchemaError::EmptySchema);
    }

    let mut finished = HashSet::new();
    for &root in schema.top_level() {
        let group = schema
            .group(root)
            .ok_or_else(|| SchemaError::UnknownGroupRef {
                group: "<top-level>".to_string(),
                index: root.index(),
            })?;
        let mut on_path = HashSet::new();
        visit(schema, root, group, &mut on_path, &mut finished)?;
    }

    debug!(groups = finished.len(), "Inheritance graph is acyclic");
    Ok(())
}

fn visit(
    schema: &Schema,
    handle: GroupRef,
    group: &Group,
    on_path: &mut HashSet<GroupRef>,
    finished: &mut HashSet<GroupRef>,
) -> SchemaResult<()> {
    if finished.contains(&handle) {
        return Ok(());
    }
    if !on_path.insert(handle) {
        return Err(SchemaError::cyclic(group.id()));
    }
    trace!(group = group.id(), "Checking inheritance");

    for &inherited in group.inherits() {
        let parent = schema
            .group(inherited)
            .ok_or_else(|| SchemaError::UnknownGroupRef {
                group: group.id().to_string(),
                index: inherited.index(),
            })?;
        visit(schema, inherited, parent, on_path, finished)?;
    }

    on_path.remove(&handle);
    finished.insert(handle);
    Ok(())
}
