//! Hierarchy navigation: the `source`/`target` pair and drill-down steps
//!
//! `source` is the dimension currently grouped by and `target` the one a
//! drill-down would move to. At the bottom of a hierarchy there is nowhere
//! left to go, so `target` is the leaf and `source` the level above it.

use ov_model::{Dimension, PackageModel};

use crate::state::QueryState;

/// Compute `source`/`target` for a grouping
///
/// Only the first group is considered, looked up in the general hierarchies.
/// Returns `(None, None)` when no hierarchy contains it.
pub fn resolve_source_target(
    groups: &[String],
    model: &PackageModel,
) -> (Option<String>, Option<String>) {
    let Some(group) = groups.first() else {
        return (None, None);
    };
    let Some(hierarchy) = model.hierarchy_containing(group) else {
        return (None, None);
    };
    let Some(idx) = hierarchy.position(group) else {
        return (None, None);
    };

    let dimensions = &hierarchy.dimensions;
    let (source, target) = match dimensions.get(idx + 1) {
        Some(next) => (&dimensions[idx], next),
        None => {
            let leaf = &dimensions[idx];
            let above = idx
                .checked_sub(1)
                .and_then(|i| dimensions.get(i))
                .unwrap_or(leaf);
            (above, leaf)
        }
    };

    (Some(source.key.clone()), Some(target.key.clone()))
}

/// Recompute `source`/`target` of a scratch state from its `groups`
pub fn update_source_target(state: &mut QueryState, model: &PackageModel) {
    let (source, target) = resolve_source_target(&state.groups, model);
    state.source = source;
    state.target = target;
}

/// The dimension a drill-down from `group` would move to
pub fn next_dimension<'a>(group: &str, model: &'a PackageModel) -> Option<&'a Dimension> {
    model
        .hierarchy_containing(group)
        .and_then(|hierarchy| hierarchy.next_after(group))
}
