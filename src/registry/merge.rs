//! Merge rules for site-level declarations brought in by an import.
//!
//! Each rule takes the project's existing value and the incoming one and
//! returns the merged value; the project's own choices always win.

use std::collections::BTreeMap;

use crate::model::{GlobalContext, ObjectId};

/// Existing contexts in order, then incoming contexts for components not
/// already wrapped.
pub fn merge_global_contexts(
    existing: &[GlobalContext],
    incoming: &[GlobalContext],
) -> Vec<GlobalContext> {
    let mut merged = existing.to_vec();
    for context in incoming {
        if !merged.iter().any(|c| c.component == context.component) {
            merged.push(context.clone());
        }
    }
    merged
}

/// Incoming defaults only fill kinds the project has no default for.
pub fn merge_default_components(
    existing: &BTreeMap<String, ObjectId>,
    incoming: &BTreeMap<String, ObjectId>,
) -> BTreeMap<String, ObjectId> {
    let mut merged = existing.clone();
    for (kind, component) in incoming {
        merged
            .entry(kind.clone())
            .or_insert_with(|| component.clone());
    }
    merged
}

/// Drop contexts whose component is no longer available.
pub fn prune_global_contexts(
    existing: &[GlobalContext],
    is_available: impl Fn(&ObjectId) -> bool,
) -> Vec<GlobalContext> {
    existing
        .iter()
        .filter(|c| is_available(&c.component))
        .cloned()
        .collect()
}

/// Drop default-component entries whose component is no longer available.
pub fn prune_default_components(
    existing: &BTreeMap<String, ObjectId>,
    is_available: impl Fn(&ObjectId) -> bool,
) -> BTreeMap<String, ObjectId> {
    existing
        .iter()
        .filter(|(_, component)| is_available(component))
        .map(|(kind, component)| (kind.clone(), component.clone()))
        .collect()
}
