use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::graph::ResolvedMap;
use crate::model::{DependencyNode, PackageId, Version};

/// Per-dependency derived data, keyed by node identity.
///
/// Entries computed for a node stay valid only while that exact
/// `(package, version)` is part of the resolved graph.
#[derive(Default)]
pub(super) struct DerivedCache {
    data_sources: Mutex<HashMap<(PackageId, Version), Arc<Vec<String>>>>,
}

impl DerivedCache {
    /// External data sources exposed by `node`'s components, sorted.
    pub(super) fn data_sources(&self, node: &DependencyNode) -> Arc<Vec<String>> {
        let key = (node.package_id.clone(), node.version.clone());
        let mut cache = self.data_sources.lock();
        Arc::clone(cache.entry(key).or_insert_with(|| {
            let sources: BTreeSet<&String> = node
                .site
                .components
                .iter()
                .flat_map(|c| c.data_sources.iter())
                .collect();
            Arc::new(sources.into_iter().cloned().collect())
        }))
    }

    /// Forget entries for nodes no longer in `resolved`.
    pub(super) fn retain_resolved(&self, resolved: &ResolvedMap) {
        self.data_sources.lock().retain(|(package_id, version), _| {
            resolved
                .get(package_id)
                .is_some_and(|node| &node.version == version)
        });
    }

    #[cfg(test)]
    pub(super) fn len(&self) -> usize {
        self.data_sources.lock().len()
    }
}
