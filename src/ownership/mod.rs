//! Object → owning package index over the whole resolved graph.
//!
//! Rebuilt from scratch after every graph change. Membership changes are
//! non-local (dropping one package can drop objects owned several hops
//! away), so the index is never patched in place.

use std::collections::{HashMap, HashSet};

use crate::graph::ResolvedMap;
use crate::model::{ObjectId, ObjectKind, PackageId};

/// The package that declares an imported object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Owner {
    pub package_id: PackageId,
    pub kind: ObjectKind,
}

#[derive(Clone, Debug, Default)]
pub struct OwnershipIndex {
    owners: HashMap<ObjectId, Owner>,
    /// Component → package whose site contains it.
    component_sites: HashMap<ObjectId, PackageId>,
    /// Root tree nodes of every imported component.
    tracked_roots: HashSet<ObjectId>,
}

impl OwnershipIndex {
    pub fn build(resolved: &ResolvedMap) -> Self {
        let mut index = Self::default();
        index.rebuild(resolved);
        index
    }

    /// Discard every association and repopulate from `resolved`.
    pub fn rebuild(&mut self, resolved: &ResolvedMap) {
        self.owners.clear();
        self.component_sites.clear();
        self.tracked_roots.clear();

        for (package_id, node) in resolved {
            for (object_id, kind) in node.site.importable_objects() {
                let owner = Owner {
                    package_id: package_id.clone(),
                    kind,
                };
                if let Some(previous) = self.owners.insert(object_id.clone(), owner) {
                    if &previous.package_id != package_id {
                        debug_assert!(
                            false,
                            "{} {} claimed by both {} and {}",
                            kind,
                            object_id,
                            previous.package_id,
                            package_id
                        );
                        log::warn!(
                            "{} {} claimed by both {} and {}; keeping {}",
                            kind,
                            object_id,
                            previous.package_id,
                            package_id,
                            package_id
                        );
                    }
                }
            }
            for component in &node.site.components {
                self.component_sites
                    .insert(component.id.clone(), package_id.clone());
                self.tracked_roots.insert(component.root.clone());
            }
        }

        log::debug!(
            "ownership index: {} object(s) across {} package(s)",
            self.owners.len(),
            resolved.len()
        );
    }

    pub fn owner_of(&self, object: &ObjectId) -> Option<&Owner> {
        self.owners.get(object)
    }

    pub fn owning_package(&self, object: &ObjectId) -> Option<&PackageId> {
        self.owners.get(object).map(|o| &o.package_id)
    }

    pub fn site_of_component(&self, component: &ObjectId) -> Option<&PackageId> {
        self.component_sites.get(component)
    }

    pub fn is_tracked_root(&self, root: &ObjectId) -> bool {
        self.tracked_roots.contains(root)
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    /// Objects owned by `package_id`, in no particular order.
    pub fn objects_of<'a>(
        &'a self,
        package_id: &'a PackageId,
    ) -> impl Iterator<Item = (&'a ObjectId, ObjectKind)> + 'a {
        self.owners
            .iter()
            .filter(move |(_, owner)| &owner.package_id == package_id)
            .map(|(id, owner)| (id, owner.kind))
    }
}

#[cfg(test)]
mod tests;
