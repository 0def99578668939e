use std::collections::VecDeque;

use super::*;

/// Flatten the graph reachable from `roots` into one node per package.
///
/// Breadth-first over every node's embedded dependency list. A package seen
/// twice at the same version is skipped along with its children, which
/// keeps diamonds and package-level cycles finite; seen twice at different
/// versions it is a [`GraphError::VersionConflict`]. When `self_id` is
/// given, reaching that package is a [`GraphError::CircularDependency`].
pub fn build_dependency_map(
    roots: &[Arc<DependencyNode>],
    self_id: Option<&PackageId>,
) -> Result<ResolvedMap, GraphError> {
    let mut resolved = ResolvedMap::new();
    // (node, the node whose site declared it)
    let mut queue: VecDeque<(&Arc<DependencyNode>, Option<&DependencyNode>)> =
        roots.iter().map(|root| (root, None)).collect();

    while let Some((node, parent)) = queue.pop_front() {
        if let Some(self_id) = self_id {
            if &node.package_id == self_id {
                let via = parent.unwrap_or(node.as_ref());
                return Err(GraphError::CircularDependency {
                    self_id: self_id.clone(),
                    via: via.name.clone(),
                });
            }
        }

        if let Some(existing) = resolved.get(&node.package_id) {
            if existing.version != node.version {
                return Err(GraphError::VersionConflict {
                    package_id: node.package_id.clone(),
                    name: node.name.clone(),
                    existing: existing.version.clone(),
                    incoming: node.version.clone(),
                });
            }
            continue;
        }

        resolved.insert(node.package_id.clone(), Arc::clone(node));
        for dep in node.dependencies() {
            queue.push_back((dep, Some(node.as_ref())));
        }
    }

    log::debug!(
        "resolved {} package(s) from {} root(s)",
        resolved.len(),
        roots.len()
    );
    Ok(resolved)
}

/// Check that two independently resolved graphs agree on every shared package.
pub fn cross_check(local: &ResolvedMap, candidate: &ResolvedMap) -> Result<(), GraphError> {
    for (package_id, incoming) in candidate {
        if let Some(existing) = local.get(package_id) {
            if existing.version != incoming.version {
                return Err(GraphError::VersionConflict {
                    package_id: package_id.clone(),
                    name: incoming.name.clone(),
                    existing: existing.version.clone(),
                    incoming: incoming.version.clone(),
                });
            }
        }
    }
    Ok(())
}
