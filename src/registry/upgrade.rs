use std::collections::HashMap;
use std::sync::Arc;

use super::DependencyRegistry;
use crate::error::GraphError;
use crate::graph::build_dependency_map;
use crate::model::{DependencyNode, PackageId, Version};
use crate::ownership::OwnershipIndex;

/// One direct dependency moved to another version.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpgradedPackage {
    pub package_id: PackageId,
    pub name: String,
    pub from: Version,
    pub to: Version,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UpgradeReport {
    pub upgraded: Vec<UpgradedPackage>,
}

impl UpgradeReport {
    pub fn is_empty(&self) -> bool {
        self.upgraded.is_empty()
    }
}

impl DependencyRegistry {
    /// Swap direct dependencies for the given nodes, all or nothing.
    ///
    /// Each direct dependency with a matching target is replaced by it;
    /// targets for packages that are not direct dependencies are ignored.
    /// The resulting list must resolve without a version conflict,
    /// otherwise nothing changes.
    pub fn plan_upgrade(
        &mut self,
        targets: &[Arc<DependencyNode>],
    ) -> Result<UpgradeReport, GraphError> {
        let by_id: HashMap<&PackageId, &Arc<DependencyNode>> = targets
            .iter()
            .map(|node| (&node.package_id, node))
            .collect();
        for target in targets {
            if !self.contains_package(&target.package_id) {
                log::debug!(
                    "ignoring upgrade target {}: not a direct dependency",
                    target.label()
                );
            }
        }

        let mut report = UpgradeReport::default();
        let mut site = self.project.site.clone();
        for slot in site.dependencies.iter_mut() {
            let Some(&target) = by_id.get(&slot.package_id) else {
                continue;
            };
            if target.version != slot.version {
                report.upgraded.push(UpgradedPackage {
                    package_id: slot.package_id.clone(),
                    name: target.name.clone(),
                    from: slot.version.clone(),
                    to: target.version.clone(),
                });
            }
            *slot = Arc::clone(target);
        }

        let resolved = build_dependency_map(&site.dependencies, None)?;
        let ownership = OwnershipIndex::build(&resolved);
        self.commit(site, resolved, ownership);

        for upgraded in &report.upgraded {
            log::info!(
                "upgraded {} from {} to {}",
                upgraded.name,
                upgraded.from,
                upgraded.to
            );
        }
        Ok(report)
    }
}
