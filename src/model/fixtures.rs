//! Builders shared by the unit tests.

use std::sync::Arc;

use super::*;

pub(crate) fn component(id: &str) -> Component {
    Component {
        id: ObjectId::from(id),
        name: id.to_string(),
        root: ObjectId::new(format!("{}-root", id)),
        instantiates: Vec::new(),
        data_sources: Vec::new(),
    }
}

pub(crate) fn asset(id: &str, kind: ObjectKind) -> Asset {
    Asset {
        id: ObjectId::from(id),
        kind,
        name: id.to_string(),
    }
}

/// A package `id@version` whose site declares one component `<id>.comp`
/// and one token `<id>.token`.
pub(crate) fn node(id: &str, version: &str, deps: Vec<Arc<DependencyNode>>) -> Arc<DependencyNode> {
    let site = Site {
        components: vec![component(&format!("{}.comp", id))],
        assets: vec![asset(&format!("{}.token", id), ObjectKind::StyleToken)],
        dependencies: deps,
        ..Site::default()
    };
    node_with_site(id, version, site)
}

pub(crate) fn node_with_site(id: &str, version: &str, site: Site) -> Arc<DependencyNode> {
    Arc::new(DependencyNode {
        package_id: PackageId::from(id),
        version: Version::from(version),
        project_id: ProjectId::new(format!("proj-{}", id)),
        name: id.to_string(),
        hostless: false,
        site,
    })
}

/// A project published as package `id` with the given direct dependencies.
pub(crate) fn project(id: &str, deps: Vec<Arc<DependencyNode>>) -> Project {
    let mut project = Project::new(format!("proj-{}", id), id);
    project.package_id = Some(PackageId::from(id));
    project.site.components.push(component(&format!("{}.own", id)));
    project.site.dependencies = deps;
    project
}
