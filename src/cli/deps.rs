use std::path::Path;
use std::process;

use project_deps::{Config, DependencyGraph, ObjectId, PackageId, ProjectId};

use super::{load_registry, open, save_project};

pub fn cmd_tree(path: &Path) {
    let registry = load_registry(path);
    let project = registry.project();
    if project.direct_dependencies().is_empty() {
        println!("No dependencies.");
        return;
    }
    let graph = DependencyGraph::from_resolved(registry.resolved());
    let roots = project.direct_dependencies().iter().map(|n| &n.package_id);
    println!("{}", project.name);
    for line in graph.render_tree(registry.resolved(), roots).lines() {
        println!("    {}", line);
    }
}

pub async fn cmd_list(path: &Path, refresh: bool, config: &Config) {
    let deps = open(path, config);
    let report = deps.refresh_metadata(refresh).await;
    let registry = deps.read();
    let entries = registry.list_direct();
    if entries.is_empty() {
        println!("No dependencies.");
        return;
    }
    println!("Dependencies ({}):", entries.len());
    for entry in entries {
        let status = match &entry.latest {
            Some(latest) if entry.update_available() => format!("update available: {}", latest.version),
            Some(_) => "up to date".to_string(),
            None => "latest version unknown".to_string(),
        };
        println!("  {} = {} ({})", entry.node.name, entry.node.label(), status);
    }
    for failure in &report.failed {
        eprintln!("warning: {}", failure);
    }
}

pub fn cmd_owner(path: &Path, object: &str) {
    let registry = load_registry(path);
    let object = ObjectId::from(object);
    match (registry.owner_of(&object), registry.ownership().owner_of(&object)) {
        (Some(node), Some(owner)) => {
            println!("{} {} is owned by {}", owner.kind, object, node.label());
        }
        _ if registry.project().site.component(&object).is_some() => {
            println!("{} belongs to {}", object, registry.project().name);
        }
        _ => {
            eprintln!("error: {} is not owned by any imported package", object);
            process::exit(1);
        }
    }
}

pub async fn cmd_check(path: &Path, project_id: &str, config: &Config) {
    let deps = open(path, config);
    let result = match deps.fetch_candidate(&ProjectId::from(project_id)).await {
        Ok(candidate) => deps.can_add(&candidate).map(|()| candidate),
        Err(e) => Err(e),
    };
    match result {
        Ok(candidate) => println!("OK  {} can be imported", candidate.label()),
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    }
}

pub async fn cmd_import(path: &Path, project_id: &str, config: &Config) {
    let deps = open(path, config);
    match deps.import_project(&ProjectId::from(project_id)).await {
        Ok(added) => {
            save_project(path, &deps);
            println!(
                "Imported {}. {} package(s) resolved.",
                added.label(),
                deps.read().resolved().len()
            );
        }
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    }
}

pub async fn cmd_remove(path: &Path, package_id: &str, config: &Config) {
    let deps = open(path, config);
    match deps.remove(&PackageId::from(package_id)).await {
        Ok(removed) => {
            save_project(path, &deps);
            println!("Removed {}.", removed.label());
        }
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    }
}

pub async fn cmd_upgrade(path: &Path, packages: &[String], config: &Config) {
    let deps = open(path, config);
    let ids: Vec<PackageId> = packages.iter().map(|p| PackageId::from(p.as_str())).collect();
    let report = match deps.upgrade_to_latest(&ids).await {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    };
    if report.is_empty() {
        println!("All dependencies are up to date.");
        return;
    }
    save_project(path, &deps);
    for upgraded in &report.upgraded {
        println!("  {} {} -> {}", upgraded.name, upgraded.from, upgraded.to);
    }
    println!("Upgraded {} package(s).", report.upgraded.len());
}
