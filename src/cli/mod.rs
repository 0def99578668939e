pub mod deps;

use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use project_deps::{Config, DependencyRegistry, Project, ProjectDependencies, StaticPackageService};

/// Environment settings with command-line overrides applied.
pub fn load_config(catalog: Option<PathBuf>, fetch_concurrency: Option<usize>) -> Config {
    let mut config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    };
    if catalog.is_some() {
        config.catalog = catalog;
    }
    if let Some(n) = fetch_concurrency {
        config.fetch_concurrency = n;
    }
    config
}

pub fn load_project(path: &Path) -> Project {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: cannot read '{}': {}", path.display(), e);
            process::exit(1);
        }
    };
    match serde_json::from_str(&content) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: invalid project '{}': {}", path.display(), e);
            process::exit(1);
        }
    }
}

/// Load a project and index its dependencies. Exits if the stored list
/// does not resolve.
pub fn load_registry(path: &Path) -> DependencyRegistry {
    match DependencyRegistry::new(load_project(path)) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {}: {}", path.display(), e);
            process::exit(1);
        }
    }
}

pub fn load_service(config: &Config) -> StaticPackageService {
    let Some(path) = &config.catalog else {
        eprintln!(
            "error: no package catalog (pass --catalog or set {})",
            project_deps::config::CATALOG_VAR
        );
        process::exit(1);
    };
    match StaticPackageService::load(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    }
}

pub fn open(path: &Path, config: &Config) -> ProjectDependencies<StaticPackageService> {
    let registry = load_registry(path);
    let service = Arc::new(load_service(config));
    ProjectDependencies::new(registry, service, config)
}

/// Write the current dependency state back to the project document.
pub fn save_project(path: &Path, deps: &ProjectDependencies<StaticPackageService>) {
    let json = {
        let registry = deps.read();
        serde_json::to_string_pretty(registry.project())
    };
    let json = match json {
        Ok(j) => j,
        Err(e) => {
            eprintln!("error: cannot serialize project: {}", e);
            process::exit(1);
        }
    };
    if let Err(e) = std::fs::write(path, json + "\n") {
        eprintln!("error: cannot write '{}': {}", path.display(), e);
        process::exit(1);
    }
}
