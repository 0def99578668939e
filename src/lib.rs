//! Dependency resolution and ownership tracking for design projects that
//! import other published projects as packages.

pub mod config;
pub mod error;
pub mod graph;
pub mod model;
pub mod ownership;
pub mod project;
pub mod registry;
pub mod service;

// Re-exports used by the CLI, benches and integration tests
pub use config::Config;
pub use error::{
    ConfigError, GraphError, ImportError, MetadataFetchError, RemoveError, ServiceError,
};
pub use graph::{build_dependency_map, cross_check, DependencyGraph, ResolvedMap};
pub use model::{DependencyNode, ObjectId, ObjectKind, PackageId, Project, ProjectId, Site, Version};
pub use ownership::{Owner, OwnershipIndex};
pub use project::{ProjectDependencies, RefreshReport};
pub use registry::{DependencyRegistry, DirectDependencyEntry, UpgradeReport, UpgradedPackage};
pub use service::{HostAuth, PackageMetadata, PackageService, StaticPackageService};
