//! Error types for resolution, import, removal and the package service.

use thiserror::Error;

use crate::model::{PackageId, ProjectId, Version};

/// A dependency graph that violates the single-version or acyclicity invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error(
        "Cannot use both version {existing} and version {incoming} of package '{name}' ({package_id})"
    )]
    VersionConflict {
        package_id: PackageId,
        name: String,
        existing: Version,
        incoming: Version,
    },
    #[error("Circular dependency: package '{via}' depends on this project ({self_id})")]
    CircularDependency { self_id: PackageId, via: String },
}

/// Failure to attach a new direct dependency.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportError {
    #[error("A project cannot import itself ({0})")]
    SelfImport(PackageId),
    #[error("Package '{name}' is already imported")]
    AlreadyImported { package_id: PackageId, name: String },
    #[error("Project {0} has no published version")]
    UnpublishedPackage(ProjectId),
    #[error("Project {0} has app auth enabled and cannot be imported")]
    AuthRestricted(ProjectId),
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// Failure to detach a direct dependency.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoveError {
    #[error("Package {0} is not a direct dependency")]
    NotADirectDependency(PackageId),
    #[error("Cannot remove '{name}': still required by {}", .dependents.join(", "))]
    BlockedRemoval {
        package_id: PackageId,
        name: String,
        dependents: Vec<String>,
    },
    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Failure reported by the package metadata service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("package service unavailable: {0}")]
    Unavailable(String),
}

/// Latest-version metadata could not be fetched for one package.
///
/// Recorded per package in a refresh report; never aborts a batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot fetch metadata for {package_id}: {source}")]
pub struct MetadataFetchError {
    pub package_id: PackageId,
    #[source]
    pub source: ServiceError,
}

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}
