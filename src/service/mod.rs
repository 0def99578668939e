//! Boundary to the package metadata service and the host auth check.
//!
//! The engine only talks to these traits. [`StaticPackageService`] serves
//! a fixed catalog loaded from JSON; the CLI and the tests use it.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;
use crate::model::{DependencyNode, PackageId, ProjectId, Version};

/// Latest published version of a package.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageMetadata {
    pub version: Version,
    pub etag: String,
}

#[async_trait]
pub trait PackageService: Send + Sync {
    async fn latest_version_metadata(
        &self,
        package_id: &PackageId,
    ) -> Result<PackageMetadata, ServiceError>;

    /// The published package version with its site embedded.
    async fn package_document(
        &self,
        package_id: &PackageId,
        version: &Version,
    ) -> Result<Arc<DependencyNode>, ServiceError>;

    /// `Ok(None)` when the project has never been published.
    async fn package_by_project_id(
        &self,
        project_id: &ProjectId,
    ) -> Result<Option<PackageId>, ServiceError>;
}

#[async_trait]
pub trait HostAuth: Send + Sync {
    async fn project_has_app_auth(&self, project_id: &ProjectId) -> Result<bool, ServiceError>;
}

mod catalog;

pub use catalog::{Catalog, CatalogLoadError, StaticPackageService};
