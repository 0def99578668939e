use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;

use parking_lot::Mutex;
use thiserror::Error;

use super::*;

/// On-disk catalog of published packages.
///
/// ```json
/// {
///   "releases": [ { "package_id": "...", "version": "3", ... } ],
///   "auth_enabled": ["project-id"]
/// }
/// ```
///
/// The last release listed for a package is its latest version.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub releases: Vec<Arc<DependencyNode>>,
    #[serde(default)]
    pub auth_enabled: BTreeSet<ProjectId>,
}

#[derive(Debug, Error)]
pub enum CatalogLoadError {
    #[error("cannot read catalog '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid catalog '{path}': {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// In-memory package service over a [`Catalog`].
#[derive(Default)]
pub struct StaticPackageService {
    pub(super) releases: HashMap<(PackageId, Version), Arc<DependencyNode>>,
    pub(super) latest: HashMap<PackageId, Version>,
    pub(super) projects: HashMap<ProjectId, PackageId>,
    pub(super) auth_enabled: HashSet<ProjectId>,
    /// Packages whose metadata requests fail, to simulate outages.
    pub(super) failing: Mutex<HashSet<PackageId>>,
}

impl StaticPackageService {
    pub fn new(catalog: Catalog) -> Self {
        let mut service = Self {
            auth_enabled: catalog.auth_enabled.into_iter().collect(),
            ..Self::default()
        };
        for release in catalog.releases {
            service.publish(release);
        }
        service
    }

    pub fn load(path: &Path) -> Result<Self, CatalogLoadError> {
        let content = std::fs::read_to_string(path).map_err(|source| CatalogLoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let catalog: Catalog =
            serde_json::from_str(&content).map_err(|source| CatalogLoadError::Json {
                path: path.display().to_string(),
                source,
            })?;
        log::debug!(
            "loaded {} release(s) from {}",
            catalog.releases.len(),
            path.display()
        );
        Ok(Self::new(catalog))
    }

    /// Register a release; it becomes the package's latest version.
    pub fn publish(&mut self, node: Arc<DependencyNode>) {
        self.latest
            .insert(node.package_id.clone(), node.version.clone());
        self.projects
            .insert(node.project_id.clone(), node.package_id.clone());
        self.releases
            .insert((node.package_id.clone(), node.version.clone()), node);
    }

    pub fn enable_app_auth(&mut self, project_id: ProjectId) {
        self.auth_enabled.insert(project_id);
    }

    pub fn set_failing(&self, package_id: &PackageId, failing: bool) {
        let mut set = self.failing.lock();
        if failing {
            set.insert(package_id.clone());
        } else {
            set.remove(package_id);
        }
    }
}

/// Short content tag for a release.
fn etag(package_id: &PackageId, version: &Version) -> String {
    let hash = blake3::hash(format!("{}@{}", package_id, version).as_bytes());
    hash.to_hex()[..16].to_string()
}

#[async_trait]
impl PackageService for StaticPackageService {
    async fn latest_version_metadata(
        &self,
        package_id: &PackageId,
    ) -> Result<PackageMetadata, ServiceError> {
        if self.failing.lock().contains(package_id) {
            return Err(ServiceError::Unavailable(format!(
                "metadata request for {} failed",
                package_id
            )));
        }
        let version = self
            .latest
            .get(package_id)
            .ok_or_else(|| ServiceError::NotFound(format!("package {}", package_id)))?;
        Ok(PackageMetadata {
            version: version.clone(),
            etag: etag(package_id, version),
        })
    }

    async fn package_document(
        &self,
        package_id: &PackageId,
        version: &Version,
    ) -> Result<Arc<DependencyNode>, ServiceError> {
        self.releases
            .get(&(package_id.clone(), version.clone()))
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("package {}@{}", package_id, version)))
    }

    async fn package_by_project_id(
        &self,
        project_id: &ProjectId,
    ) -> Result<Option<PackageId>, ServiceError> {
        Ok(self.projects.get(project_id).cloned())
    }
}

#[async_trait]
impl HostAuth for StaticPackageService {
    async fn project_has_app_auth(&self, project_id: &ProjectId) -> Result<bool, ServiceError> {
        Ok(self.auth_enabled.contains(project_id))
    }
}
