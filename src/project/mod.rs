//! Shared, async entry point over a [`DependencyRegistry`].
//!
//! Reads take a short synchronous read lock and never touch the network,
//! so they are safe to call from a UI refresh loop. Mutating flows that
//! await the package service (`import_project`, `upgrade_to_latest`, ...)
//! serialize on one async mutex, so each one validates against the list it
//! is about to replace. Metadata refreshes run concurrently per package and
//! do not take that mutex.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use parking_lot::{RwLock, RwLockReadGuard};
use tokio::sync::Mutex;

use crate::config::Config;
use crate::error::{GraphError, ImportError, MetadataFetchError, RemoveError, ServiceError};
use crate::model::{DependencyNode, PackageId, ProjectId};
use crate::registry::{
    DependencyRegistry, DirectDependencyEntry, FetchOutcome, FetchTicket, UpgradeReport,
};
use crate::service::{HostAuth, PackageMetadata, PackageService};

/// Result of one metadata refresh.
#[derive(Debug, Default)]
pub struct RefreshReport {
    /// Packages whose latest metadata was stored.
    pub updated: Vec<PackageId>,
    /// Results thrown away: superseded by a newer request, or the package
    /// stopped being a direct dependency.
    pub discarded: Vec<PackageId>,
    pub failed: Vec<MetadataFetchError>,
}

pub struct ProjectDependencies<S> {
    registry: Arc<RwLock<DependencyRegistry>>,
    service: Arc<S>,
    mutation: Arc<Mutex<()>>,
    fetch_concurrency: usize,
}

impl<S> Clone for ProjectDependencies<S> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            service: Arc::clone(&self.service),
            mutation: Arc::clone(&self.mutation),
            fetch_concurrency: self.fetch_concurrency,
        }
    }
}

impl<S> ProjectDependencies<S>
where
    S: PackageService + HostAuth + 'static,
{
    pub fn new(registry: DependencyRegistry, service: Arc<S>, config: &Config) -> Self {
        Self {
            registry: Arc::new(RwLock::new(registry)),
            service,
            mutation: Arc::new(Mutex::new(())),
            fetch_concurrency: config.fetch_concurrency.max(1),
        }
    }

    /// Synchronous read access. Do not hold the guard across an `.await`.
    pub fn read(&self) -> RwLockReadGuard<'_, DependencyRegistry> {
        self.registry.read()
    }

    /// Direct dependencies sorted by name. Kicks off a background refresh
    /// when some entry has never had its metadata requested, e.g. after an
    /// external document edit.
    pub fn list_direct(&self) -> Vec<DirectDependencyEntry> {
        let (entries, needs_metadata) = {
            let registry = self.registry.read();
            let entries: Vec<DirectDependencyEntry> =
                registry.list_direct().into_iter().cloned().collect();
            (entries, registry.needs_metadata())
        };
        if needs_metadata {
            match tokio::runtime::Handle::try_current() {
                Ok(handle) => {
                    let this = self.clone();
                    handle.spawn(async move {
                        this.refresh_metadata(false).await;
                    });
                }
                Err(_) => log::debug!("no async runtime; metadata refresh skipped"),
            }
        }
        entries
    }

    pub fn can_add(&self, candidate: &Arc<DependencyNode>) -> Result<(), ImportError> {
        self.registry.read().can_add(candidate)
    }

    pub async fn add(
        &self,
        candidate: &Arc<DependencyNode>,
    ) -> Result<Arc<DependencyNode>, ImportError> {
        let _guard = self.mutation.lock().await;
        self.registry.write().add(candidate)
    }

    /// Latest published release of `project_id`, after the checks that do
    /// not need the graph: publication, self import, duplicate import and
    /// the host auth policy. Nothing is attached.
    pub async fn fetch_candidate(
        &self,
        project_id: &ProjectId,
    ) -> Result<Arc<DependencyNode>, ImportError> {
        self.candidate(project_id).await.map(|(node, _)| node)
    }

    async fn candidate(
        &self,
        project_id: &ProjectId,
    ) -> Result<(Arc<DependencyNode>, PackageMetadata), ImportError> {
        let package_id = self
            .service
            .package_by_project_id(project_id)
            .await?
            .ok_or_else(|| ImportError::UnpublishedPackage(project_id.clone()))?;
        {
            let registry = self.registry.read();
            if registry.self_id() == Some(&package_id) {
                return Err(ImportError::SelfImport(package_id));
            }
            if let Some(entry) = registry.entry(&package_id) {
                return Err(ImportError::AlreadyImported {
                    package_id,
                    name: entry.node.name.clone(),
                });
            }
        }
        if self.service.project_has_app_auth(project_id).await? {
            return Err(ImportError::AuthRestricted(project_id.clone()));
        }

        let latest = match self.service.latest_version_metadata(&package_id).await {
            Ok(latest) => latest,
            Err(ServiceError::NotFound(_)) => {
                return Err(ImportError::UnpublishedPackage(project_id.clone()))
            }
            Err(e) => return Err(e.into()),
        };
        let node = self
            .service
            .package_document(&package_id, &latest.version)
            .await?;
        Ok((node, latest))
    }

    /// Import the latest published version of another project.
    pub async fn import_project(
        &self,
        project_id: &ProjectId,
    ) -> Result<Arc<DependencyNode>, ImportError> {
        let _guard = self.mutation.lock().await;
        let (candidate, latest) = self.candidate(project_id).await?;

        let mut registry = self.registry.write();
        let added = registry.add(&candidate)?;
        if let Some(ticket) = registry.begin_metadata_fetch(&candidate.package_id) {
            registry.finish_metadata_fetch(&ticket, Some(latest));
        }
        Ok(added)
    }

    pub async fn remove(&self, package_id: &PackageId) -> Result<Arc<DependencyNode>, RemoveError> {
        let _guard = self.mutation.lock().await;
        self.registry.write().remove(package_id)
    }

    /// Adopt a dependency list edited outside the registry.
    pub async fn apply_document_change(
        &self,
        dependencies: Vec<Arc<DependencyNode>>,
    ) -> Result<(), GraphError> {
        let _guard = self.mutation.lock().await;
        self.registry.write().apply_document_change(dependencies)
    }

    /// Replace direct dependencies with `targets`, all or nothing, then
    /// refresh metadata.
    pub async fn upgrade(
        &self,
        targets: &[Arc<DependencyNode>],
    ) -> Result<UpgradeReport, GraphError> {
        let report = {
            let _guard = self.mutation.lock().await;
            self.registry.write().plan_upgrade(targets)?
        };
        self.refresh_metadata(true).await;
        Ok(report)
    }

    /// Upgrade the given direct dependencies (all of them when empty) to
    /// their latest published versions.
    pub async fn upgrade_to_latest(
        &self,
        package_ids: &[PackageId],
    ) -> Result<UpgradeReport, ImportError> {
        let report = {
            let _guard = self.mutation.lock().await;
            let current: Vec<Arc<DependencyNode>> = {
                let registry = self.registry.read();
                let selected: Vec<Arc<DependencyNode>> = registry
                    .list_direct()
                    .into_iter()
                    .filter(|e| package_ids.is_empty() || package_ids.contains(&e.node.package_id))
                    .map(|e| Arc::clone(&e.node))
                    .collect();
                selected
            };

            let fetched: Vec<Result<Option<Arc<DependencyNode>>, ServiceError>> =
                stream::iter(current.into_iter().map(|node| {
                    let service = Arc::clone(&self.service);
                    async move {
                        let latest = match service.latest_version_metadata(&node.package_id).await
                        {
                            Ok(latest) => latest,
                            Err(e) => return Err(e),
                        };
                        if latest.version == node.version {
                            return Ok(None);
                        }
                        service
                            .package_document(&node.package_id, &latest.version)
                            .await
                            .map(Some)
                    }
                }))
                .buffer_unordered(self.fetch_concurrency)
                .collect()
                .await;

            let mut targets = Vec::new();
            for result in fetched {
                if let Some(node) = result? {
                    targets.push(node);
                }
            }
            if targets.is_empty() {
                return Ok(UpgradeReport::default());
            }
            self.registry.write().plan_upgrade(&targets)?
        };
        self.refresh_metadata(true).await;
        Ok(report)
    }

    /// Fetch latest-version metadata for direct dependencies: those never
    /// fetched, or all of them when `force`. A failure only affects its own
    /// package.
    pub async fn refresh_metadata(&self, force: bool) -> RefreshReport {
        let tickets: Vec<FetchTicket> = {
            let mut registry = self.registry.write();
            let targets = registry.refresh_targets(force);
            let tickets: Vec<FetchTicket> = targets
                .iter()
                .filter_map(|id| registry.begin_metadata_fetch(id))
                .collect();
            tickets
        };

        let mut results = stream::iter(tickets.into_iter().map(|ticket| {
            let service = Arc::clone(&self.service);
            async move {
                let result = service.latest_version_metadata(&ticket.package_id).await;
                (ticket, result)
            }
        }))
        .buffer_unordered(self.fetch_concurrency);

        let mut report = RefreshReport::default();
        while let Some((ticket, result)) = results.next().await {
            let (fetched, failure): (Option<PackageMetadata>, _) = match result {
                Ok(metadata) => (Some(metadata), None),
                Err(source) => (
                    None,
                    Some(MetadataFetchError {
                        package_id: ticket.package_id.clone(),
                        source,
                    }),
                ),
            };
            let outcome = self.registry.write().finish_metadata_fetch(&ticket, fetched);
            match (outcome, failure) {
                (FetchOutcome::Recorded, None) => report.updated.push(ticket.package_id),
                (FetchOutcome::Recorded, Some(error)) => {
                    log::warn!("{}", error);
                    report.failed.push(error);
                }
                (FetchOutcome::Superseded | FetchOutcome::NoLongerDirect, _) => {
                    log::debug!("discarding metadata for {}: {:?}", ticket.package_id, outcome);
                    report.discarded.push(ticket.package_id);
                }
            }
        }
        report
    }
}
