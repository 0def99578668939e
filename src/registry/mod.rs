//! Registry of the current project's direct dependencies.
//!
//! The project document is the source of truth for membership; the
//! registry keeps, next to it, the resolved transitive graph, the
//! ownership index, per-package latest metadata and derived data. Every
//! mutation computes the complete new state first and swaps it in with
//! [`DependencyRegistry::commit`], so a failed check leaves everything as
//! it was.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use crate::error::{GraphError, ImportError, RemoveError};
use crate::graph::{build_dependency_map, cross_check, DependencyGraph, ResolvedMap};
use crate::model::{DependencyNode, ObjectId, PackageId, Project, Site, Version};
use crate::ownership::OwnershipIndex;
use crate::service::PackageMetadata;

mod derived;
pub mod merge;
mod upgrade;

use derived::DerivedCache;
use merge::{
    merge_default_components, merge_global_contexts, prune_default_components,
    prune_global_contexts,
};
pub use upgrade::{UpgradeReport, UpgradedPackage};

// ─── Entries ───────────────────────────────────────────────────────

/// A direct dependency with its (possibly not yet fetched) latest metadata.
#[derive(Clone, Debug)]
pub struct DirectDependencyEntry {
    pub node: Arc<DependencyNode>,
    pub latest: Option<PackageMetadata>,
}

impl DirectDependencyEntry {
    /// A newer (different) version has been published.
    pub fn update_available(&self) -> bool {
        self.latest
            .as_ref()
            .is_some_and(|latest| latest.version != self.node.version)
    }
}

/// Handle for one in-flight metadata request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchTicket {
    pub package_id: PackageId,
    seq: u64,
}

/// What happened to a finished metadata request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The request was the newest for its package; a fetched value was stored.
    Recorded,
    /// A newer request for the same package was started meanwhile.
    Superseded,
    /// The package stopped being a direct dependency meanwhile.
    NoLongerDirect,
}

// ─── Registry ──────────────────────────────────────────────────────

pub struct DependencyRegistry {
    project: Project,
    entries: HashMap<PackageId, DirectDependencyEntry>,
    resolved: ResolvedMap,
    ownership: OwnershipIndex,
    derived: DerivedCache,
    /// Direct dependencies whose metadata has never been requested.
    pending_metadata: BTreeSet<PackageId>,
    fetch_seq: u64,
    /// Newest outstanding request per package; an entry means in flight.
    newest_fetch: HashMap<PackageId, u64>,
}

impl DependencyRegistry {
    /// Replay the project's persisted dependency list.
    pub fn new(project: Project) -> Result<Self, GraphError> {
        let resolved =
            build_dependency_map(project.direct_dependencies(), project.package_id.as_ref())?;
        let ownership = OwnershipIndex::build(&resolved);
        let mut registry = Self {
            project,
            entries: HashMap::new(),
            resolved,
            ownership,
            derived: DerivedCache::default(),
            pending_metadata: BTreeSet::new(),
            fetch_seq: 0,
            newest_fetch: HashMap::new(),
        };
        registry.sync_entries();
        log::debug!(
            "registry for '{}': {} direct, {} resolved package(s)",
            registry.project.name,
            registry.entries.len(),
            registry.resolved.len()
        );
        Ok(registry)
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn into_project(self) -> Project {
        self.project
    }

    /// The package id this project publishes under.
    pub fn self_id(&self) -> Option<&PackageId> {
        self.project.package_id.as_ref()
    }

    // ─── Reads ─────────────────────────────────────────────────

    /// Direct dependencies sorted by display name.
    pub fn list_direct(&self) -> Vec<&DirectDependencyEntry> {
        let mut entries: Vec<_> = self.entries.values().collect();
        entries.sort_by(|a, b| {
            a.node
                .name
                .cmp(&b.node.name)
                .then_with(|| a.node.package_id.cmp(&b.node.package_id))
        });
        entries
    }

    pub fn entry(&self, package_id: &PackageId) -> Option<&DirectDependencyEntry> {
        self.entries.get(package_id)
    }

    /// Direct membership only.
    pub fn contains_package(&self, package_id: &PackageId) -> bool {
        self.entries.contains_key(package_id)
    }

    /// Version of `package_id` anywhere in the transitive graph.
    pub fn resolved_version_of(&self, package_id: &PackageId) -> Option<&Version> {
        self.resolved.get(package_id).map(|node| &node.version)
    }

    pub fn resolved(&self) -> &ResolvedMap {
        &self.resolved
    }

    pub fn ownership(&self) -> &OwnershipIndex {
        &self.ownership
    }

    /// The package node whose site declares `object`.
    pub fn owner_of(&self, object: &ObjectId) -> Option<&Arc<DependencyNode>> {
        self.ownership
            .owning_package(object)
            .and_then(|package_id| self.resolved.get(package_id))
    }

    /// The site that directly contains an imported component.
    pub fn site_of_component(&self, component: &ObjectId) -> Option<&Site> {
        self.ownership
            .site_of_component(component)
            .and_then(|package_id| self.resolved.get(package_id))
            .map(|node| &node.site)
    }

    /// A metadata request for `package_id` has started and not settled.
    pub fn is_fetching(&self, package_id: &PackageId) -> bool {
        self.newest_fetch.contains_key(package_id)
    }

    pub fn is_tracked_root(&self, root: &ObjectId) -> bool {
        self.ownership.is_tracked_root(root)
    }

    /// External data sources exposed by a resolved package.
    pub fn data_sources_of(&self, package_id: &PackageId) -> Option<Arc<Vec<String>>> {
        self.resolved
            .get(package_id)
            .map(|node| self.derived.data_sources(node))
    }

    /// `None` when `package_id` is not a direct dependency.
    pub fn update_available(&self, package_id: &PackageId) -> Option<bool> {
        self.entries
            .get(package_id)
            .map(DirectDependencyEntry::update_available)
    }

    /// Some direct dependency has never had its metadata requested.
    /// Packages with a request in flight do not count.
    pub fn needs_metadata(&self) -> bool {
        !self.pending_metadata.is_empty()
    }

    /// Direct dependencies a refresh should fetch: those without metadata
    /// and no request in flight, or all of them when `force`.
    pub fn refresh_targets(&self, force: bool) -> Vec<PackageId> {
        let mut targets: Vec<PackageId> = self
            .entries
            .values()
            .filter(|entry| {
                force
                    || (entry.latest.is_none()
                        && !self.newest_fetch.contains_key(&entry.node.package_id))
            })
            .map(|entry| entry.node.package_id.clone())
            .collect();
        targets.sort();
        targets
    }

    /// BLAKE3 over the serialized direct-dependency list.
    pub fn fingerprint(&self) -> Result<blake3::Hash, serde_json::Error> {
        let mut hasher = blake3::Hasher::new();
        serde_json::to_writer(&mut hasher, self.project.direct_dependencies())?;
        Ok(hasher.finalize())
    }

    // ─── Import ────────────────────────────────────────────────

    /// Check whether `candidate` could be attached without breaking an
    /// invariant. No state changes.
    pub fn can_add(&self, candidate: &Arc<DependencyNode>) -> Result<(), ImportError> {
        self.admit(candidate).map(|_| ())
    }

    fn admit(&self, candidate: &Arc<DependencyNode>) -> Result<ResolvedMap, ImportError> {
        let self_id = self.self_id();
        if self_id == Some(&candidate.package_id) {
            return Err(ImportError::SelfImport(candidate.package_id.clone()));
        }
        if self.entries.contains_key(&candidate.package_id) {
            return Err(ImportError::AlreadyImported {
                package_id: candidate.package_id.clone(),
                name: candidate.name.clone(),
            });
        }
        let local = build_dependency_map(self.project.direct_dependencies(), self_id)?;
        let incoming = build_dependency_map(std::slice::from_ref(candidate), self_id)?;
        cross_check(&local, &incoming)?;
        Ok(incoming)
    }

    /// Attach `candidate` as a direct dependency.
    ///
    /// Transitive packages owning components the project already
    /// instantiates are attached as direct dependencies too. The
    /// candidate's global contexts and default components fill in what the
    /// project does not already declare.
    pub fn add(
        &mut self,
        candidate: &Arc<DependencyNode>,
    ) -> Result<Arc<DependencyNode>, ImportError> {
        let incoming = self.admit(candidate)?;
        let promoted = self.promotions(candidate, &incoming);

        let mut site = self.project.site.clone();
        site.dependencies.push(Arc::clone(candidate));
        site.dependencies.extend(promoted.iter().cloned());
        site.global_contexts =
            merge_global_contexts(&site.global_contexts, &candidate.site.global_contexts);
        site.default_components = merge_default_components(
            &site.default_components,
            &candidate.site.default_components,
        );

        let resolved = build_dependency_map(&site.dependencies, self.self_id())?;
        let ownership = OwnershipIndex::build(&resolved);
        self.commit(site, resolved, ownership);

        if promoted.is_empty() {
            log::info!("added {}", candidate.label());
        } else {
            let labels: Vec<String> = promoted.iter().map(|n| n.label()).collect();
            log::info!(
                "added {} (also attached {})",
                candidate.label(),
                labels.join(", ")
            );
        }
        Ok(Arc::clone(candidate))
    }

    /// Packages inside `incoming` (other than the candidate) that own a
    /// component the project's own content instantiates.
    fn promotions(
        &self,
        candidate: &Arc<DependencyNode>,
        incoming: &ResolvedMap,
    ) -> Vec<Arc<DependencyNode>> {
        let incoming_owners = OwnershipIndex::build(incoming);
        let mut promoted: BTreeMap<&PackageId, &Arc<DependencyNode>> = BTreeMap::new();
        for component in self.project.site.instantiated_components() {
            let Some(owner) = incoming_owners.owning_package(component) else {
                continue;
            };
            if owner == &candidate.package_id || self.entries.contains_key(owner) {
                continue;
            }
            if let Some((package_id, node)) = incoming.get_key_value(owner) {
                promoted.insert(package_id, node);
            }
        }
        promoted.into_values().cloned().collect()
    }

    // ─── Removal ───────────────────────────────────────────────

    /// Detach a direct dependency nothing else still needs.
    pub fn remove(&mut self, package_id: &PackageId) -> Result<Arc<DependencyNode>, RemoveError> {
        let Some(entry) = self.entries.get(package_id) else {
            return Err(RemoveError::NotADirectDependency(package_id.clone()));
        };
        let removed = Arc::clone(&entry.node);

        let graph = DependencyGraph::from_resolved(&self.resolved);
        let mut dependents: Vec<String> = graph
            .dependents_among(package_id, self.entries.keys())
            .iter()
            .filter_map(|id| self.entries.get(id))
            .map(|entry| entry.node.name.clone())
            .collect();
        if !dependents.is_empty() {
            dependents.sort();
            return Err(RemoveError::BlockedRemoval {
                package_id: package_id.clone(),
                name: removed.name.clone(),
                dependents,
            });
        }

        let mut site = self.project.site.clone();
        site.dependencies.retain(|node| &node.package_id != package_id);
        let resolved = build_dependency_map(&site.dependencies, self.self_id())?;
        let ownership = OwnershipIndex::build(&resolved);

        let own = &self.project.site;
        let is_available =
            |id: &ObjectId| own.component(id).is_some() || ownership.owner_of(id).is_some();
        site.global_contexts = prune_global_contexts(&site.global_contexts, is_available);
        site.default_components =
            prune_default_components(&site.default_components, is_available);

        self.commit(site, resolved, ownership);
        log::info!("removed {}", removed.label());
        Ok(removed)
    }

    // ─── Out-of-band edits ─────────────────────────────────────

    /// Adopt a dependency list written to the document by someone else
    /// (undo/redo, a collaborator). Rejected without effect if the list
    /// violates a graph invariant.
    pub fn apply_document_change(
        &mut self,
        dependencies: Vec<Arc<DependencyNode>>,
    ) -> Result<(), GraphError> {
        let resolved = build_dependency_map(&dependencies, self.self_id())?;
        let ownership = OwnershipIndex::build(&resolved);
        let mut site = self.project.site.clone();
        site.dependencies = dependencies;
        self.commit(site, resolved, ownership);
        log::debug!(
            "reconciled external edit: {} direct dependencies",
            self.entries.len()
        );
        Ok(())
    }

    // ─── Metadata ──────────────────────────────────────────────

    /// Start a metadata request; any earlier request for the same package
    /// becomes superseded. `None` if the package is not a direct dependency.
    pub fn begin_metadata_fetch(&mut self, package_id: &PackageId) -> Option<FetchTicket> {
        if !self.entries.contains_key(package_id) {
            return None;
        }
        self.pending_metadata.remove(package_id);
        self.fetch_seq += 1;
        self.newest_fetch.insert(package_id.clone(), self.fetch_seq);
        Some(FetchTicket {
            package_id: package_id.clone(),
            seq: self.fetch_seq,
        })
    }

    /// Settle a metadata request. `fetched` is `None` when the request
    /// failed; the previous value, if any, is kept.
    pub fn finish_metadata_fetch(
        &mut self,
        ticket: &FetchTicket,
        fetched: Option<PackageMetadata>,
    ) -> FetchOutcome {
        let Some(entry) = self.entries.get_mut(&ticket.package_id) else {
            return FetchOutcome::NoLongerDirect;
        };
        if self.newest_fetch.get(&ticket.package_id) != Some(&ticket.seq) {
            return FetchOutcome::Superseded;
        }
        self.newest_fetch.remove(&ticket.package_id);
        self.pending_metadata.remove(&ticket.package_id);
        if let Some(metadata) = fetched {
            entry.latest = Some(metadata);
        }
        FetchOutcome::Recorded
    }

    // ─── Commit ────────────────────────────────────────────────

    /// Swap in a fully validated state.
    fn commit(&mut self, site: Site, resolved: ResolvedMap, ownership: OwnershipIndex) {
        self.project.site = site;
        self.resolved = resolved;
        self.ownership = ownership;
        self.derived.retain_resolved(&self.resolved);
        self.sync_entries();
    }

    /// Rebuild the entry table from the document, keeping fetched metadata
    /// for packages that stay direct.
    fn sync_entries(&mut self) {
        let mut entries = HashMap::with_capacity(self.project.site.dependencies.len());
        for node in self.project.direct_dependencies() {
            let latest = match self.entries.get(&node.package_id) {
                Some(existing) => existing.latest.clone(),
                None => {
                    self.pending_metadata.insert(node.package_id.clone());
                    None
                }
            };
            entries.insert(
                node.package_id.clone(),
                DirectDependencyEntry {
                    node: Arc::clone(node),
                    latest,
                },
            );
        }
        self.pending_metadata.retain(|id| entries.contains_key(id));
        self.newest_fetch.retain(|id, _| entries.contains_key(id));
        self.entries = entries;
    }
}
