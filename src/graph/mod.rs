//! Dependency graph resolution.
//!
//! [`build_dependency_map`] flattens the package graph reachable from a set
//! of roots into one node per package id, enforcing the single-version
//! invariant. [`DependencyGraph`] indexes a flattened map as a directed
//! graph for reachability questions (who still needs this package) and for
//! rendering.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use petgraph::algo::has_path_connecting;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;
use petgraph::Direction;

use crate::error::GraphError;
use crate::model::{DependencyNode, PackageId};

/// Every package in play, keyed by id, one version each.
pub type ResolvedMap = BTreeMap<PackageId, Arc<DependencyNode>>;

mod resolve;

pub use resolve::{build_dependency_map, cross_check};

// ─── Graph Index ───────────────────────────────────────────────────

/// Package-level edges of a resolved map.
pub struct DependencyGraph {
    graph: DiGraph<PackageId, ()>,
    indices: HashMap<PackageId, NodeIndex>,
}

impl DependencyGraph {
    pub fn from_resolved(resolved: &ResolvedMap) -> Self {
        let mut graph = DiGraph::with_capacity(resolved.len(), resolved.len());
        let mut indices = HashMap::with_capacity(resolved.len());
        for package_id in resolved.keys() {
            indices.insert(package_id.clone(), graph.add_node(package_id.clone()));
        }
        for (package_id, node) in resolved {
            let from = indices[package_id];
            for dep in node.dependencies() {
                if let Some(&to) = indices.get(&dep.package_id) {
                    graph.update_edge(from, to, ());
                }
            }
        }
        Self { graph, indices }
    }

    pub fn contains(&self, package_id: &PackageId) -> bool {
        self.indices.contains_key(package_id)
    }

    /// Packages `package_id` depends on, directly or transitively.
    pub fn closure_of(&self, package_id: &PackageId) -> BTreeSet<PackageId> {
        let mut closure = BTreeSet::new();
        let Some(&start) = self.indices.get(package_id) else {
            return closure;
        };
        let mut dfs = Dfs::new(&self.graph, start);
        while let Some(ix) = dfs.next(&self.graph) {
            if ix != start {
                closure.insert(self.graph[ix].clone());
            }
        }
        closure
    }

    /// Packages that declare `package_id` in their own site.
    pub fn direct_dependents(&self, package_id: &PackageId) -> BTreeSet<PackageId> {
        let Some(&ix) = self.indices.get(package_id) else {
            return BTreeSet::new();
        };
        self.graph
            .neighbors_directed(ix, Direction::Incoming)
            .map(|n| self.graph[n].clone())
            .collect()
    }

    /// Those of `roots` (other than `package_id` itself) whose closure
    /// contains `package_id`.
    pub fn dependents_among<'a>(
        &self,
        package_id: &PackageId,
        roots: impl IntoIterator<Item = &'a PackageId>,
    ) -> Vec<PackageId> {
        let Some(&target) = self.indices.get(package_id) else {
            return Vec::new();
        };
        roots
            .into_iter()
            .filter(|root| *root != package_id)
            .filter(|root| {
                self.indices
                    .get(*root)
                    .is_some_and(|&from| has_path_connecting(&self.graph, from, target, None))
            })
            .cloned()
            .collect()
    }

    /// Indented tree below `roots`. A package already printed is shown
    /// again with `(*)` and not expanded.
    pub fn render_tree<'a>(
        &self,
        resolved: &ResolvedMap,
        roots: impl IntoIterator<Item = &'a PackageId>,
    ) -> String {
        let mut out = String::new();
        let mut printed = BTreeSet::new();
        for root in roots {
            self.render_node(resolved, root, 0, &mut printed, &mut out);
        }
        out
    }

    fn render_node(
        &self,
        resolved: &ResolvedMap,
        package_id: &PackageId,
        depth: usize,
        printed: &mut BTreeSet<PackageId>,
        out: &mut String,
    ) {
        let Some(node) = resolved.get(package_id) else {
            return;
        };
        let indent = "    ".repeat(depth);
        if !printed.insert(package_id.clone()) {
            out.push_str(&format!("{}{} (*)\n", indent, node.label()));
            return;
        }
        let hostless = if node.hostless { " [hostless]" } else { "" };
        out.push_str(&format!("{}{}{}\n", indent, node.label(), hostless));
        for dep in node.dependencies() {
            self.render_node(resolved, &dep.package_id, depth + 1, printed, out);
        }
    }
}

#[cfg(test)]
mod tests;
