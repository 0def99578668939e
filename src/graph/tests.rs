use super::*;
use crate::model::fixtures::*;

fn ids(map: &ResolvedMap) -> Vec<&str> {
    map.keys().map(|id| id.as_str()).collect()
}

// ── build_dependency_map ───────────────────────────────────

#[test]
fn test_resolve_empty_roots() {
    let map = build_dependency_map(&[], None).unwrap();
    assert!(map.is_empty());
}

#[test]
fn test_resolve_includes_transitive_packages() {
    let c = node("c", "1", vec![]);
    let b = node("b", "1", vec![c]);
    let a = node("a", "1", vec![b]);
    let map = build_dependency_map(&[a], None).unwrap();
    assert_eq!(ids(&map), vec!["a", "b", "c"]);
}

#[test]
fn test_resolve_is_idempotent() {
    let b = node("b", "1", vec![]);
    let c = node("c", "2", vec![b.clone()]);
    let a = node("a", "1", vec![b, c]);
    let roots = vec![a];
    let first = build_dependency_map(&roots, None).unwrap();
    let second = build_dependency_map(&roots, None).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_resolve_diamond_yields_single_entry() {
    let b = node("b", "1", vec![]);
    let c = node("c", "1", vec![node("b", "1", vec![])]);
    let a = node("a", "1", vec![b, c]);
    let map = build_dependency_map(&[a], None).unwrap();
    assert_eq!(ids(&map), vec!["a", "b", "c"]);
    assert_eq!(map[&PackageId::from("b")].version.as_str(), "1");
}

#[test]
fn test_resolve_version_conflict_names_both_versions() {
    let a = node("a", "1", vec![node("b", "1", vec![])]);
    let c = node("c", "1", vec![node("b", "2", vec![])]);
    let err = build_dependency_map(&[a, c], None).unwrap_err();
    match &err {
        GraphError::VersionConflict {
            package_id,
            name,
            existing,
            incoming,
        } => {
            assert_eq!(package_id.as_str(), "b");
            assert_eq!(name, "b");
            assert_eq!(existing.as_str(), "1");
            assert_eq!(incoming.as_str(), "2");
        }
        other => panic!("expected VersionConflict, got {:?}", other),
    }
    assert!(err.to_string().contains("version 1 and version 2"));
}

#[test]
fn test_resolve_conflict_between_root_and_transitive() {
    let a = node("a", "1", vec![node("b", "1", vec![])]);
    let b2 = node("b", "2", vec![]);
    assert!(matches!(
        build_dependency_map(&[b2, a], None),
        Err(GraphError::VersionConflict { .. })
    ));
}

#[test]
fn test_resolve_detects_direct_self_dependency() {
    let x = node("x", "1", vec![node("p", "3", vec![])]);
    let err = build_dependency_map(&[x], Some(&PackageId::from("p"))).unwrap_err();
    assert_eq!(
        err,
        GraphError::CircularDependency {
            self_id: PackageId::from("p"),
            via: "x".to_string(),
        }
    );
}

#[test]
fn test_resolve_detects_indirect_self_dependency() {
    let y = node("y", "1", vec![node("p", "1", vec![])]);
    let x = node("x", "1", vec![y]);
    let err = build_dependency_map(&[x], Some(&PackageId::from("p"))).unwrap_err();
    assert!(matches!(
        err,
        GraphError::CircularDependency { ref via, .. } if via == "y"
    ));
}

#[test]
fn test_resolve_without_self_id_ignores_self_reference() {
    let x = node("x", "1", vec![node("p", "1", vec![])]);
    let map = build_dependency_map(&[x], None).unwrap();
    assert_eq!(ids(&map), vec!["p", "x"]);
}

#[test]
fn test_resolve_tolerates_package_cycle() {
    // b@1 embeds a@1 which embeds b@1 again; the second b is short-circuited.
    let inner_b = node("b", "1", vec![]);
    let a = node("a", "1", vec![node("b", "1", vec![node("a", "1", vec![inner_b])])]);
    let map = build_dependency_map(&[a], None).unwrap();
    assert_eq!(ids(&map), vec!["a", "b"]);
}

// ── cross_check ────────────────────────────────────────────

#[test]
fn test_cross_check_accepts_matching_overlap() {
    let local = build_dependency_map(&[node("a", "1", vec![node("b", "1", vec![])])], None).unwrap();
    let candidate = build_dependency_map(&[node("c", "1", vec![node("b", "1", vec![])])], None).unwrap();
    assert!(cross_check(&local, &candidate).is_ok());
}

#[test]
fn test_cross_check_rejects_differing_overlap() {
    let local = build_dependency_map(&[node("a", "1", vec![node("b", "1", vec![])])], None).unwrap();
    let candidate = build_dependency_map(&[node("c", "1", vec![node("b", "5", vec![])])], None).unwrap();
    let err = cross_check(&local, &candidate).unwrap_err();
    assert!(matches!(
        err,
        GraphError::VersionConflict { ref existing, ref incoming, .. }
            if existing.as_str() == "1" && incoming.as_str() == "5"
    ));
}

// ── DependencyGraph ────────────────────────────────────────

fn sample_graph() -> (ResolvedMap, DependencyGraph) {
    let shared = node("shared", "1", vec![]);
    let y = node("y", "1", vec![node("x", "1", vec![shared.clone()])]);
    let z = node("z", "1", vec![shared]);
    let map = build_dependency_map(&[y, z], None).unwrap();
    let graph = DependencyGraph::from_resolved(&map);
    (map, graph)
}

#[test]
fn test_graph_closure() {
    let (_, graph) = sample_graph();
    let closure: Vec<_> = graph
        .closure_of(&PackageId::from("y"))
        .into_iter()
        .map(|id| id.to_string())
        .collect();
    assert_eq!(closure, vec!["shared", "x"]);
    assert!(graph.closure_of(&PackageId::from("missing")).is_empty());
}

#[test]
fn test_graph_direct_dependents() {
    let (_, graph) = sample_graph();
    let dependents: Vec<_> = graph
        .direct_dependents(&PackageId::from("shared"))
        .into_iter()
        .map(|id| id.to_string())
        .collect();
    assert_eq!(dependents, vec!["x", "z"]);
}

#[test]
fn test_graph_dependents_among_roots() {
    let (_, graph) = sample_graph();
    let roots = [PackageId::from("x"), PackageId::from("y"), PackageId::from("z")];
    let dependents = graph.dependents_among(&PackageId::from("x"), roots.iter());
    assert_eq!(dependents, vec![PackageId::from("y")]);
    let none = graph.dependents_among(&PackageId::from("y"), roots.iter());
    assert!(none.is_empty());
}

#[test]
fn test_graph_render_tree_marks_repeats() {
    let (map, graph) = sample_graph();
    let roots = [PackageId::from("y"), PackageId::from("z")];
    let tree = graph.render_tree(&map, roots.iter());
    assert_eq!(
        tree,
        "y@1\n    x@1\n        shared@1\nz@1\n    shared@1 (*)\n"
    );
}
