use super::*;
use crate::graph::build_dependency_map;
use crate::model::fixtures::*;
use crate::model::{ObjectKind, Site};

fn id(s: &str) -> ObjectId {
    ObjectId::from(s)
}

#[test]
fn test_every_transitive_object_has_exactly_one_owner() {
    let c = node("c", "1", vec![]);
    let b = node("b", "1", vec![c]);
    let a = node("a", "1", vec![b]);
    let resolved = build_dependency_map(&[a], None).unwrap();
    let index = OwnershipIndex::build(&resolved);

    assert_eq!(index.len(), 6);
    for pkg in ["a", "b", "c"] {
        let owner = index.owner_of(&ObjectId::new(format!("{}.comp", pkg))).unwrap();
        assert_eq!(owner.package_id.as_str(), pkg);
        assert_eq!(owner.kind, ObjectKind::Component);
        let token = index.owner_of(&ObjectId::new(format!("{}.token", pkg))).unwrap();
        assert_eq!(token.package_id.as_str(), pkg);
        assert_eq!(token.kind, ObjectKind::StyleToken);
    }
}

#[test]
fn test_project_objects_have_no_owner() {
    let proj = project("root", vec![node("a", "1", vec![])]);
    let resolved = build_dependency_map(proj.direct_dependencies(), None).unwrap();
    let index = OwnershipIndex::build(&resolved);
    assert!(index.owner_of(&id("root.own")).is_none());
    assert!(index.site_of_component(&id("root.own")).is_none());
}

#[test]
fn test_component_site_and_root_tracking() {
    let resolved = build_dependency_map(&[node("a", "1", vec![])], None).unwrap();
    let index = OwnershipIndex::build(&resolved);
    assert_eq!(
        index.site_of_component(&id("a.comp")),
        Some(&PackageId::from("a"))
    );
    assert!(index.is_tracked_root(&id("a.comp-root")));
    assert!(!index.is_tracked_root(&id("a.token")));
}

#[test]
fn test_rebuild_discards_stale_associations() {
    let b = node("b", "1", vec![node("grandchild", "1", vec![])]);
    let mut index = OwnershipIndex::build(&build_dependency_map(&[b], None).unwrap());
    assert!(index.owner_of(&id("grandchild.comp")).is_some());

    index.rebuild(&build_dependency_map(&[node("other", "1", vec![])], None).unwrap());
    assert!(index.owner_of(&id("grandchild.comp")).is_none());
    assert!(index.owner_of(&id("b.comp")).is_none());
    assert!(!index.is_tracked_root(&id("b.comp-root")));
    assert_eq!(index.len(), 2);
}

#[test]
fn test_objects_of_package() {
    let mut site = Site::default();
    site.assets.push(asset("theme", ObjectKind::Theme));
    site.assets.push(asset("hero.png", ObjectKind::ImageAsset));
    site.assets.push(asset("dark", ObjectKind::GlobalVariantGroup));
    site.assets.push(asset("shadow", ObjectKind::Mixin));
    let resolved = build_dependency_map(&[node_with_site("ds", "2", site)], None).unwrap();
    let index = OwnershipIndex::build(&resolved);

    let ds = PackageId::from("ds");
    let mut kinds: Vec<ObjectKind> = index.objects_of(&ds).map(|(_, k)| k).collect();
    kinds.sort();
    assert_eq!(
        kinds,
        vec![
            ObjectKind::Mixin,
            ObjectKind::Theme,
            ObjectKind::ImageAsset,
            ObjectKind::GlobalVariantGroup,
        ]
    );
}

#[test]
fn test_empty_graph_yields_empty_index() {
    let index = OwnershipIndex::build(&ResolvedMap::new());
    assert!(index.is_empty());
}

#[test]
#[cfg(debug_assertions)]
#[should_panic(expected = "claimed by both")]
fn test_object_claimed_by_two_packages_asserts() {
    let shared = || Site {
        components: vec![component("shared.comp")],
        ..Site::default()
    };
    let resolved = build_dependency_map(
        &[
            node_with_site("left", "1", shared()),
            node_with_site("right", "1", shared()),
        ],
        None,
    )
    .unwrap();
    OwnershipIndex::build(&resolved);
}
