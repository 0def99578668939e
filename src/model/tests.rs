use super::fixtures::*;
use super::*;

#[test]
fn test_importable_objects_lists_components_then_assets() {
    let mut site = Site::default();
    site.assets.push(asset("t1", ObjectKind::StyleToken));
    site.assets.push(asset("img", ObjectKind::ImageAsset));
    site.components.push(component("button"));

    let objects: Vec<_> = site
        .importable_objects()
        .map(|(id, kind)| (id.as_str().to_string(), kind))
        .collect();
    assert_eq!(
        objects,
        vec![
            ("button".to_string(), ObjectKind::Component),
            ("t1".to_string(), ObjectKind::StyleToken),
            ("img".to_string(), ObjectKind::ImageAsset),
        ]
    );
}

#[test]
fn test_instantiated_components_flattens_trees() {
    let mut page = component("page");
    page.instantiates = vec![ObjectId::from("a"), ObjectId::from("b")];
    let mut card = component("card");
    card.instantiates = vec![ObjectId::from("b")];
    let site = Site {
        components: vec![page, card],
        ..Site::default()
    };
    let ids: Vec<&str> = site.instantiated_components().map(|id| id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "b"]);
}

#[test]
fn test_node_label() {
    let n = node("icons", "3", vec![]);
    assert_eq!(n.label(), "icons@3");
    assert!(n.dependencies().is_empty());
}

#[test]
fn test_project_json_defaults() {
    let json = r#"{
        "project_id": "p1",
        "name": "Landing",
        "site": {
            "components": [{ "id": "c1", "name": "Hero", "root": "r1" }],
            "dependencies": [{
                "package_id": "pkg-a",
                "version": "4",
                "project_id": "p-a",
                "name": "Design System",
                "site": { "assets": [{ "id": "tok", "kind": "style_token", "name": "primary" }] }
            }]
        }
    }"#;
    let project: Project = serde_json::from_str(json).unwrap();
    assert!(project.package_id.is_none());
    assert_eq!(project.site.components[0].instantiates.len(), 0);
    let dep = &project.direct_dependencies()[0];
    assert_eq!(dep.package_id, PackageId::from("pkg-a"));
    assert!(!dep.hostless);
    assert_eq!(dep.site.assets[0].kind, ObjectKind::StyleToken);
}
