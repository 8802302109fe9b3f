use approx::assert_relative_eq;
use uuid::Uuid;

use rigbake_math_core::Vector;
use rigbake_rig_core::{
    render_rig, ExportLayout, FaceDirection, NodeKind, RenderConfig, RigError, SceneGraph,
};

fn scene(name: &str) -> SceneGraph {
    let json = rigbake_test_fixtures::scenes::json(name).expect("load scene fixture");
    SceneGraph::from_json_str(&json).expect("parse scene fixture")
}

fn id(n: u128) -> Uuid {
    Uuid::from_u128(n)
}

#[test]
fn oversized_bone_is_normalized_into_the_display_budget() {
    let layout = ExportLayout::new("ns", "block");
    let out = render_rig(&scene("big_cube"), &layout, &RenderConfig::default())
        .expect("render big_cube");
    let bone = out.rig.bone_by_name("block").expect("block bone");
    assert_relative_eq!(bone.scale, 2.0);

    let element = &out.rig.models[&bone.uuid].elements[0];
    assert_eq!(element.from, Vector::splat(8.0));
    assert_eq!(element.to, Vector::splat(32.0));
}

#[test]
fn dragon_renders_geometry_bones_only() {
    let layout = ExportLayout::new("ns", "dragon");
    let out = render_rig(&scene("dragon"), &layout, &RenderConfig::default())
        .expect("render dragon");
    let rig = &out.rig;
    assert!(out.warnings.is_empty(), "22.5 deg is an allowed angle");

    let names: Vec<&str> = rig.bone_map.values().map(|b| b.name.as_str()).collect();
    // spine has no cubes of its own; hidden is not exported
    assert_eq!(names, vec!["body", "head", "tail", "fin"]);

    // structure still lists the structural-only bone
    assert_eq!(rig.bone_structure.len(), 1);
    let body = &rig.bone_structure[0];
    assert_eq!(body.uuid, id(1));
    let child_ids: Vec<Uuid> = body.children.iter().map(|c| c.uuid).collect();
    assert_eq!(child_ids, vec![id(2), id(3), id(5)]);
    assert_eq!(body.children[2].children[0].uuid, id(6));

    let head = &rig.bone_map[&id(2)];
    assert_eq!(head.parent, Some(id(1)));
    assert_eq!(head.resource_location.to_string(), "ns:item/dragon/head");
    assert_eq!(
        head.model_path,
        std::path::PathBuf::from("assets/ns/models/item/dragon/head.json")
    );
    let fin = &rig.bone_map[&id(6)];
    assert_eq!(fin.parent, Some(id(5)), "parent is the nearest scene bone");
}

#[test]
fn torso_is_scaled_relative_to_the_body_origin() {
    let layout = ExportLayout::new("ns", "dragon");
    let out = render_rig(&scene("dragon"), &layout, &RenderConfig::default()).unwrap();
    let body = &out.rig.bone_map[&id(1)];
    // 32 units deep -> 24 / 32
    assert_relative_eq!(body.scale, 32.0 / 24.0);
    assert_eq!(body.bounding_box.max_extent(), 32.0);

    let torso = &out.rig.models[&id(1)].elements[0];
    assert!(torso.from.approx_eq(&Vector::new(2.0, 8.0, -4.0), 1e-12));
    assert!(torso.to.approx_eq(&Vector::new(14.0, 17.0, 20.0), 1e-12));

    // the untextured bottom face is dropped, UVs shrink to the 16 px grid
    assert_eq!(torso.faces.len(), 3);
    assert!(!torso.faces.contains_key(&FaceDirection::Down));
    let north = &torso.faces[&FaceDirection::North];
    assert_eq!(north.uv, [0.0, 0.0, 4.0, 3.0]);
    assert_eq!(torso.faces[&FaceDirection::Up].rotation, Some(90));
    assert_eq!(
        torso.faces[&FaceDirection::South].cullface,
        Some(FaceDirection::South)
    );
}

#[test]
fn inflate_and_rotation_origin_are_remapped() {
    let layout = ExportLayout::new("ns", "dragon");
    let out = render_rig(&scene("dragon"), &layout, &RenderConfig::default()).unwrap();

    let skull = &out.rig.models[&id(2)].elements[0];
    assert!(skull.from.approx_eq(&Vector::new(3.5, 3.5, 7.5), 1e-12));
    assert!(skull.to.approx_eq(&Vector::new(12.5, 12.5, 16.5), 1e-12));

    let tail = &out.rig.models[&id(3)].elements[0];
    let rotation = tail.rotation.as_ref().expect("tail rotation");
    assert_eq!(rotation.angle, 22.5);
    assert_eq!(rotation.origin, Vector::splat(8.0));
}

#[test]
fn non_default_variants_override_textures_only() {
    let layout = ExportLayout::new("ns", "dragon");
    let out = render_rig(&scene("dragon"), &layout, &RenderConfig::default()).unwrap();
    let rig = &out.rig;

    assert_eq!(rig.variant_models.len(), 1, "default variant has no overrides");
    let red = &rig.variant_models["red"];
    // tail is excluded from the variant
    let bones: Vec<Uuid> = red.models.keys().copied().collect();
    assert_eq!(bones, vec![id(1), id(2), id(6)]);

    let body = &red.models[&id(1)];
    assert_eq!(body.model.parent.to_string(), "ns:item/dragon/body");
    assert_eq!(body.model.textures["0"].to_string(), "ns:item/dragon/skin_red");
    assert_eq!(body.resource_location.to_string(), "ns:item/dragon/red/body");

    let json = serde_json::to_value(&body.model).unwrap();
    assert!(json.get("elements").is_none());
    assert!(rig.textures.contains_key(&Uuid::from_u128(0xa2)));
}

#[test]
fn default_pose_covers_bones_locators_and_cameras() {
    let layout = ExportLayout::new("ns", "dragon");
    let out = render_rig(&scene("dragon"), &layout, &RenderConfig::default()).unwrap();
    let rig = &out.rig;

    assert!(rig.locators.contains_key(&id(0x21)));
    assert_eq!(rig.locators[&id(0x21)].parent, Some(id(2)));
    assert!(rig.cameras.contains_key(&id(0x31)));

    let kinds: Vec<(String, NodeKind)> = rig
        .default_pose
        .iter()
        .map(|t| (t.name.clone(), t.kind))
        .collect();
    assert_eq!(
        kinds,
        vec![
            ("body".to_string(), NodeKind::Bone),
            ("head".to_string(), NodeKind::Bone),
            ("mouth".to_string(), NodeKind::Locator),
            ("tail".to_string(), NodeKind::Bone),
            ("fin".to_string(), NodeKind::Bone),
            ("follow_cam".to_string(), NodeKind::Camera),
        ]
    );

    let head = &rig.default_pose[1];
    assert!(head.pos.approx_eq(&Vector::new(0.0, 0.75, 1.0), 1e-12));
    let body = &rig.default_pose[0];
    assert_relative_eq!(body.matrix[0], 32.0 / 24.0, epsilon = 1e-12);
}

#[test]
fn uppercase_bone_name_cannot_be_exported() {
    let mut scene = scene("big_cube");
    if let rigbake_rig_core::SceneNode::Bone(group) = &mut scene.nodes[0] {
        group.name = "Big Block".into();
    }
    let layout = ExportLayout::new("ns", "block");
    let err = render_rig(&scene, &layout, &RenderConfig::default()).unwrap_err();
    match err {
        RigError::InvalidResourcePath { owner, .. } => assert_eq!(owner, "Big Block"),
        other => panic!("unexpected error {other:?}"),
    }
}
