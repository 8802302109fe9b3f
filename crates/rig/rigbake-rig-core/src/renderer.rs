//! Static rig renderer: one pass over the rest-pose scene producing per-bone models.

use hashbrown::{HashMap, HashSet};
use indexmap::IndexMap;
use log::{debug, info, warn};
use uuid::Uuid;

use rigbake_math_core::Vector;

use crate::bone::NodeKind;
use crate::capability::{check_rotation, escalate, Capabilities, RotationWarning};
use crate::config::RenderConfig;
use crate::error::RigError;
use crate::hierarchy::build_rest_tree;
use crate::layout::ExportLayout;
use crate::rendered::{
    BoneStructure, BoundingBox, ElementRotation, ModelDisplay, RenderedBone, RenderedElement,
    RenderedFace, RenderedModel, RenderedNode, RenderedRig, RenderedTexture, RenderedVariant,
    VariantBoneModel, VariantOverride,
};
use crate::scene::{CubeNode, GroupNode, SceneGraph, SceneNode, Texture};

/// A rendered rig plus the non-fatal problems found while rendering it.
#[derive(Clone, Debug)]
pub struct RenderOutput {
    pub rig: RenderedRig,
    pub warnings: Vec<RotationWarning>,
}

struct RigRenderer<'a> {
    scene: &'a SceneGraph,
    layout: &'a ExportLayout,
    config: &'a RenderConfig,
    caps: Capabilities,
    rig: RenderedRig,
    warnings: Vec<RotationWarning>,
    /// Names of every bone, locator and camera seen so far. Frames are keyed by name.
    node_names: HashSet<String>,
}

/// Render every exported bone of `scene` into item models.
///
/// Fails on the first unresolvable reference or unparsable path. Rotation problems are
/// collected as warnings. They only fail the render when `config.strict_rotations` is set,
/// or when `config.enforce_target_rotations` is set and the target version rejects them.
pub fn render_rig(
    scene: &SceneGraph,
    layout: &ExportLayout,
    config: &RenderConfig,
) -> Result<RenderOutput, RigError> {
    scene.validate()?;

    let mut renderer = RigRenderer {
        scene,
        layout,
        config,
        caps: config.target_version.capabilities(),
        rig: RenderedRig {
            model_folder: layout.model_folder(),
            texture_folder: layout.texture_folder(),
            ..RenderedRig::default()
        },
        warnings: Vec::new(),
        node_names: HashSet::new(),
    };

    let mut structure = Vec::new();
    for node in &scene.nodes {
        if let Some(s) = renderer.render_node(node, None)? {
            structure.push(s);
        }
    }
    renderer.rig.bone_structure = structure;

    renderer.render_variants()?;
    renderer.render_default_pose();

    let RigRenderer { rig, warnings, .. } = renderer;
    let warnings = escalate(warnings, config.rotation_issues_fatal())?;
    info!(
        "rendered rig '{}': {} bone models, {} variants, {} warnings",
        layout.project_name,
        rig.bone_map.len(),
        rig.variant_models.len(),
        warnings.len()
    );
    Ok(RenderOutput { rig, warnings })
}

impl<'a> RigRenderer<'a> {
    fn render_node(
        &mut self,
        node: &'a SceneNode,
        parent: Option<Uuid>,
    ) -> Result<Option<BoneStructure>, RigError> {
        if !node.export() {
            debug!("skipping non-exported node '{}'", node.name());
            return Ok(None);
        }
        match node {
            SceneNode::Bone(group) => self.render_group(group, parent).map(Some),
            SceneNode::Locator(locator) => {
                self.claim_name(&locator.name, NodeKind::Locator)?;
                self.rig.locators.insert(
                    locator.uuid,
                    RenderedNode {
                        uuid: locator.uuid,
                        name: locator.name.clone(),
                        kind: NodeKind::Locator,
                        parent,
                    },
                );
                Ok(None)
            }
            SceneNode::Camera(camera) => {
                self.claim_name(&camera.name, NodeKind::Camera)?;
                self.rig.cameras.insert(
                    camera.uuid,
                    RenderedNode {
                        uuid: camera.uuid,
                        name: camera.name.clone(),
                        kind: NodeKind::Camera,
                        parent,
                    },
                );
                Ok(None)
            }
            SceneNode::Cube(cube) => {
                if parent.is_none() {
                    debug!("cube '{}' has no owning bone, not rendered", cube.name);
                }
                Ok(None)
            }
        }
    }

    fn claim_name(&mut self, name: &str, kind: NodeKind) -> Result<(), RigError> {
        if self.node_names.insert(name.to_string()) {
            return Ok(());
        }
        Err(match kind {
            NodeKind::Bone => RigError::DuplicateBoneName {
                name: name.to_string(),
            },
            NodeKind::Locator | NodeKind::Camera => RigError::DuplicateNodeName {
                name: name.to_string(),
                kind: format!("{kind:?}").to_lowercase(),
            },
        })
    }

    fn render_group(
        &mut self,
        group: &'a GroupNode,
        parent: Option<Uuid>,
    ) -> Result<BoneStructure, RigError> {
        self.claim_name(&group.name, NodeKind::Bone)?;

        let mut elements = Vec::new();
        let mut texture_uuids: IndexMap<String, Uuid> = IndexMap::new();
        let mut bbox = BoundingBox::around(Vector::ZERO);
        for child in &group.children {
            if let SceneNode::Cube(cube) = child {
                if !cube.export {
                    continue;
                }
                if let Some(element) = self.render_cube(group, cube, &mut texture_uuids)? {
                    bbox.expand(element.from);
                    bbox.expand(element.to);
                    elements.push(element);
                }
            }
        }

        if elements.is_empty() {
            debug!("bone '{}' has no geometry, structure only", group.name);
        } else {
            self.insert_bone(group, parent, elements, texture_uuids, bbox)?;
        }

        let mut structure = BoneStructure {
            uuid: group.uuid,
            children: Vec::new(),
        };
        for child in &group.children {
            if let Some(s) = self.render_node(child, Some(group.uuid))? {
                structure.children.push(s);
            }
        }
        Ok(structure)
    }

    fn insert_bone(
        &mut self,
        group: &GroupNode,
        parent: Option<Uuid>,
        mut elements: Vec<RenderedElement>,
        texture_uuids: IndexMap<String, Uuid>,
        bbox: BoundingBox,
    ) -> Result<(), RigError> {
        let extent = bbox.max_extent();
        let scale = if extent > 0.0 {
            (self.config.model_size_budget / extent).min(1.0)
        } else {
            1.0
        };
        for element in &mut elements {
            element.remap(scale, self.config.model_center);
        }

        let mut textures = IndexMap::new();
        for (key, uuid) in &texture_uuids {
            let texture = self.register_texture(uuid, &group.name)?;
            textures.insert(key.clone(), texture.resource_location.clone());
        }

        let model_path = self.layout.bone_model_path(None, &group.name);
        let resource_location = self.layout.locate(&group.name, &model_path)?;
        self.rig.models.insert(
            group.uuid,
            RenderedModel {
                textures,
                elements,
                display: ModelDisplay::default(),
                texture_uuids,
            },
        );
        self.rig.bone_map.insert(
            group.uuid,
            RenderedBone {
                uuid: group.uuid,
                name: group.name.clone(),
                parent,
                resource_location,
                model_path,
                bounding_box: bbox,
                scale: 1.0 / scale,
                custom_model_data: None,
            },
        );
        Ok(())
    }

    /// Element in bone-relative units, or `None` when no face survives.
    fn render_cube(
        &mut self,
        group: &GroupNode,
        cube: &CubeNode,
        texture_uuids: &mut IndexMap<String, Uuid>,
    ) -> Result<Option<RenderedElement>, RigError> {
        let inflate = Vector::splat(cube.inflate);
        let from = cube.from.sub(inflate).sub(group.origin);
        let to = cube.to.add(inflate).sub(group.origin);

        let (pick, issues) = check_rotation(cube.rotation, &self.caps);
        for issue in issues {
            warn!("cube '{}' in bone '{}': {}", cube.name, group.name, issue);
            self.warnings.push(RotationWarning {
                cube: cube.uuid,
                cube_name: cube.name.clone(),
                bone_name: group.name.clone(),
                issue,
            });
        }
        let rotation = pick.map(|(axis, angle)| ElementRotation {
            angle,
            axis,
            origin: cube.origin.sub(group.origin),
        });

        let mut faces = IndexMap::new();
        for (dir, face) in &cube.faces {
            let Some(texture_uuid) = face.texture else {
                continue;
            };
            let texture = self.texture(&texture_uuid, || {
                format!("cube '{}' face {}", cube.name, dir.as_str())
            })?;
            let w = UV_GRID / f64::from(texture.width.max(1));
            let h = UV_GRID / f64::from(texture.height.max(1));
            texture_uuids.insert(texture.id.clone(), texture.uuid);
            faces.insert(
                *dir,
                RenderedFace {
                    uv: [face.uv[0] * w, face.uv[1] * h, face.uv[2] * w, face.uv[3] * h],
                    texture: format!("#{}", texture.id),
                    rotation: face.rotation,
                    cullface: face.cullface,
                    tintindex: face.tint,
                },
            );
        }

        if faces.is_empty() {
            debug!("cube '{}' has no textured faces, dropped", cube.name);
            return Ok(None);
        }
        Ok(Some(RenderedElement {
            from,
            to,
            rotation,
            faces,
        }))
    }

    fn texture(
        &self,
        uuid: &Uuid,
        referrer: impl FnOnce() -> String,
    ) -> Result<&'a Texture, RigError> {
        self.scene
            .texture(uuid)
            .ok_or_else(|| RigError::MissingTexture {
                referrer: referrer(),
                texture: *uuid,
            })
    }

    fn register_texture(
        &mut self,
        uuid: &Uuid,
        referrer: &str,
    ) -> Result<&RenderedTexture, RigError> {
        if !self.rig.textures.contains_key(uuid) {
            let texture = self.texture(uuid, || referrer.to_string())?;
            let path = self.layout.texture_path(texture.stem());
            let resource_location = self.layout.locate(&texture.name, &path)?;
            self.rig.textures.insert(
                *uuid,
                RenderedTexture {
                    uuid: *uuid,
                    id: texture.id.clone(),
                    name: texture.name.clone(),
                    resource_location,
                    path,
                },
            );
        }
        self.rig
            .textures
            .get(uuid)
            .ok_or_else(|| RigError::MissingTexture {
                referrer: referrer.to_string(),
                texture: *uuid,
            })
    }

    fn render_variants(&mut self) -> Result<(), RigError> {
        let scene = self.scene;
        for variant in &scene.variants {
            if variant.is_default {
                continue;
            }
            let mut models = IndexMap::new();
            let bones: Vec<(Uuid, String)> = self
                .rig
                .bone_map
                .values()
                .filter(|b| variant.affected_bones.admits(&b.uuid))
                .map(|b| (b.uuid, b.name.clone()))
                .collect();
            for (uuid, name) in bones {
                let (parent, keyed): (_, Vec<(String, Uuid)>) = {
                    let base = &self.rig.bone_map[&uuid];
                    let model = &self.rig.models[&uuid];
                    (
                        base.resource_location.clone(),
                        model
                            .texture_uuids
                            .iter()
                            .filter_map(|(key, from)| {
                                variant.texture_map.get(from).map(|to| (key.clone(), *to))
                            })
                            .collect(),
                    )
                };
                let mut textures = IndexMap::new();
                for (key, replacement) in keyed {
                    let referrer = format!("variant '{}'", variant.name);
                    let texture = self.register_texture(&replacement, &referrer)?;
                    textures.insert(key, texture.resource_location.clone());
                }
                let model_path = self.layout.bone_model_path(Some(&variant.name), &name);
                let resource_location = self.layout.locate(&variant.name, &model_path)?;
                models.insert(
                    uuid,
                    VariantBoneModel {
                        bone: uuid,
                        model: VariantOverride { parent, textures },
                        resource_location,
                        model_path,
                        custom_model_data: None,
                    },
                );
            }
            debug!(
                "variant '{}' overrides {} bone models",
                variant.name,
                models.len()
            );
            self.rig.variant_models.insert(
                variant.name.clone(),
                RenderedVariant {
                    uuid: variant.uuid,
                    name: variant.name.clone(),
                    models,
                },
            );
        }
        Ok(())
    }

    fn render_default_pose(&mut self) {
        let rest = build_rest_tree(self.scene).export_root();
        let pose: Vec<_> = rest
            .iter()
            .filter_map(|bone| self.rig.node_transform(bone))
            .collect();
        self.rig.default_pose = pose;
    }
}

const UV_GRID: f64 = 16.0;

/// Map of bone name to UUID for every rendered bone.
pub fn bone_names(rig: &RenderedRig) -> HashMap<String, Uuid> {
    rig.bone_map
        .values()
        .map(|b| (b.name.clone(), b.uuid))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::TargetVersion;

    fn layout() -> ExportLayout {
        ExportLayout::new("ns", "rig")
    }

    fn lenient() -> RenderConfig {
        RenderConfig {
            target_version: TargetVersion::V1_20_4,
            ..RenderConfig::default()
        }
    }

    const TEXTURE: &str = r#"{ "uuid": "00000000-0000-0000-0000-0000000000a1", "id": "0",
        "name": "skin.png", "width": 32, "height": 16 }"#;

    fn scene_with(children: &str) -> SceneGraph {
        SceneGraph::from_json_str(&format!(
            r#"{{ "textures": [{TEXTURE}],
                 "nodes": [ {{ "type": "bone", "uuid": "00000000-0000-0000-0000-000000000001",
                              "name": "body", "origin": [0, 0, 0],
                              "children": [{children}] }} ] }}"#
        ))
        .unwrap()
    }

    fn cube(uuid: u8, rotation: &str, faces: &str) -> String {
        format!(
            r#"{{ "type": "cube", "uuid": "00000000-0000-0000-0000-0000000000{uuid:02x}",
                 "name": "c{uuid}", "from": [0, 0, 0], "to": [4, 4, 4],
                 "rotation": {rotation}, "faces": {{ {faces} }} }}"#
        )
    }

    const NORTH: &str = r#""north": { "uv": [0, 0, 16, 8],
        "texture": "00000000-0000-0000-0000-0000000000a1", "tint": 1 }"#;

    #[test]
    fn uv_is_scaled_to_texture_resolution() {
        let scene = scene_with(&cube(2, "[0, 0, 0]", NORTH));
        let out = render_rig(&scene, &layout(), &lenient()).unwrap();
        let model = out.rig.models.values().next().unwrap();
        let face = &model.elements[0].faces[&crate::scene::FaceDirection::North];
        assert_eq!(face.uv, [0.0, 0.0, 8.0, 8.0]);
        assert_eq!(face.texture, "#0");
        assert_eq!(face.tintindex, Some(1));
        assert_eq!(model.textures["0"].to_string(), "ns:item/rig/skin");
    }

    #[test]
    fn untextured_cube_and_empty_bone_are_pruned() {
        let untextured = r#""up": { "uv": [0, 0, 1, 1] }"#;
        let scene = scene_with(&cube(2, "[0, 0, 0]", untextured));
        let out = render_rig(&scene, &layout(), &lenient()).unwrap();
        assert!(out.rig.bone_map.is_empty());
        assert_eq!(out.rig.bone_structure.len(), 1, "structure keeps the bone");
    }

    #[test]
    fn rotation_warnings_depend_on_target() {
        let scene = scene_with(&cube(2, "[0, 30, 0]", NORTH));
        let out = render_rig(&scene, &layout(), &lenient()).unwrap();
        assert_eq!(out.warnings.len(), 1);
        let rotation = out.rig.models.values().next().unwrap().elements[0]
            .rotation
            .clone()
            .unwrap();
        assert_eq!(rotation.angle, 30.0);

        let enforced = RenderConfig {
            target_version: TargetVersion::V1_21_4,
            enforce_target_rotations: true,
            ..RenderConfig::default()
        };
        let err = render_rig(&scene, &layout(), &enforced).unwrap_err();
        assert!(matches!(err, RigError::InvalidRotation { .. }));

        let strict = RenderConfig {
            strict_rotations: true,
            ..lenient()
        };
        assert!(render_rig(&scene, &layout(), &strict).is_err());
    }

    #[test]
    fn default_config_only_warns_about_rotations() {
        let scene = scene_with(&cube(2, "[0, 30, 0]", NORTH));
        let out = render_rig(&scene, &layout(), &RenderConfig::default()).unwrap();
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.warnings[0].bone_name, "body");
        assert_eq!(out.rig.bone_map.len(), 1);
    }

    #[test]
    fn duplicate_bone_names_are_fatal() {
        let twin = r#"{ "type": "bone", "uuid": "00000000-0000-0000-0000-000000000009",
                        "name": "body", "origin": [0, 0, 0] }"#;
        let scene = scene_with(twin);
        let err = render_rig(&scene, &layout(), &lenient()).unwrap_err();
        assert_eq!(
            err,
            RigError::DuplicateBoneName {
                name: "body".into()
            }
        );
    }

    #[test]
    fn locator_sharing_a_bone_name_is_fatal() {
        let locator = r#"{ "type": "locator", "uuid": "00000000-0000-0000-0000-000000000021",
                           "name": "body", "position": [0, 0, 0] }"#;
        let scene = scene_with(locator);
        let err = render_rig(&scene, &layout(), &lenient()).unwrap_err();
        assert_eq!(
            err,
            RigError::DuplicateNodeName {
                name: "body".into(),
                kind: "locator".into()
            }
        );
        assert_eq!(err.category(), "validation");
    }

    #[test]
    fn bone_name_lookup() {
        let scene = scene_with(&cube(2, "[0, 0, 0]", NORTH));
        let out = render_rig(&scene, &layout(), &lenient()).unwrap();
        let names = bone_names(&out.rig);
        assert_eq!(names["body"], Uuid::from_u128(1));
    }
}
