//! Build a local [`Bone`] tree from the scene snapshot.

use uuid::Uuid;

use rigbake_math_core::{Gimbals, Vector};

use crate::bone::{Bone, NodeKind};
use crate::scene::{SceneGraph, SceneNode};

/// Animated deltas layered over a node's rest transform.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PoseOffset {
    /// Added to the rest position, in scene units.
    pub position: Vector,
    /// Added to the rest rotation, in degrees.
    pub rotation: Gimbals,
    /// Multiplied with the rest scale.
    pub scale: Vector,
}

impl Default for PoseOffset {
    fn default() -> Self {
        Self {
            position: Vector::ZERO,
            rotation: Gimbals::ZERO,
            scale: Vector::ONE,
        }
    }
}

/// Build the virtual root for `scene`, skipping non-exported subtrees and cubes.
///
/// `offset` is queried once per bone, locator and camera.
pub fn build_pose_tree<F>(scene: &SceneGraph, offset: F) -> Bone
where
    F: Fn(&Uuid) -> PoseOffset,
{
    let mut root = Bone::root();
    root.children = build_children(&scene.nodes, Vector::ZERO, &offset);
    root
}

/// The rest pose: every offset is neutral.
pub fn build_rest_tree(scene: &SceneGraph) -> Bone {
    build_pose_tree(scene, |_| PoseOffset::default())
}

fn build_children<F>(nodes: &[SceneNode], parent_origin: Vector, offset: &F) -> Vec<Bone>
where
    F: Fn(&Uuid) -> PoseOffset,
{
    let mut out = Vec::new();
    for node in nodes {
        if !node.export() {
            continue;
        }
        match node {
            SceneNode::Bone(group) => {
                let o = offset(&group.uuid);
                let mut bone = Bone::new(
                    group.uuid,
                    group.name.clone(),
                    NodeKind::Bone,
                    group.origin.sub(parent_origin).add(o.position),
                    group.rotation.add(o.rotation),
                    group.scale.scale(o.scale),
                );
                bone.children = build_children(&group.children, group.origin, offset);
                out.push(bone);
            }
            SceneNode::Locator(locator) => {
                let o = offset(&locator.uuid);
                out.push(Bone::new(
                    locator.uuid,
                    locator.name.clone(),
                    NodeKind::Locator,
                    locator.position.sub(parent_origin).add(o.position),
                    locator.rotation.add(o.rotation),
                    o.scale,
                ));
            }
            SceneNode::Camera(camera) => {
                let o = offset(&camera.uuid);
                out.push(Bone::new(
                    camera.uuid,
                    camera.name.clone(),
                    NodeKind::Camera,
                    camera.position.sub(parent_origin).add(o.position),
                    camera.rotation.add(o.rotation),
                    o.scale,
                ));
            }
            SceneNode::Cube(_) => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene() -> SceneGraph {
        SceneGraph::from_json_str(
            r#"{
            "nodes": [
                { "type": "bone", "uuid": "00000000-0000-0000-0000-000000000001", "name": "body",
                  "origin": [0, 8, 0],
                  "children": [
                    { "type": "bone", "uuid": "00000000-0000-0000-0000-000000000002",
                      "name": "head", "origin": [0, 16, 0] },
                    { "type": "bone", "uuid": "00000000-0000-0000-0000-000000000003",
                      "name": "hidden", "origin": [0, 0, 0], "export": false },
                    { "type": "camera", "uuid": "00000000-0000-0000-0000-000000000004",
                      "name": "eye", "position": [0, 20, 2] }
                  ] }
            ]
        }"#,
        )
        .unwrap()
    }

    #[test]
    fn local_origins_are_parent_relative() {
        let root = build_rest_tree(&scene());
        let body = &root.children[0];
        assert_eq!(body.origin, Vector::new(0.0, 8.0, 0.0));
        assert_eq!(body.children.len(), 2, "non-exported bone is skipped");
        assert_eq!(body.children[0].origin, Vector::new(0.0, 8.0, 0.0));
        assert_eq!(body.children[1].kind, NodeKind::Camera);
        assert_eq!(body.children[1].origin, Vector::new(0.0, 12.0, 2.0));
    }

    #[test]
    fn rest_tree_round_trips_absolute_positions() {
        let flat = build_rest_tree(&scene()).export_root();
        let head = flat.iter().find(|b| b.name == "head").unwrap();
        assert_eq!(head.origin, Vector::new(0.0, 16.0, 0.0));
    }

    #[test]
    fn offsets_are_layered_over_rest() {
        let body = Uuid::from_u128(1);
        let root = build_pose_tree(&scene(), |id| {
            if *id == body {
                PoseOffset {
                    position: Vector::new(0.0, 1.0, 0.0),
                    rotation: Gimbals::new(0.0, 45.0, 0.0),
                    scale: Vector::splat(2.0),
                }
            } else {
                PoseOffset::default()
            }
        });
        let b = &root.children[0];
        assert_eq!(b.origin, Vector::new(0.0, 9.0, 0.0));
        assert_eq!(b.rot(), Gimbals::new(0.0, 45.0, 0.0));
        assert_eq!(b.scale(), Vector::splat(2.0));
    }
}
