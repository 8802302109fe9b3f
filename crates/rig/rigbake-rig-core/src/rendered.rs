//! Output of the static rig renderer.
//!
//! Model bodies ([`RenderedModel`], [`VariantOverride`]) serialize directly to item-model
//! JSON; everything else is metadata consumed by the animation renderer and exporter.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

use rigbake_math_core::{Gimbals, Vector};

use crate::bone::{Bone, NodeKind};
use crate::capability::Axis;
use crate::resource::ResourceLocation;
use crate::scene::FaceDirection;

/// Host length units per block.
pub const UNITS_PER_BLOCK: f64 = 16.0;

#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct BoundingBox {
    pub min: Vector,
    pub max: Vector,
}

impl BoundingBox {
    pub fn around(point: Vector) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    pub fn expand(&mut self, point: Vector) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    pub fn size(&self) -> Vector {
        self.max.sub(self.min)
    }

    pub fn max_extent(&self) -> f64 {
        self.size().max_element()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ElementRotation {
    pub angle: f64,
    pub axis: Axis,
    pub origin: Vector,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RenderedFace {
    /// `[u1, v1, u2, v2]` on the 0..16 model UV grid.
    pub uv: [f64; 4],
    /// Texture key, `#<texture id>`.
    pub texture: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cullface: Option<FaceDirection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tintindex: Option<i32>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RenderedElement {
    pub from: Vector,
    pub to: Vector,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<ElementRotation>,
    pub faces: IndexMap<FaceDirection, RenderedFace>,
}

impl RenderedElement {
    /// Rescale around the bone origin and move it to `center`.
    pub(crate) fn remap(&mut self, scale: f64, center: f64) {
        let map = |v: Vector| v.multiply(scale).add(Vector::splat(center));
        self.from = map(self.from);
        self.to = map(self.to);
        if let Some(rotation) = self.rotation.as_mut() {
            rotation.origin = map(rotation.origin);
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DisplayTransform {
    pub rotation: [f64; 3],
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ModelDisplay {
    pub head: DisplayTransform,
}

impl Default for ModelDisplay {
    fn default() -> Self {
        Self {
            head: DisplayTransform {
                rotation: [0.0, 180.0, 0.0],
            },
        }
    }
}

/// Item-model JSON body of one bone.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RenderedModel {
    /// Texture key (without `#`) to texture location.
    pub textures: IndexMap<String, ResourceLocation>,
    pub elements: Vec<RenderedElement>,
    #[serde(default)]
    pub display: ModelDisplay,
    /// Texture key to texture UUID, for variant remapping.
    #[serde(skip)]
    pub texture_uuids: IndexMap<String, Uuid>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RenderedBone {
    pub uuid: Uuid,
    pub name: String,
    pub parent: Option<Uuid>,
    pub resource_location: ResourceLocation,
    pub model_path: PathBuf,
    /// Bone-relative bounds before rescaling.
    pub bounding_box: BoundingBox,
    /// Inverse of the normalization factor applied to the model; the display entity is
    /// scaled up by this much.
    pub scale: f64,
    #[serde(default)]
    pub custom_model_data: Option<u32>,
}

/// Variant model: inherits the base geometry and swaps textures.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct VariantOverride {
    pub parent: ResourceLocation,
    pub textures: IndexMap<String, ResourceLocation>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct VariantBoneModel {
    pub bone: Uuid,
    pub model: VariantOverride,
    pub resource_location: ResourceLocation,
    pub model_path: PathBuf,
    #[serde(default)]
    pub custom_model_data: Option<u32>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RenderedVariant {
    pub uuid: Uuid,
    pub name: String,
    pub models: IndexMap<Uuid, VariantBoneModel>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct BoneStructure {
    pub uuid: Uuid,
    pub children: Vec<BoneStructure>,
}

/// Locator or camera carried through to animation frames.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RenderedNode {
    pub uuid: Uuid,
    pub name: String,
    pub kind: NodeKind,
    pub parent: Option<Uuid>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RenderedTexture {
    pub uuid: Uuid,
    pub id: String,
    pub name: String,
    pub resource_location: ResourceLocation,
    pub path: PathBuf,
}

/// World transform of one node, in blocks, ready for a display entity.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct NodeTransform {
    pub uuid: Uuid,
    pub name: String,
    pub kind: NodeKind,
    /// Row-major 4x4, translation in `m[3]`, `m[7]`, `m[11]`.
    pub matrix: [f64; 16],
    pub pos: Vector,
    pub rot: Gimbals,
    pub scale: Vector,
}

impl NodeTransform {
    /// `bone` must already be global. `rig_scale` is the bone's inverse model scale (1 for
    /// locators and cameras).
    pub fn from_global(bone: &Bone, rig_scale: f64) -> Self {
        let pos = bone.origin.divide(UNITS_PER_BLOCK);
        let matrix = bone.matrix().multiply_scalar(rig_scale);
        Self {
            uuid: bone.id,
            name: bone.name.clone(),
            kind: bone.kind,
            matrix: matrix.to_row_major_4x4(pos),
            pos,
            rot: bone.rot(),
            scale: bone.scale().multiply(rig_scale),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct RenderedRig {
    pub models: IndexMap<Uuid, RenderedModel>,
    pub variant_models: IndexMap<String, RenderedVariant>,
    pub bone_map: IndexMap<Uuid, RenderedBone>,
    pub bone_structure: Vec<BoneStructure>,
    pub textures: IndexMap<Uuid, RenderedTexture>,
    pub locators: IndexMap<Uuid, RenderedNode>,
    pub cameras: IndexMap<Uuid, RenderedNode>,
    pub default_pose: Vec<NodeTransform>,
    pub model_folder: PathBuf,
    pub texture_folder: PathBuf,
}

impl RenderedRig {
    pub fn bone_by_name(&self, name: &str) -> Option<&RenderedBone> {
        self.bone_map.values().find(|b| b.name == name)
    }

    /// Inverse model scale for `uuid`, if it is a rendered bone.
    pub fn bone_scale(&self, uuid: &Uuid) -> Option<f64> {
        self.bone_map.get(uuid).map(|b| b.scale)
    }

    /// Whether frames carry a transform for `uuid`.
    pub fn is_animated_node(&self, uuid: &Uuid) -> bool {
        self.bone_map.contains_key(uuid)
            || self.locators.contains_key(uuid)
            || self.cameras.contains_key(uuid)
    }

    /// Frame transform for a global bone, or `None` when the node is not part of the rig.
    pub fn node_transform(&self, bone: &Bone) -> Option<NodeTransform> {
        match bone.kind {
            NodeKind::Bone => self
                .bone_scale(&bone.id)
                .map(|scale| NodeTransform::from_global(bone, scale)),
            NodeKind::Locator | NodeKind::Camera => self
                .is_animated_node(&bone.id)
                .then(|| NodeTransform::from_global(bone, 1.0)),
        }
    }
}
