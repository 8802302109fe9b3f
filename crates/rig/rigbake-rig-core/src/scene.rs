//! Host scene-graph input model.
//!
//! The authoring tool owns the live scene; rigbake only needs a snapshot of it. These
//! types are that snapshot, deserializable from JSON so the core stays host-independent.
//! Node kinds form a closed union and every consumer matches them exhaustively.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use rigbake_math_core::{Gimbals, Vector};

use crate::error::RigError;

fn default_true() -> bool {
    true
}

fn default_scale() -> Vector {
    Vector::ONE
}

/// One node of the scene tree.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SceneNode {
    Bone(GroupNode),
    Cube(CubeNode),
    Locator(LocatorNode),
    Camera(CameraNode),
}

impl SceneNode {
    pub fn uuid(&self) -> Uuid {
        match self {
            SceneNode::Bone(n) => n.uuid,
            SceneNode::Cube(n) => n.uuid,
            SceneNode::Locator(n) => n.uuid,
            SceneNode::Camera(n) => n.uuid,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            SceneNode::Bone(n) => &n.name,
            SceneNode::Cube(n) => &n.name,
            SceneNode::Locator(n) => &n.name,
            SceneNode::Camera(n) => &n.name,
        }
    }

    pub fn export(&self) -> bool {
        match self {
            SceneNode::Bone(n) => n.export,
            SceneNode::Cube(n) => n.export,
            SceneNode::Locator(n) => n.export,
            SceneNode::Camera(n) => n.export,
        }
    }
}

/// A group: the authoring-side counterpart of a bone.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GroupNode {
    pub uuid: Uuid,
    pub name: String,
    #[serde(default = "default_true")]
    pub export: bool,
    #[serde(default = "default_true")]
    pub visibility: bool,
    /// Pivot point in absolute scene units.
    pub origin: Vector,
    #[serde(default)]
    pub rotation: Gimbals,
    #[serde(default = "default_scale")]
    pub scale: Vector,
    #[serde(default)]
    pub children: Vec<SceneNode>,
}

/// An axis-aligned cuboid with optional single-axis rotation about `origin`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CubeNode {
    pub uuid: Uuid,
    pub name: String,
    #[serde(default = "default_true")]
    pub export: bool,
    pub from: Vector,
    pub to: Vector,
    #[serde(default)]
    pub inflate: f64,
    #[serde(default)]
    pub origin: Vector,
    #[serde(default)]
    pub rotation: Gimbals,
    #[serde(default)]
    pub faces: IndexMap<FaceDirection, Face>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LocatorNode {
    pub uuid: Uuid,
    pub name: String,
    #[serde(default = "default_true")]
    pub export: bool,
    pub position: Vector,
    #[serde(default)]
    pub rotation: Gimbals,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CameraNode {
    pub uuid: Uuid,
    pub name: String,
    #[serde(default = "default_true")]
    pub export: bool,
    pub position: Vector,
    #[serde(default)]
    pub rotation: Gimbals,
}

#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum FaceDirection {
    North,
    East,
    South,
    West,
    Up,
    Down,
}

impl FaceDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            FaceDirection::North => "north",
            FaceDirection::East => "east",
            FaceDirection::South => "south",
            FaceDirection::West => "west",
            FaceDirection::Up => "up",
            FaceDirection::Down => "down",
        }
    }
}

/// One face of a cube. `uv` is `[u1, v1, u2, v2]` in texture pixels.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Face {
    pub uv: [f64; 4],
    #[serde(default)]
    pub texture: Option<Uuid>,
    #[serde(default)]
    pub rotation: Option<i32>,
    #[serde(default)]
    pub cullface: Option<FaceDirection>,
    #[serde(default)]
    pub tint: Option<i32>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Texture {
    pub uuid: Uuid,
    /// Project-local key used by faces in model JSON (`"#<id>"`).
    pub id: String,
    /// File name, with or without the `.png` extension.
    pub name: String,
    pub width: u32,
    pub height: u32,
}

impl Texture {
    /// File stem without extension.
    pub fn stem(&self) -> &str {
        self.name.strip_suffix(".png").unwrap_or(&self.name)
    }
}

/// How a list of bones restricts which bones something applies to.
#[derive(Copy, Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    /// Only listed bones.
    Include,
    /// Every bone except the listed ones.
    #[default]
    Exclude,
}

/// Bone whitelist/blacklist shared by variants and animations.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct NodeFilter {
    #[serde(default)]
    pub mode: FilterMode,
    #[serde(default)]
    pub bones: Vec<Uuid>,
}

impl NodeFilter {
    pub fn include(bones: Vec<Uuid>) -> Self {
        Self {
            mode: FilterMode::Include,
            bones,
        }
    }

    pub fn exclude(bones: Vec<Uuid>) -> Self {
        Self {
            mode: FilterMode::Exclude,
            bones,
        }
    }

    pub fn admits(&self, uuid: &Uuid) -> bool {
        let listed = self.bones.contains(uuid);
        match self.mode {
            FilterMode::Include => listed,
            FilterMode::Exclude => !listed,
        }
    }
}

/// A named alternate texture mapping.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Variant {
    pub uuid: Uuid,
    pub name: String,
    #[serde(default)]
    pub is_default: bool,
    /// Source texture -> replacement texture.
    #[serde(default)]
    pub texture_map: IndexMap<Uuid, Uuid>,
    #[serde(default)]
    pub affected_bones: NodeFilter,
}

/// Snapshot of the project: scene roots, textures and variants.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct SceneGraph {
    #[serde(default)]
    pub nodes: Vec<SceneNode>,
    #[serde(default)]
    pub textures: Vec<Texture>,
    #[serde(default)]
    pub variants: Vec<Variant>,
}

impl SceneGraph {
    pub fn from_json_str(s: &str) -> Result<Self, RigError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Depth-first pre-order walk over every node.
    pub fn walk(&self) -> Vec<&SceneNode> {
        fn visit<'a>(nodes: &'a [SceneNode], out: &mut Vec<&'a SceneNode>) {
            for node in nodes {
                out.push(node);
                if let SceneNode::Bone(group) = node {
                    visit(&group.children, out);
                }
            }
        }
        let mut out = Vec::new();
        visit(&self.nodes, &mut out);
        out
    }

    pub fn find_node(&self, uuid: &Uuid) -> Option<&SceneNode> {
        self.walk().into_iter().find(|n| n.uuid() == *uuid)
    }

    pub fn texture(&self, uuid: &Uuid) -> Option<&Texture> {
        self.textures.iter().find(|t| t.uuid == *uuid)
    }

    pub fn variant(&self, uuid: &Uuid) -> Option<&Variant> {
        self.variants.iter().find(|v| v.uuid == *uuid)
    }

    /// Reject duplicate UUIDs and dangling texture references.
    pub fn validate(&self) -> Result<(), RigError> {
        let mut seen = hashbrown::HashSet::new();
        for node in self.walk() {
            if !seen.insert(node.uuid()) {
                return Err(RigError::DuplicateNode { uuid: node.uuid() });
            }
            if let SceneNode::Cube(cube) = node {
                for (dir, face) in &cube.faces {
                    if let Some(texture) = face.texture {
                        if self.texture(&texture).is_none() {
                            return Err(RigError::MissingTexture {
                                referrer: format!("cube '{}' face {}", cube.name, dir.as_str()),
                                texture,
                            });
                        }
                    }
                }
            }
        }
        for variant in &self.variants {
            for (from, to) in &variant.texture_map {
                for texture in [from, to] {
                    if self.texture(texture).is_none() {
                        return Err(RigError::MissingTexture {
                            referrer: format!("variant '{}'", variant.name),
                            texture: *texture,
                        });
                    }
                }
            }
            for bone in &variant.affected_bones.bones {
                if !matches!(self.find_node(bone), Some(SceneNode::Bone(_))) {
                    return Err(RigError::UnknownVariantBone {
                        variant: variant.name.clone(),
                        bone: *bone,
                    });
                }
            }
        }
        Ok(())
    }
}
