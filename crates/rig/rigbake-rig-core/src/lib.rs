//! rigbake rig core (host-agnostic)
//!
//! Takes a snapshot of the authoring tool's scene graph and turns it into item models:
//! one model per bone with geometry, variant overrides, resource locations and the
//! metadata the animation baker and exporter need. The bone hierarchy in [`bone`] is the
//! numeric re-derivation of the scene's transform chain used for every sampled pose.

pub mod bone;
pub mod capability;
pub mod config;
pub mod custom_model_data;
pub mod error;
pub mod hierarchy;
pub mod layout;
pub mod rendered;
pub mod renderer;
pub mod resource;
pub mod scene;

// Re-exports for consumers
pub use bone::{Bone, NodeKind};
pub use capability::{Axis, Capabilities, RotationIssue, RotationWarning, TargetVersion};
pub use config::RenderConfig;
pub use custom_model_data::CustomModelDataAllocator;
pub use error::RigError;
pub use hierarchy::{build_pose_tree, build_rest_tree, PoseOffset};
pub use layout::ExportLayout;
pub use rendered::{
    BoneStructure, BoundingBox, NodeTransform, RenderedBone, RenderedModel, RenderedNode,
    RenderedRig, RenderedTexture, RenderedVariant, VariantBoneModel, VariantOverride,
    UNITS_PER_BLOCK,
};
pub use renderer::{bone_names, render_rig, RenderOutput};
pub use resource::ResourceLocation;
pub use scene::{
    CameraNode, CubeNode, Face, FaceDirection, FilterMode, GroupNode, LocatorNode, NodeFilter,
    SceneGraph, SceneNode, Texture, Variant,
};

pub type Result<T> = core::result::Result<T, RigError>;
