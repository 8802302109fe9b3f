//! Animation input model: a snapshot of the host's animations, deserializable from JSON.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use rigbake_math_core::Vector;
use rigbake_rig_core::NodeFilter;

use crate::error::AnimationError;

#[derive(Copy, Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LoopMode {
    Loop,
    #[default]
    Once,
    Hold,
}

#[derive(Copy, Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    #[default]
    Linear,
    Step,
    CatmullRom,
}

/// One transform keyframe. `time` is in seconds.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Keyframe {
    pub time: f64,
    pub value: Vector,
    #[serde(default)]
    pub interpolation: Interpolation,
}

/// Keyframe tracks of one node.
///
/// Position is an offset in host units, rotation is added (degrees) to the rest rotation
/// and scale multiplies the rest scale.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct NodeAnimator {
    #[serde(default)]
    pub position: Vec<Keyframe>,
    #[serde(default)]
    pub rotation: Vec<Keyframe>,
    #[serde(default)]
    pub scale: Vec<Keyframe>,
}

impl NodeAnimator {
    pub fn is_empty(&self) -> bool {
        self.position.is_empty() && self.rotation.is_empty() && self.scale.is_empty()
    }
}

/// Switch the rig's visual variant.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct VariantEffect {
    pub variant: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execute_condition: Option<String>,
}

/// Raw command text injected on a tick.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CommandsEffect {
    pub commands: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execute_condition: Option<String>,
}

/// Trigger another animation by name.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AnimationStateEffect {
    pub animation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execute_condition: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct EffectKeyframe<T> {
    pub time: f64,
    #[serde(flatten)]
    pub data: T,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Effects {
    #[serde(default)]
    pub variant: Vec<EffectKeyframe<VariantEffect>>,
    #[serde(default)]
    pub commands: Vec<EffectKeyframe<CommandsEffect>>,
    #[serde(default)]
    pub animation_state: Vec<EffectKeyframe<AnimationStateEffect>>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AnimationSpec {
    pub uuid: Uuid,
    pub name: String,
    /// Seconds.
    pub length: f64,
    #[serde(default)]
    pub loop_mode: LoopMode,
    /// Ticks to wait before looping again.
    #[serde(default)]
    pub loop_delay: u32,
    #[serde(default)]
    pub affected_bones: NodeFilter,
    #[serde(default)]
    pub animators: IndexMap<Uuid, NodeAnimator>,
    #[serde(default)]
    pub effects: Effects,
}

impl AnimationSpec {
    pub fn from_json_str(s: &str) -> Result<Self, AnimationError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Parse a JSON array of animations.
    pub fn list_from_json_str(s: &str) -> Result<Vec<Self>, AnimationError> {
        Ok(serde_json::from_str(s)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rigbake_rig_core::FilterMode;

    #[test]
    fn parses_minimal_animation_with_defaults() {
        let anim = AnimationSpec::from_json_str(
            r#"{ "uuid": "00000000-0000-0000-0000-000000000010", "name": "idle", "length": 2 }"#,
        )
        .unwrap();
        assert_eq!(anim.loop_mode, LoopMode::Once);
        assert_eq!(anim.affected_bones.mode, FilterMode::Exclude);
        assert!(anim.animators.is_empty());
        assert!(anim.effects.commands.is_empty());
    }

    #[test]
    fn effect_payload_is_flattened() {
        let json = r#"{ "time": 0.5, "commands": "say hi", "execute_condition": "if score" }"#;
        let key: EffectKeyframe<CommandsEffect> = serde_json::from_str(json).unwrap();
        assert_eq!(key.time, 0.5);
        assert_eq!(key.data.commands, "say hi");
        assert_eq!(key.data.execute_condition.as_deref(), Some("if score"));
    }
}
