//! Error types for animation baking

use rigbake_rig_core::RigError;
use uuid::Uuid;

/// Everything that aborts an animation bake. References are resolved before the first
/// frame is sampled, so a bake either produces every animation or none.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum AnimationError {
    /// The rig itself failed to render or resolve
    #[error(transparent)]
    Rig(#[from] RigError),

    /// Declared length is negative or not finite
    #[error("Animation '{animation}' has invalid length {length}")]
    InvalidLength { animation: String, length: f64 },

    /// An affected-bones entry or animator targets a node that is not in the scene
    #[error("Animation '{animation}' references unknown node {node}")]
    UnknownNode { animation: String, node: Uuid },

    /// A variant keyframe names a variant the scene does not define
    #[error("Animation '{animation}' switches to unknown variant {variant} at tick {tick}")]
    UnknownVariant {
        animation: String,
        variant: Uuid,
        tick: u32,
    },

    /// An animation-state keyframe triggers an animation that is not being baked
    #[error("Animation '{animation}' triggers unknown animation '{target}' at tick {tick}")]
    UnknownAnimation {
        animation: String,
        target: String,
        tick: u32,
    },

    /// Two keyframes on the same effect channel quantize to one tick
    #[error("Animation '{animation}' has more than one {channel} keyframe at tick {tick}")]
    DuplicateKeyframe {
        animation: String,
        channel: &'static str,
        tick: u32,
    },

    /// An effect keyframe is timed before the start or after the end of its animation
    #[error("Animation '{animation}' has a {channel} keyframe at {time}s outside 0..={length}s")]
    EffectOutOfRange {
        animation: String,
        channel: &'static str,
        time: f64,
        length: f64,
    },

    /// Two animations share a name
    #[error("Duplicate animation name '{name}'")]
    DuplicateAnimation { name: String },

    /// The pose evaluator failed at a specific time
    #[error("Evaluating '{animation}' at tick {tick} failed: {reason}")]
    Evaluation {
        animation: String,
        tick: u32,
        reason: String,
    },

    /// Serialization error
    #[error("Serialization error: {reason}")]
    Serialization { reason: String },
}

impl AnimationError {
    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::Rig(err) => err.category(),
            Self::UnknownNode { .. }
            | Self::UnknownVariant { .. }
            | Self::UnknownAnimation { .. } => "reference",
            Self::InvalidLength { .. }
            | Self::DuplicateKeyframe { .. }
            | Self::EffectOutOfRange { .. }
            | Self::DuplicateAnimation { .. } => "validation",
            Self::Evaluation { .. } => "evaluation",
            Self::Serialization { .. } => "serialization",
        }
    }
}

impl From<serde_json::Error> for AnimationError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rig_errors_keep_their_category() {
        let err: AnimationError = RigError::DuplicateBoneName { name: "arm".into() }.into();
        assert_eq!(err.category(), "validation");
        assert_eq!(err.to_string(), "Duplicate bone name 'arm'");
    }

    #[test]
    fn missing_references_name_the_tick() {
        let err = AnimationError::UnknownVariant {
            animation: "walk".into(),
            variant: Uuid::nil(),
            tick: 7,
        };
        assert!(err.to_string().contains("tick 7"));
        assert_eq!(err.category(), "reference");
    }
}
