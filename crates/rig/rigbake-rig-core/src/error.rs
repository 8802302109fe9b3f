//! Error types for rig rendering.

use uuid::Uuid;

/// Everything that aborts a rig render. All variants are fatal for the export that
/// triggered them; non-fatal rotation problems are reported as
/// [`RotationWarning`](crate::capability::RotationWarning) instead.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum RigError {
    /// Export path could not be turned into a namespaced resource location
    #[error("Invalid export path for '{owner}': {path}")]
    InvalidResourcePath { owner: String, path: String },

    /// A resource location string failed to parse
    #[error("Invalid resource location '{location}': {reason}")]
    InvalidResourceLocation { location: String, reason: String },

    /// A face or variant references a texture the scene does not define
    #[error("Texture {texture} referenced by {referrer} is missing")]
    MissingTexture { referrer: String, texture: Uuid },

    /// Two exported bones would write the same model file
    #[error("Duplicate bone name '{name}'")]
    DuplicateBoneName { name: String },

    /// A locator or camera shares its name with another exported node
    #[error("Duplicate {kind} name '{name}'")]
    DuplicateNodeName { name: String, kind: String },

    /// The same UUID appears on more than one scene node
    #[error("Duplicate node uuid {uuid}")]
    DuplicateNode { uuid: Uuid },

    /// A cube rotation the target version cannot load
    #[error("Unsupported rotation on cube '{cube}' in bone '{bone}': {detail}")]
    InvalidRotation {
        bone: String,
        cube: String,
        detail: String,
    },

    /// A variant references a bone that does not exist
    #[error("Variant '{variant}' references unknown bone {bone}")]
    UnknownVariantBone { variant: String, bone: Uuid },

    /// Serialization error
    #[error("Serialization error: {reason}")]
    Serialization { reason: String },
}

impl RigError {
    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidResourcePath { .. } | Self::InvalidResourceLocation { .. } => "path",
            Self::MissingTexture { .. }
            | Self::DuplicateNode { .. }
            | Self::UnknownVariantBone { .. } => "reference",
            Self::DuplicateBoneName { .. }
            | Self::DuplicateNodeName { .. }
            | Self::InvalidRotation { .. } => "validation",
            Self::Serialization { .. } => "serialization",
        }
    }
}

impl From<serde_json::Error> for RigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            reason: err.to_string(),
        }
    }
}
