//! Error types for project export.

use rigbake_animation_core::AnimationError;
use rigbake_rig_core::RigError;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ExportError {
    #[error(transparent)]
    Rig(#[from] RigError),

    #[error(transparent)]
    Animation(#[from] AnimationError),

    /// The user declined to overwrite a file this exporter did not write
    #[error("Export cancelled: '{path}' was not generated by rigbake")]
    Cancelled { path: String },

    /// Reading or writing a pack file failed
    #[error("I/O error at '{path}': {reason}")]
    Io { path: String, reason: String },

    #[error("Invalid export config: {reason}")]
    InvalidConfig { reason: String },

    /// An existing predicate file could not be parsed
    #[error("Corrupt predicate file '{path}': {reason}")]
    CorruptPredicateFile { path: String, reason: String },

    /// The serialization pool could not be built
    #[error("Worker pool error: {reason}")]
    WorkerPool { reason: String },

    #[error("Serialization error: {reason}")]
    Serialization { reason: String },
}

impl ExportError {
    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::Rig(err) => err.category(),
            Self::Animation(err) => err.category(),
            Self::Cancelled { .. } => "cancelled",
            Self::Io { .. } => "io",
            Self::InvalidConfig { .. } | Self::CorruptPredicateFile { .. } => "validation",
            Self::WorkerPool { .. } => "worker",
            Self::Serialization { .. } => "serialization",
        }
    }

    /// User-initiated aborts; callers report these without treating them as crashes.
    pub fn is_expected(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    pub(crate) fn io(path: &std::path::Path, err: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for ExportError {
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
    fn cancellation_is_expected() {
        let err = ExportError::Cancelled {
            path: "assets/minecraft/models/item/white_dye.json".into(),
        };
        assert!(err.is_expected());
        assert_eq!(err.category(), "cancelled");
        assert!(err.to_string().contains("white_dye.json"));
    }

    #[test]
    fn wrapped_errors_keep_their_category() {
        let err: ExportError = RigError::DuplicateBoneName { name: "arm".into() }.into();
        assert!(!err.is_expected());
        assert_eq!(err.category(), "validation");
        assert_eq!(err.to_string(), "Duplicate bone name 'arm'");
    }
}
