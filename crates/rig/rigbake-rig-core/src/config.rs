//! Rig rendering configuration.

use serde::{Deserialize, Serialize};

use crate::capability::TargetVersion;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    /// Game version the models are written for; selects the rotation rules.
    pub target_version: TargetVersion,
    /// Fail on rotation issues the target version itself rejects. Off by default, so
    /// rotation issues only produce warnings.
    pub enforce_target_rotations: bool,
    /// Treat every rotation issue as fatal regardless of the target version.
    pub strict_rotations: bool,
    /// Largest bone extent (model units) that fits without shrinking.
    pub model_size_budget: f64,
    /// Model-space coordinate the bone origin is moved to.
    pub model_center: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            target_version: TargetVersion::default(),
            enforce_target_rotations: false,
            strict_rotations: false,
            model_size_budget: 24.0,
            model_center: 8.0,
        }
    }
}

impl RenderConfig {
    pub fn rotation_issues_fatal(&self) -> bool {
        self.strict_rotations
            || (self.enforce_target_rotations
                && self.target_version.capabilities().invalid_rotation_fatal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_never_blocks_on_rotations() {
        let config = RenderConfig::default();
        assert_eq!(config.target_version, TargetVersion::V1_21_4);
        assert!(!config.rotation_issues_fatal());
    }

    #[test]
    fn fatality_is_opt_in() {
        let enforced = RenderConfig {
            enforce_target_rotations: true,
            ..RenderConfig::default()
        };
        assert!(enforced.rotation_issues_fatal());

        let older = RenderConfig {
            target_version: TargetVersion::V1_20_4,
            ..enforced.clone()
        };
        assert!(!older.rotation_issues_fatal());

        let strict = RenderConfig {
            strict_rotations: true,
            ..older
        };
        assert!(strict.rotation_issues_fatal());
    }

    #[test]
    fn missing_fields_take_defaults() {
        let config: RenderConfig =
            serde_json::from_str(r#"{ "enforce_target_rotations": true }"#).unwrap();
        assert!(config.enforce_target_rotations);
        assert!(!config.strict_rotations);
        assert_eq!(config.model_size_budget, 24.0);
    }
}
