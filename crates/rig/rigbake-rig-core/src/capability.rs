//! Target-version capability table for cube rotations.
//!
//! Item-model elements may only be rotated about one axis by one of a few discrete
//! angles. Whether breaking that rule stops the export or only produces a warning depends
//! on the target version, and is decided here instead of at each call site.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use rigbake_math_core::Gimbals;

use crate::error::RigError;

const DISCRETE_ANGLES: &[f64] = &[-45.0, -22.5, 0.0, 22.5, 45.0];

#[derive(Copy, Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum TargetVersion {
    #[serde(rename = "1.19.4")]
    V1_19_4,
    #[serde(rename = "1.20.4")]
    V1_20_4,
    #[default]
    #[serde(rename = "1.21.4")]
    V1_21_4,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Capabilities {
    pub allowed_angles: &'static [f64],
    pub multi_axis_rotation: bool,
    pub invalid_rotation_fatal: bool,
}

impl TargetVersion {
    pub fn capabilities(self) -> Capabilities {
        match self {
            TargetVersion::V1_19_4 | TargetVersion::V1_20_4 => Capabilities {
                allowed_angles: DISCRETE_ANGLES,
                multi_axis_rotation: false,
                invalid_rotation_fatal: false,
            },
            TargetVersion::V1_21_4 => Capabilities {
                allowed_angles: DISCRETE_ANGLES,
                multi_axis_rotation: false,
                invalid_rotation_fatal: true,
            },
        }
    }
}

#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RotationIssue {
    UnsupportedAngle { axis: Axis, angle: f64 },
    MultipleAxes { rotation: Gimbals },
}

impl std::fmt::Display for RotationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RotationIssue::UnsupportedAngle { axis, angle } => {
                write!(f, "angle {angle} about {axis:?} is not one of the allowed angles")
            }
            RotationIssue::MultipleAxes { rotation } => write!(
                f,
                "rotated about more than one axis ({}, {}, {})",
                rotation.x, rotation.y, rotation.z
            ),
        }
    }
}

/// Non-fatal rotation problem found while rendering a cube.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RotationWarning {
    pub cube: Uuid,
    pub cube_name: String,
    pub bone_name: String,
    pub issue: RotationIssue,
}

/// Pick the single rotation axis of a cube and check it against `caps`.
///
/// Returns the chosen `(axis, angle)` (`None` for an unrotated cube) plus any issues. With
/// several non-zero axes the largest magnitude wins.
pub fn check_rotation(
    rotation: Gimbals,
    caps: &Capabilities,
) -> (Option<(Axis, f64)>, Vec<RotationIssue>) {
    let axes = [
        (Axis::X, rotation.x),
        (Axis::Y, rotation.y),
        (Axis::Z, rotation.z),
    ];
    let nonzero: Vec<(Axis, f64)> = axes.into_iter().filter(|(_, a)| *a != 0.0).collect();
    let mut issues = Vec::new();
    if nonzero.is_empty() {
        return (None, issues);
    }
    if nonzero.len() > 1 && !caps.multi_axis_rotation {
        issues.push(RotationIssue::MultipleAxes { rotation });
    }
    let (axis, angle) = nonzero
        .iter()
        .copied()
        .fold(nonzero[0], |best, cur| if cur.1.abs() > best.1.abs() { cur } else { best });
    if !caps.allowed_angles.iter().any(|a| (a - angle).abs() < 1e-6) {
        issues.push(RotationIssue::UnsupportedAngle { axis, angle });
    }
    (Some((axis, angle)), issues)
}

/// Turn collected issues into warnings, or into an error when they are fatal.
pub fn escalate(
    warnings: Vec<RotationWarning>,
    fatal: bool,
) -> Result<Vec<RotationWarning>, RigError> {
    if fatal {
        if let Some(first) = warnings.first() {
            return Err(RigError::InvalidRotation {
                bone: first.bone_name.clone(),
                cube: first.cube_name.clone(),
                detail: first.issue.to_string(),
            });
        }
    }
    Ok(warnings)
}
