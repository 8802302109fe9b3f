//! The seam between the sampling loop and whatever poses the scene.

use indexmap::IndexMap;
use log::trace;
use uuid::Uuid;

use rigbake_math_core::{Gimbals, Vector};
use rigbake_rig_core::{build_pose_tree, Bone, PoseOffset, SceneGraph};

use crate::data::AnimationSpec;
use crate::error::AnimationError;
use crate::sampling::sample_keyframes;

/// World-space bones keyed by node UUID, in depth-first scene order.
pub type PoseMap = IndexMap<Uuid, Bone>;

/// Poses a rig at a given animation time.
///
/// A bake calls [`begin_pass`](Self::begin_pass) once, then `evaluate` for every sampled
/// tick of every animation, then [`end_pass`](Self::end_pass), even when a step failed.
pub trait PoseEvaluator {
    /// Remember whatever state the pass is about to disturb.
    fn begin_pass(&mut self) {}

    /// Global transforms of every exported bone, locator and camera at `time` seconds.
    fn evaluate(&mut self, animation: &AnimationSpec, time: f64)
        -> Result<PoseMap, AnimationError>;

    /// Restore the state saved by `begin_pass`.
    fn end_pass(&mut self) {}
}

/// Headless evaluator: samples keyframes directly and rebuilds the bone tree per call.
#[derive(Debug)]
pub struct KeyframePoseEvaluator<'a> {
    scene: &'a SceneGraph,
    cursor: Option<(Uuid, f64)>,
    saved: Option<Option<(Uuid, f64)>>,
}

impl<'a> KeyframePoseEvaluator<'a> {
    pub fn new(scene: &'a SceneGraph) -> Self {
        Self {
            scene,
            cursor: None,
            saved: None,
        }
    }

    /// Start with a preselected animation and time, as a host would.
    pub fn with_cursor(mut self, animation: Uuid, time: f64) -> Self {
        self.cursor = Some((animation, time));
        self
    }

    /// Animation and time of the last evaluation (or the restored selection).
    pub fn cursor(&self) -> Option<(Uuid, f64)> {
        self.cursor
    }
}

fn offset_at(animation: &AnimationSpec, node: &Uuid, time: f64) -> PoseOffset {
    let Some(animator) = animation.animators.get(node) else {
        return PoseOffset::default();
    };
    PoseOffset {
        position: sample_keyframes(&animator.position, time).unwrap_or(Vector::ZERO),
        rotation: sample_keyframes(&animator.rotation, time)
            .map(Gimbals::from)
            .unwrap_or(Gimbals::ZERO),
        scale: sample_keyframes(&animator.scale, time).unwrap_or(Vector::ONE),
    }
}

impl PoseEvaluator for KeyframePoseEvaluator<'_> {
    fn begin_pass(&mut self) {
        self.saved = Some(self.cursor);
    }

    fn evaluate(
        &mut self,
        animation: &AnimationSpec,
        time: f64,
    ) -> Result<PoseMap, AnimationError> {
        self.cursor = Some((animation.uuid, time));
        let root = build_pose_tree(self.scene, |node| offset_at(animation, node, time));
        let pose: PoseMap = root
            .export_root()
            .into_iter()
            .map(|bone| (bone.id, bone))
            .collect();
        trace!("posed '{}' at {time:.2}s: {} nodes", animation.name, pose.len());
        Ok(pose)
    }

    fn end_pass(&mut self) {
        if let Some(saved) = self.saved.take() {
            self.cursor = saved;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene() -> SceneGraph {
        SceneGraph::from_json_str(
            r#"{ "nodes": [
                { "type": "bone", "uuid": "00000000-0000-0000-0000-000000000001",
                  "name": "arm", "origin": [0, 16, 0],
                  "children": [
                    { "type": "locator", "uuid": "00000000-0000-0000-0000-000000000002",
                      "name": "hand", "position": [0, 16, 8] } ] } ] }"#,
        )
        .unwrap()
    }

    fn swing() -> AnimationSpec {
        AnimationSpec::from_json_str(
            r#"{ "uuid": "00000000-0000-0000-0000-000000000010", "name": "swing", "length": 1,
                 "animators": { "00000000-0000-0000-0000-000000000001": {
                     "rotation": [ { "time": 0, "value": [0, 0, 0] },
                                   { "time": 1, "value": [90, 0, 0] } ] } } }"#,
        )
        .unwrap()
    }

    #[test]
    fn rotation_keyframes_move_children() {
        let scene = scene();
        let mut eval = KeyframePoseEvaluator::new(&scene);
        let rest = eval.evaluate(&swing(), 0.0).unwrap();
        let hand = &rest[&Uuid::from_u128(2)];
        assert!(hand.origin.approx_eq(&Vector::new(0.0, 16.0, 8.0), 1e-9));

        let posed = eval.evaluate(&swing(), 1.0).unwrap();
        let arm = &posed[&Uuid::from_u128(1)];
        assert!((arm.rot().x - 90.0).abs() < 1e-9);
        let hand = &posed[&Uuid::from_u128(2)];
        // Local +Z swings onto -Y about X.
        assert!(hand.origin.approx_eq(&Vector::new(0.0, 8.0, 0.0), 1e-9));
    }

    #[test]
    fn end_pass_restores_the_cursor() {
        let scene = scene();
        let selected = Uuid::from_u128(99);
        let mut eval = KeyframePoseEvaluator::new(&scene).with_cursor(selected, 0.4);
        eval.begin_pass();
        eval.evaluate(&swing(), 0.5).unwrap();
        assert_eq!(eval.cursor(), Some((Uuid::from_u128(0x10), 0.5)));
        eval.end_pass();
        assert_eq!(eval.cursor(), Some((selected, 0.4)));
    }
}
