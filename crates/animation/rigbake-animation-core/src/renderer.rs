//! Animation renderer: samples every animation on tick boundaries and records node
//! transforms plus effect events per frame.

use std::time::Duration;

use hashbrown::{HashMap, HashSet};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use rigbake_rig_core::{NodeKind, NodeTransform, RenderedRig, SceneGraph, SceneNode};

use crate::config::BakingConfig;
use crate::data::{AnimationSpec, EffectKeyframe, LoopMode};
use crate::error::AnimationError;
use crate::evaluator::PoseEvaluator;
use crate::progress::{Progress, ProgressObserver, RateLimiter};
use crate::tick::{frame_count, Tick};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct VariantEvent {
    pub variant: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execute_condition: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CommandsEvent {
    pub commands: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execute_condition: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AnimationStateEvent {
    pub animation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execute_condition: Option<String>,
}

/// One sampled tick. Absent events mean nothing happens on this tick.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AnimationFrame {
    pub tick: Tick,
    pub time: f64,
    pub nodes: Vec<NodeTransform>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<VariantEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commands: Option<CommandsEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation_state: Option<AnimationStateEvent>,
}

impl AnimationFrame {
    pub fn node(&self, uuid: &Uuid) -> Option<&NodeTransform> {
        self.nodes.iter().find(|n| n.uuid == *uuid)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RenderedAnimation {
    pub uuid: Uuid,
    pub name: String,
    pub frames: Vec<AnimationFrame>,
    /// Number of frames.
    pub duration: u32,
    pub loop_mode: LoopMode,
    pub loop_delay: u32,
    /// Rendered bones this animation drives.
    pub affected_bones: Vec<Uuid>,
}

/// Effect channels of one animation, keyed by tick.
struct ResolvedAnimation<'a> {
    spec: &'a AnimationSpec,
    affected: HashSet<Uuid>,
    variant: HashMap<Tick, VariantEvent>,
    commands: HashMap<Tick, CommandsEvent>,
    animation_state: HashMap<Tick, AnimationStateEvent>,
}

/// Index one effect channel by tick. Every keyframe must land on a sampled tick.
fn index_channel<'k, T, E>(
    anim: &AnimationSpec,
    channel: &'static str,
    keys: &'k [EffectKeyframe<T>],
    rate: u32,
    mut convert: impl FnMut(Tick, &'k T) -> Result<E, AnimationError>,
) -> Result<HashMap<Tick, E>, AnimationError> {
    let animation = anim.name.as_str();
    let frames = frame_count(anim.length, rate);
    let mut out = HashMap::with_capacity(keys.len());
    for key in keys {
        let tick = Tick::from_seconds(key.time, rate);
        if !key.time.is_finite() || key.time < 0.0 || tick.0 >= frames {
            return Err(AnimationError::EffectOutOfRange {
                animation: animation.to_string(),
                channel,
                time: key.time,
                length: anim.length,
            });
        }
        if out.contains_key(&tick) {
            return Err(AnimationError::DuplicateKeyframe {
                animation: animation.to_string(),
                channel,
                tick: tick.0,
            });
        }
        let event = convert(tick, &key.data)?;
        out.insert(tick, event);
    }
    Ok(out)
}

/// Check every bone, variant and animation reference before sampling anything.
fn resolve<'a>(
    scene: &SceneGraph,
    rig: &RenderedRig,
    animations: &'a [AnimationSpec],
    rate: u32,
) -> Result<Vec<ResolvedAnimation<'a>>, AnimationError> {
    let mut names = HashSet::new();
    for anim in animations {
        if !names.insert(anim.name.as_str()) {
            return Err(AnimationError::DuplicateAnimation {
                name: anim.name.clone(),
            });
        }
    }

    let nodes: HashMap<Uuid, &SceneNode> = scene
        .walk()
        .into_iter()
        .map(|n| (n.uuid(), n))
        .collect();

    let mut resolved = Vec::with_capacity(animations.len());
    for anim in animations {
        if !anim.length.is_finite() || anim.length < 0.0 {
            return Err(AnimationError::InvalidLength {
                animation: anim.name.clone(),
                length: anim.length,
            });
        }
        for bone in &anim.affected_bones.bones {
            if !matches!(nodes.get(bone), Some(SceneNode::Bone(_))) {
                return Err(AnimationError::UnknownNode {
                    animation: anim.name.clone(),
                    node: *bone,
                });
            }
        }
        for node in anim.animators.keys() {
            if !nodes.contains_key(node) {
                return Err(AnimationError::UnknownNode {
                    animation: anim.name.clone(),
                    node: *node,
                });
            }
        }

        let effects = &anim.effects;
        let variant = index_channel(anim, "variant", &effects.variant, rate, |tick, e| {
            let v = scene
                .variant(&e.variant)
                .ok_or_else(|| AnimationError::UnknownVariant {
                    animation: anim.name.clone(),
                    variant: e.variant,
                    tick: tick.0,
                })?;
            Ok(VariantEvent {
                variant: v.uuid,
                name: v.name.clone(),
                execute_condition: e.execute_condition.clone(),
            })
        })?;
        let commands = index_channel(anim, "commands", &effects.commands, rate, |_, e| {
            Ok(CommandsEvent {
                commands: e.commands.clone(),
                execute_condition: e.execute_condition.clone(),
            })
        })?;
        let animation_state = index_channel(
            anim,
            "animation_state",
            &effects.animation_state,
            rate,
            |tick, e| {
                if !names.contains(e.animation.as_str()) {
                    return Err(AnimationError::UnknownAnimation {
                        animation: anim.name.clone(),
                        target: e.animation.clone(),
                        tick: tick.0,
                    });
                }
                Ok(AnimationStateEvent {
                    animation: e.animation.clone(),
                    execute_condition: e.execute_condition.clone(),
                })
            },
        )?;

        let affected = rig
            .bone_map
            .keys()
            .filter(|uuid| anim.affected_bones.admits(uuid))
            .copied()
            .collect();

        resolved.push(ResolvedAnimation {
            spec: anim,
            affected,
            variant,
            commands,
            animation_state,
        });
    }
    Ok(resolved)
}

/// Bake `animations` against a rendered rig.
///
/// All references are resolved before the evaluator is touched. The evaluator's
/// `end_pass` runs after the pass whether or not it succeeded (unless
/// `config.restore_state` is off).
pub fn render_animations<E, P>(
    scene: &SceneGraph,
    rig: &RenderedRig,
    animations: &[AnimationSpec],
    evaluator: &mut E,
    config: &BakingConfig,
    progress: &mut P,
) -> Result<Vec<RenderedAnimation>, AnimationError>
where
    E: PoseEvaluator + ?Sized,
    P: ProgressObserver + ?Sized,
{
    let rate = config.ticks_per_second.max(1);
    let resolved = resolve(scene, rig, animations, rate)?;

    evaluator.begin_pass();
    let mut limiter = RateLimiter::new(Duration::from_millis(config.progress_interval_ms));
    let count = resolved.len();
    let result = resolved
        .iter()
        .enumerate()
        .map(|(index, anim)| {
            bake_one(rig, anim, evaluator, rate, |frame, total| {
                if frame == total || limiter.ready() {
                    progress.on_progress(&Progress {
                        animation: anim.spec.name.clone(),
                        frame,
                        total_frames: total,
                        animation_index: index,
                        animation_count: count,
                    });
                }
            })
        })
        .collect::<Result<Vec<_>, _>>();
    if config.restore_state {
        evaluator.end_pass();
    }
    result
}

fn bake_one<E>(
    rig: &RenderedRig,
    anim: &ResolvedAnimation<'_>,
    evaluator: &mut E,
    rate: u32,
    mut report: impl FnMut(u32, u32),
) -> Result<RenderedAnimation, AnimationError>
where
    E: PoseEvaluator + ?Sized,
{
    let spec = anim.spec;
    let total = frame_count(spec.length, rate);
    debug!(
        "baking '{}': {total} frames, {} affected bones",
        spec.name,
        anim.affected.len()
    );

    let mut frames = Vec::with_capacity(total as usize);
    for i in 0..total {
        let tick = Tick(i);
        let time = tick.seconds(rate);
        let pose = evaluator.evaluate(spec, time)?;
        let nodes = pose
            .values()
            .filter(|bone| match bone.kind {
                NodeKind::Bone => anim.affected.contains(&bone.id),
                NodeKind::Locator | NodeKind::Camera => true,
            })
            .filter_map(|bone| rig.node_transform(bone))
            .collect();
        frames.push(AnimationFrame {
            tick,
            time,
            nodes,
            variant: anim.variant.get(&tick).cloned(),
            commands: anim.commands.get(&tick).cloned(),
            animation_state: anim.animation_state.get(&tick).cloned(),
        });
        report(i + 1, total);
    }

    let affected_bones: Vec<Uuid> = rig
        .bone_map
        .keys()
        .filter(|uuid| anim.affected.contains(*uuid))
        .copied()
        .collect();
    info!("baked '{}' ({} frames)", spec.name, frames.len());
    Ok(RenderedAnimation {
        uuid: spec.uuid,
        name: spec.name.clone(),
        duration: frames.len() as u32,
        frames,
        loop_mode: spec.loop_mode,
        loop_delay: spec.loop_delay,
        affected_bones,
    })
}
