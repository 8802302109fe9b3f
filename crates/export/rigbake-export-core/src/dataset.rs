//! Animation datasets: the per-tick JSON the command generator consumes.
//!
//! Serialization is independent per animation, so it runs on a bounded rayon pool.
//! Results come back in input order.

use indexmap::IndexMap;
use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use rigbake_animation_core::{
    AnimationFrame, AnimationStateEvent, CommandsEvent, LoopMode, RenderedAnimation,
    VariantEvent,
};

use crate::error::ExportError;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DatasetFrame {
    pub tick: u32,
    /// Node name to row-major 4x4 transform.
    pub nodes: IndexMap<String, [f64; 16]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<VariantEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commands: Option<CommandsEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation_state: Option<AnimationStateEvent>,
}

impl From<&AnimationFrame> for DatasetFrame {
    fn from(frame: &AnimationFrame) -> Self {
        Self {
            tick: frame.tick.0,
            nodes: frame
                .nodes
                .iter()
                .map(|n| (n.name.clone(), n.matrix))
                .collect(),
            variant: frame.variant.clone(),
            commands: frame.commands.clone(),
            animation_state: frame.animation_state.clone(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AnimationDataset {
    pub uuid: Uuid,
    pub name: String,
    pub duration: u32,
    pub loop_mode: LoopMode,
    pub loop_delay: u32,
    pub frames: Vec<DatasetFrame>,
}

impl From<&RenderedAnimation> for AnimationDataset {
    fn from(anim: &RenderedAnimation) -> Self {
        Self {
            uuid: anim.uuid,
            name: anim.name.clone(),
            duration: anim.duration,
            loop_mode: anim.loop_mode,
            loop_delay: anim.loop_delay,
            frames: anim.frames.iter().map(DatasetFrame::from).collect(),
        }
    }
}

/// Serialize every animation to dataset JSON on `workers` threads (`0` = rayon default).
pub fn serialize_datasets(
    animations: &[RenderedAnimation],
    workers: usize,
) -> Result<Vec<Vec<u8>>, ExportError> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("rigbake-dataset-{i}"))
        .build()
        .map_err(|e| ExportError::WorkerPool {
            reason: e.to_string(),
        })?;
    debug!(
        "serializing {} datasets on {} threads",
        animations.len(),
        pool.current_num_threads()
    );
    pool.install(|| {
        animations
            .par_iter()
            .map(|anim| {
                serde_json::to_vec(&AnimationDataset::from(anim)).map_err(ExportError::from)
            })
            .collect()
    })
}
