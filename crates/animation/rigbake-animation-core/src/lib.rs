//! rigbake animation core (host-agnostic)
//!
//! Bakes animations into per-tick frames for a rendered rig. Posing is delegated to a
//! [`PoseEvaluator`]; [`KeyframePoseEvaluator`] is the headless implementation that
//! samples keyframes itself and re-derives world transforms through the rig's bone
//! hierarchy.

pub mod config;
pub mod data;
pub mod error;
pub mod evaluator;
pub mod progress;
pub mod renderer;
pub mod sampling;
pub mod tick;

// Re-exports for consumers
pub use config::BakingConfig;
pub use data::{
    AnimationSpec, AnimationStateEffect, CommandsEffect, EffectKeyframe, Effects, Interpolation,
    Keyframe, LoopMode, NodeAnimator, VariantEffect,
};
pub use error::AnimationError;
pub use evaluator::{KeyframePoseEvaluator, PoseEvaluator, PoseMap};
pub use progress::{NoProgress, Progress, ProgressObserver, RateLimiter};
pub use renderer::{
    render_animations, AnimationFrame, AnimationStateEvent, CommandsEvent, RenderedAnimation,
    VariantEvent,
};
pub use sampling::sample_keyframes;
pub use tick::{frame_count, quantize, Tick, TICKS_PER_SECOND};

pub type Result<T> = core::result::Result<T, AnimationError>;
