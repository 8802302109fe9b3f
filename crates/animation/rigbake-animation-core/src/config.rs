//! Baking configuration.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BakingConfig {
    /// Sampling rate; the target runtime steps at 20 ticks per second.
    pub ticks_per_second: u32,
    /// Minimum wall-clock time (ms) between progress reports.
    pub progress_interval_ms: u64,
    /// Ask the evaluator to restore its pre-bake state once the pass ends.
    pub restore_state: bool,
}

impl Default for BakingConfig {
    fn default() -> Self {
        Self {
            ticks_per_second: crate::tick::TICKS_PER_SECOND,
            progress_interval_ms: 100,
            restore_state: true,
        }
    }
}
