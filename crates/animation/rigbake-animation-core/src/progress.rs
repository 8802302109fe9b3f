//! Wall-clock pacing of progress reports during long bakes.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Passes at most once per `interval` of wall-clock time.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    interval: Duration,
    last: Option<Instant>,
}

impl RateLimiter {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// True on the first call and then once the interval has elapsed since the last `true`.
    pub fn ready(&mut self) -> bool {
        self.ready_at(Instant::now())
    }

    pub fn ready_at(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.saturating_duration_since(last) < self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Progress {
    pub animation: String,
    /// Frames baked so far for this animation.
    pub frame: u32,
    pub total_frames: u32,
    /// Index of this animation in the pass.
    pub animation_index: usize,
    pub animation_count: usize,
}

/// Receives paced progress reports; the host can repaint or yield here.
pub trait ProgressObserver {
    fn on_progress(&mut self, progress: &Progress);
}

/// Ignores every report.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_progress(&mut self, _progress: &Progress) {}
}

impl<F> ProgressObserver for F
where
    F: FnMut(&Progress),
{
    fn on_progress(&mut self, progress: &Progress) {
        self(progress)
    }
}
