//! Tick-quantized time.
//!
//! All sampling happens on tick boundaries. Times are rounded to the nearest tick rather
//! than accumulated, so long animations do not drift.

use serde::{Deserialize, Serialize};

pub const TICKS_PER_SECOND: u32 = 20;

/// Slack applied before flooring a length to whole ticks, so `1.0 * 20` does not land on
/// `19.999..`.
const FRAME_EPSILON: f64 = 1e-6;

#[derive(Copy, Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct Tick(pub u32);

impl Tick {
    /// Nearest tick to `seconds`; negative and non-finite times map to tick 0.
    pub fn from_seconds(seconds: f64, rate: u32) -> Tick {
        let t = (seconds * f64::from(rate)).round();
        if t.is_finite() && t > 0.0 {
            Tick(t as u32)
        } else {
            Tick(0)
        }
    }

    #[inline]
    pub fn seconds(self, rate: u32) -> f64 {
        f64::from(self.0) / f64::from(rate.max(1))
    }
}

impl std::fmt::Display for Tick {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Round `seconds` to the nearest tick boundary.
pub fn quantize(seconds: f64, rate: u32) -> f64 {
    Tick::from_seconds(seconds, rate).seconds(rate)
}

/// Frames sampled for an animation of `length` seconds. The end time is inclusive.
pub fn frame_count(length: f64, rate: u32) -> u32 {
    if !length.is_finite() || length <= 0.0 {
        return 1;
    }
    (length * f64::from(rate) + FRAME_EPSILON).floor() as u32 + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_second_is_twenty_one_frames() {
        assert_eq!(frame_count(1.0, TICKS_PER_SECOND), 21);
        assert_eq!(frame_count(0.0, TICKS_PER_SECOND), 1);
        assert_eq!(frame_count(0.07, TICKS_PER_SECOND), 2);
        assert_eq!(frame_count(2.5, TICKS_PER_SECOND), 51);
    }

    #[test]
    fn quantize_rounds_to_nearest_tick() {
        assert_eq!(quantize(0.049, 20), 0.05);
        assert_eq!(quantize(0.024, 20), 0.0);
        assert_eq!(Tick::from_seconds(0.15000000000000002, 20), Tick(3));
        assert_eq!(Tick::from_seconds(-1.0, 20), Tick(0));
    }

    #[test]
    fn tick_seconds_round_trip() {
        for i in 0..200 {
            let tick = Tick(i);
            assert_eq!(Tick::from_seconds(tick.seconds(20), 20), tick);
        }
    }
}
