//! Keyframe track sampling.
//!
//! Model:
//! - Keyframes carry absolute times in seconds and need not be stored in order.
//! - Before the first keyframe and after the last one the nearest value is held.
//! - A segment steps when its left keyframe is `Step`, uses Catmull-Rom when either end is
//!   `CatmullRom` (missing neighbours are clamped to the segment ends), and is linear
//!   otherwise.

use rigbake_math_core::Vector;

use crate::data::{Interpolation, Keyframe};

#[inline]
fn lerp(a: Vector, b: Vector, t: f64) -> Vector {
    a.add(b.sub(a).multiply(t))
}

#[inline]
fn catmull_rom_1d(p0: f64, p1: f64, p2: f64, p3: f64, t: f64) -> f64 {
    let t2 = t * t;
    let t3 = t2 * t;
    0.5 * (2.0 * p1
        + (-p0 + p2) * t
        + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
        + (-p0 + 3.0 * p1 - 3.0 * p2 + p3) * t3)
}

fn catmull_rom(p0: Vector, p1: Vector, p2: Vector, p3: Vector, t: f64) -> Vector {
    Vector::new(
        catmull_rom_1d(p0.x, p1.x, p2.x, p3.x, t),
        catmull_rom_1d(p0.y, p1.y, p2.y, p3.y, t),
        catmull_rom_1d(p0.z, p1.z, p2.z, p3.z, t),
    )
}

/// Sample `keys` at `time` seconds. `None` for an empty track.
pub fn sample_keyframes(keys: &[Keyframe], time: f64) -> Option<Vector> {
    let mut order: Vec<&Keyframe> = keys.iter().collect();
    order.sort_by(|a, b| a.time.total_cmp(&b.time));

    let first = order.first()?;
    if order.len() == 1 || time <= first.time {
        return Some(first.value);
    }
    let last = order[order.len() - 1];
    if time >= last.time {
        return Some(last.value);
    }

    // Linear scan; tracks are short.
    let i = order
        .windows(2)
        .position(|w| time >= w[0].time && time < w[1].time)
        .unwrap_or(order.len() - 2);
    let left = order[i];
    let right = order[i + 1];
    let span = (right.time - left.time).max(f64::EPSILON);
    let t = ((time - left.time) / span).clamp(0.0, 1.0);

    let value = match (left.interpolation, right.interpolation) {
        (Interpolation::Step, _) => left.value,
        (Interpolation::CatmullRom, _) | (_, Interpolation::CatmullRom) => {
            let before = if i > 0 { order[i - 1].value } else { left.value };
            let after = order.get(i + 2).map_or(right.value, |k| k.value);
            catmull_rom(before, left.value, right.value, after, t)
        }
        _ => lerp(left.value, right.value, t),
    };
    Some(value)
}
