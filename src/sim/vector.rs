//! Vector helpers with defined zero-vector behavior
//!
//! `glam::Vec2` covers add/scale/dot/distance; these fill in the rest.

use std::f32::consts::FRAC_PI_2;

use glam::Vec2;

/// Unit vector, or zero for a zero-length input
#[inline]
pub fn normalize(v: Vec2) -> Vec2 {
    v.normalize_or_zero()
}

/// Component of `v` along `onto` (zero if `onto` is zero)
#[inline]
pub fn project(v: Vec2, onto: Vec2) -> Vec2 {
    let len_sq = onto.length_squared();
    if len_sq == 0.0 {
        return Vec2::ZERO;
    }
    onto * (v.dot(onto) / len_sq)
}

/// Unsigned angle between two vectors in [0, π]
///
/// A zero-length input has no direction, so it is reported as a right angle.
#[inline]
pub fn angle_between(a: Vec2, b: Vec2) -> f32 {
    let denom = a.length() * b.length();
    if denom == 0.0 {
        return FRAC_PI_2;
    }
    (a.dot(b) / denom).clamp(-1.0, 1.0).acos()
}

/// Clamp the length of `v` to `max`, keeping its direction
#[inline]
pub fn clamp_length(v: Vec2, max: f32) -> Vec2 {
    let speed = v.length();
    if speed > max { v * (max / speed) } else { v }
}
