//! Angle and clamping helpers shared by the encoder and configuration.

use std::f32::consts::TAU;

/// Wraps an angle in radians to the range [0, 2π).
pub(crate) fn wrap_tau(angle_rad: f32) -> f32 {
    let wrapped = angle_rad.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs.
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Clamps a float to `[lo, hi]`, replacing non-finite values with `fallback`.
pub(crate) fn clamp_finite(value: f32, lo: f32, hi: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value.clamp(lo, hi)
    } else {
        fallback
    }
}

/// Returns the closest odd value to `k` (rounding up), clamped to `[1, max]`.
pub(crate) fn odd_clamped(k: usize, max: usize) -> usize {
    (k | 1).min(max | 1)
}
