//! Angle quantization into orientation codes.

use crate::util::math::wrap_tau;
use std::f32::consts::TAU;

/// Maps gradient angles onto orientation codes `1..=steps`.
///
/// Code `0` is reserved for "no vote". The codebook size is `max_code() + 1`
/// with `max_code() == steps + 1`: rounding can produce bucket `steps` for
/// angles just below 2π, which is folded back onto bucket 0 so that 0 and 2π
/// share a code, leaving the top code permanently unused but addressable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Quantizer {
    steps: u8,
}

impl Quantizer {
    /// Smallest accepted number of angle steps.
    pub const MIN_STEPS: usize = 4;
    /// Largest accepted number of angle steps.
    pub const MAX_STEPS: usize = 254;

    /// Creates a quantizer, clamping `steps` to `[MIN_STEPS, MAX_STEPS]`.
    pub fn new(steps: usize) -> Self {
        let steps = steps.clamp(Self::MIN_STEPS, Self::MAX_STEPS) as u8;
        Self { steps }
    }

    /// Number of angle buckets.
    pub fn steps(&self) -> usize {
        usize::from(self.steps)
    }

    /// Largest code a table or code image built with this quantizer can hold.
    pub fn max_code(&self) -> u8 {
        self.steps + 1
    }

    /// Returns the code for an angle in radians (any range).
    #[inline]
    pub fn code_for(&self, angle_rad: f32) -> u8 {
        let steps = f32::from(self.steps);
        let mut bucket = (wrap_tau(angle_rad) * steps / TAU).round() as u8;
        if bucket >= self.steps {
            bucket -= self.steps;
        }
        bucket + 1
    }
}

#[cfg(test)]
mod tests {
    use super::Quantizer;
    use std::f32::consts::{PI, TAU};

    #[test]
    fn steps_are_clamped() {
        assert_eq!(Quantizer::new(0).steps(), 4);
        assert_eq!(Quantizer::new(1000).steps(), 254);
        assert_eq!(Quantizer::new(254).max_code(), 255);
    }

    #[test]
    fn zero_and_full_turn_share_a_code() {
        let q = Quantizer::new(8);
        assert_eq!(q.code_for(0.0), 1);
        assert_eq!(q.code_for(TAU), 1);
        assert_eq!(q.code_for(TAU - 1e-4), 1);
        assert_eq!(q.code_for(-1e-4), 1);
    }

    #[test]
    fn codes_cover_one_to_steps() {
        let q = Quantizer::new(8);
        assert_eq!(q.code_for(PI / 4.0), 2);
        assert_eq!(q.code_for(PI), 5);
        assert_eq!(q.code_for(-PI / 2.0), 7);
        for i in 0..1000 {
            let code = q.code_for(i as f32 * TAU / 1000.0);
            assert!((1..=8).contains(&code));
        }
    }
}
