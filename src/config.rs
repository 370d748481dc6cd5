//! Matcher configuration.
//!
//! Every value is clamped or normalized instead of rejected; call
//! [`MatcherConfig::normalized`] to see the values the matcher will actually
//! use.

pub use crate::gradient::DEFAULT_MAGNITUDE_THRESHOLD;

use crate::gradient::{EncodeParams, Quantizer};
use crate::kernel::{BorderPolicy, VoteParams};
use crate::table::{MAX_SCALE, MIN_SCALE};
use crate::util::math::clamp_finite;

/// Encoder, table and voting settings for a [`Matcher`](crate::Matcher).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MatcherConfig {
    /// Sobel aperture (odd, `1..=31`; even values round up).
    pub sobel_kernel_size: usize,
    /// Fraction of the image's peak gradient magnitude a pixel must exceed.
    pub magnitude_threshold: f32,
    /// Number of orientation buckets (`4..=254`).
    pub quantization_steps: usize,
    /// Offset scale applied when building the table (`0.1..=10.0`).
    pub scale_factor: f32,
    /// Row/column sampling interval at query time (at least 1).
    pub sampling_stride: usize,
    /// Border handling at query time.
    pub border_policy: BorderPolicy,
    /// Vote row bands in parallel (requires the `rayon` feature; ignored
    /// otherwise).
    pub parallel: bool,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            sobel_kernel_size: 7,
            magnitude_threshold: DEFAULT_MAGNITUDE_THRESHOLD,
            quantization_steps: 8,
            scale_factor: 1.0,
            sampling_stride: 1,
            border_policy: BorderPolicy::AllPixel,
            parallel: false,
        }
    }
}

impl MatcherConfig {
    /// Returns a copy with every field clamped into its accepted range.
    pub fn normalized(&self) -> Self {
        let encode = EncodeParams {
            sobel_kernel_size: self.sobel_kernel_size,
            magnitude_threshold: self.magnitude_threshold,
            quantizer: self.quantizer(),
        }
        .normalized();
        Self {
            sobel_kernel_size: encode.sobel_kernel_size,
            magnitude_threshold: encode.magnitude_threshold,
            quantization_steps: Quantizer::new(self.quantization_steps).steps(),
            scale_factor: clamp_finite(self.scale_factor, MIN_SCALE, MAX_SCALE, 1.0),
            sampling_stride: self.sampling_stride.max(1),
            border_policy: self.border_policy,
            parallel: self.parallel,
        }
    }

    /// Quantizer shared by template and scene encoding.
    pub fn quantizer(&self) -> Quantizer {
        Quantizer::new(self.quantization_steps)
    }

    /// Encoder settings derived from this config.
    pub fn encode_params(&self) -> EncodeParams {
        let cfg = self.normalized();
        EncodeParams {
            sobel_kernel_size: cfg.sobel_kernel_size,
            magnitude_threshold: cfg.magnitude_threshold,
            quantizer: cfg.quantizer(),
        }
    }

    /// Voting settings derived from this config.
    pub fn vote_params(&self) -> VoteParams {
        VoteParams {
            stride: self.sampling_stride.max(1),
            policy: self.border_policy,
        }
    }
}
