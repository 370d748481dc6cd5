//! Hough voting kernels.
//!
//! A single scan routine serves both border policies; the policy only picks the
//! scan window and whether each vote is bounds checked. Sampled rows and
//! columns are those whose absolute coordinate is a multiple of the stride, so
//! both policies visit the same lattice and agree wherever their windows
//! overlap.

use crate::gradient::CodeImage;
use crate::image::OwnedImage;
use crate::table::LookupTable;
use crate::util::HoughMatchResult;

pub(crate) mod scalar;

#[cfg(feature = "rayon")]
pub mod rayon;

/// Which scene pixels may cast votes, and how destinations are guarded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BorderPolicy {
    /// Scan only pixels whose every vote lands inside the image; no per-vote
    /// bounds check. Cells no window pixel can reach stay zero.
    Strict,
    /// Scan everything but a 1-pixel margin and drop votes that fall outside.
    #[default]
    AllPixel,
}

/// Query-time voting parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VoteParams {
    /// Visit every `stride`-th row and column; values below 1 act as 1.
    pub stride: usize,
    /// Border handling.
    pub policy: BorderPolicy,
}

impl Default for VoteParams {
    fn default() -> Self {
        Self {
            stride: 1,
            policy: BorderPolicy::AllPixel,
        }
    }
}

/// Accumulator cell type.
///
/// `u16` saturates and is enough for templates with up to tens of thousands of
/// feature pixels; `u32` and `f32` cover larger templates.
pub trait VoteCount: Copy + Default + PartialOrd + Into<f64> + Send + Sync + 'static {
    /// Adds `weight` votes to this cell.
    fn add_weight(&mut self, weight: u32);

    /// Adds the votes of another cell (used when merging partial maps).
    fn merge(&mut self, other: Self);
}

impl VoteCount for u16 {
    #[inline]
    fn add_weight(&mut self, weight: u32) {
        let weight = u16::try_from(weight).unwrap_or(u16::MAX);
        *self = self.saturating_add(weight);
    }

    #[inline]
    fn merge(&mut self, other: Self) {
        *self = self.saturating_add(other);
    }
}

impl VoteCount for u32 {
    #[inline]
    fn add_weight(&mut self, weight: u32) {
        *self = self.saturating_add(weight);
    }

    #[inline]
    fn merge(&mut self, other: Self) {
        *self = self.saturating_add(other);
    }
}

impl VoteCount for f32 {
    #[inline]
    fn add_weight(&mut self, weight: u32) {
        *self += weight as f32;
    }

    #[inline]
    fn merge(&mut self, other: Self) {
        *self += other;
    }
}

/// Accumulates votes for `codes` against `table` into a fresh vote map of the
/// same size as the scene.
///
/// Returns [`HoughMatchError::CodebookMismatch`](crate::HoughMatchError) when
/// the code image and the table come from different quantizers.
pub fn vote<A: VoteCount>(
    codes: &CodeImage,
    table: &LookupTable,
    params: VoteParams,
) -> HoughMatchResult<OwnedImage<A>> {
    scalar::vote_scalar(codes, table, params)
}
