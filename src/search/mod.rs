//! High-level matching: encode, vote, locate.
//!
//! [`Matcher`] ties one [`MatcherConfig`] to one published lookup table. The
//! same config encodes templates and scenes, so their codebooks always agree.
//! Rebuilding builds a complete table first and then swaps it in, so callers
//! sharing the matcher across threads never vote against a half-built table.

pub(crate) mod locate;

pub use locate::{locate_match, locate_peak, normalize_score, Match, Peak, TargetRect};

use crate::config::MatcherConfig;
use crate::gradient::{encode_orientations, CodeImage};
use crate::image::{ImageView, OwnedImage};
use crate::kernel::{BorderPolicy, VoteParams};
use crate::table::{LookupTable, TableHandle};
use crate::trace::trace_span;
use crate::util::HoughMatchResult;
use std::sync::Arc;

/// Intermediate images of one query, for diagnostic display.
#[derive(Clone, Debug)]
pub struct MatchReport {
    /// Orientation codes of the scene.
    pub codes: CodeImage,
    /// Vote accumulator, same size as the scene.
    pub votes: OwnedImage<u32>,
    /// Best match, `None` only for an empty scene.
    pub best: Option<Match>,
    /// Table snapshot the votes were cast with.
    pub table: Arc<LookupTable>,
}

/// Generalized Hough template matcher.
#[derive(Debug)]
pub struct Matcher {
    cfg: MatcherConfig,
    table: TableHandle,
}

impl Matcher {
    /// Builds a matcher for `template`; the config is normalized first.
    pub fn new(template: ImageView<'_, u8>, cfg: MatcherConfig) -> HoughMatchResult<Self> {
        let cfg = cfg.normalized();
        let table = build_table(template, &cfg)?;
        Ok(Self {
            cfg,
            table: TableHandle::new(table),
        })
    }

    /// Returns the normalized configuration in use.
    pub fn config(&self) -> &MatcherConfig {
        &self.cfg
    }

    /// Returns a snapshot of the current table.
    pub fn table(&self) -> Arc<LookupTable> {
        self.table.load()
    }

    /// Builds a table for `template` with this matcher's build settings
    /// without publishing it.
    pub fn build_table(&self, template: ImageView<'_, u8>) -> HoughMatchResult<LookupTable> {
        build_table(template, &self.cfg)
    }

    /// Replaces the template. The new table is fully built before it becomes
    /// visible; the previous table is returned.
    pub fn rebuild(&self, template: ImageView<'_, u8>) -> HoughMatchResult<Arc<LookupTable>> {
        let table = self.build_table(template)?;
        Ok(self.table.replace(Arc::new(table)))
    }

    /// Changes the query-time sampling stride (values below 1 act as 1).
    pub fn set_sampling_stride(&mut self, stride: usize) {
        self.cfg.sampling_stride = stride.max(1);
    }

    /// Changes the query-time border policy.
    pub fn set_border_policy(&mut self, policy: BorderPolicy) {
        self.cfg.border_policy = policy;
    }

    /// Encodes a scene with the matcher's encoder settings.
    pub fn encode(&self, image: ImageView<'_, u8>) -> HoughMatchResult<CodeImage> {
        encode_orientations(image, &self.cfg.encode_params())
    }

    /// Finds the single best match of the template in `image`.
    pub fn match_image(&self, image: ImageView<'_, u8>) -> HoughMatchResult<Option<Match>> {
        Ok(self.match_image_detailed(image)?.best)
    }

    /// Like [`match_image`](Self::match_image), but also returns the code
    /// image and vote map.
    pub fn match_image_detailed(&self, image: ImageView<'_, u8>) -> HoughMatchResult<MatchReport> {
        let _span = trace_span!("match_image", width = image.width(), height = image.height()).entered();

        let table = self.table.load();
        let codes = self.encode(image)?;
        let params = self.cfg.vote_params();
        let votes = self.vote(&codes, &table, params)?;
        let best = locate_match(votes.view(), table.max_votes(), params.stride);
        Ok(MatchReport {
            codes,
            votes,
            best,
            table,
        })
    }

    #[cfg(feature = "rayon")]
    fn vote(
        &self,
        codes: &CodeImage,
        table: &LookupTable,
        params: VoteParams,
    ) -> HoughMatchResult<OwnedImage<u32>> {
        if self.cfg.parallel {
            crate::kernel::rayon::vote_par(codes, table, params)
        } else {
            crate::kernel::vote(codes, table, params)
        }
    }

    #[cfg(not(feature = "rayon"))]
    fn vote(
        &self,
        codes: &CodeImage,
        table: &LookupTable,
        params: VoteParams,
    ) -> HoughMatchResult<OwnedImage<u32>> {
        crate::kernel::vote(codes, table, params)
    }
}

fn build_table(template: ImageView<'_, u8>, cfg: &MatcherConfig) -> HoughMatchResult<LookupTable> {
    let codes = encode_orientations(template, &cfg.encode_params())?;
    Ok(LookupTable::build(&codes, cfg.scale_factor))
}
