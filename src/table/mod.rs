//! Generalized Hough lookup table (R-table).
//!
//! The table maps every orientation code in `0..=max_code` to the list of
//! offsets from template feature pixels to the template's reference point (its
//! geometric center), each with a vote weight. Construction groups votes in an
//! ordered map so duplicates that collapse onto the same `(code, offset)` are
//! merged, then freezes them into a single arena with one span per code. The
//! frozen table is immutable; a new template means a new table.

mod handle;

pub use handle::TableHandle;

use crate::gradient::CodeImage;
use crate::trace::{trace_event, trace_span};
use crate::util::math::clamp_finite;
use std::collections::BTreeMap;
use std::ops::Range;

/// Smallest accepted build-time offset scale.
pub const MIN_SCALE: f32 = 0.1;
/// Largest accepted build-time offset scale.
pub const MAX_SCALE: f32 = 10.0;

/// One vote: displacement from a feature pixel to the reference point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OffsetVote {
    pub dx: i32,
    pub dy: i32,
    /// Number of template pixels that collapsed onto this code and offset.
    pub weight: u32,
}

/// How far votes can land from the pixel that casts them, per side.
///
/// `left` is the largest leftward displacement (`-dx`), `right` the largest
/// rightward one, and likewise `up`/`down` for rows. All are zero for an empty
/// table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OffsetReach {
    pub left: usize,
    pub right: usize,
    pub up: usize,
    pub down: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Span {
    start: u32,
    end: u32,
}

impl Span {
    fn range(self) -> Range<usize> {
        self.start as usize..self.end as usize
    }
}

/// Frozen, code-indexed vote table built from one template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LookupTable {
    votes: Vec<OffsetVote>,
    spans: Vec<Span>,
    img_size: (usize, usize),
    max_votes: u64,
    reach: OffsetReach,
}

impl LookupTable {
    /// Builds a table from an encoded template.
    ///
    /// Offsets are `center - pixel`; when `scale_factor != 1` they are scaled
    /// (after clamping the factor to `[MIN_SCALE, MAX_SCALE]`) and truncated
    /// toward zero before grouping. A template without feature pixels yields a
    /// table whose every entry is empty.
    pub fn build(codes: &CodeImage, scale_factor: f32) -> Self {
        let width = codes.width();
        let height = codes.height();
        let max_code = codes.max_code();
        let scale = clamp_finite(scale_factor, MIN_SCALE, MAX_SCALE, 1.0);
        let scaled = (scale - 1.0).abs() > f32::EPSILON;

        let _span = trace_span!("build_table", width = width, height = height, scale = scale).entered();

        let cx = (width / 2) as i64;
        let cy = (height / 2) as i64;
        let mut grouped: BTreeMap<(u8, i32, i32), u32> = BTreeMap::new();
        let view = codes.view();
        for (y, row) in view.rows().enumerate() {
            for (x, &code) in row.iter().enumerate() {
                if code == 0 {
                    continue;
                }
                let mut dx = (cx - x as i64) as i32;
                let mut dy = (cy - y as i64) as i32;
                if scaled {
                    dx = (dx as f32 * scale) as i32;
                    dy = (dy as f32 * scale) as i32;
                }
                *grouped.entry((code, dy, dx)).or_insert(0) += 1;
            }
        }

        let num_codes = usize::from(max_code) + 1;
        let mut votes = Vec::with_capacity(grouped.len());
        let mut spans = Vec::with_capacity(num_codes);
        let mut max_votes = 0u64;
        let mut reach = OffsetReach::default();
        let mut entries = grouped.into_iter().peekable();
        for code in 0..num_codes {
            let start = votes.len() as u32;
            while let Some(&((c, dy, dx), weight)) = entries.peek() {
                if usize::from(c) != code {
                    break;
                }
                entries.next();
                max_votes += u64::from(weight);
                reach.left = reach.left.max((-dx).max(0) as usize);
                reach.right = reach.right.max(dx.max(0) as usize);
                reach.up = reach.up.max((-dy).max(0) as usize);
                reach.down = reach.down.max(dy.max(0) as usize);
                votes.push(OffsetVote { dx, dy, weight });
            }
            spans.push(Span {
                start,
                end: votes.len() as u32,
            });
        }

        trace_event!("table_built", entries = votes.len(), max_votes = max_votes);
        Self {
            votes,
            spans,
            img_size: (width, height),
            max_votes,
            reach,
        }
    }

    /// Votes registered under `code`; empty for unused or out-of-range codes.
    pub fn votes_for(&self, code: u8) -> &[OffsetVote] {
        match self.spans.get(usize::from(code)) {
            Some(span) => &self.votes[span.range()],
            None => &[],
        }
    }

    /// Largest code the table is indexed by.
    pub fn max_code(&self) -> u8 {
        (self.spans.len() - 1) as u8
    }

    /// Number of code entries (`max_code + 1`).
    pub fn num_codes(&self) -> usize {
        self.spans.len()
    }

    /// Number of distinct `(code, offset)` entries across all codes.
    pub fn total_entries(&self) -> usize {
        self.votes.len()
    }

    /// Returns `true` when no code has any vote.
    pub fn is_empty(&self) -> bool {
        self.votes.is_empty()
    }

    /// Template `(width, height)` the table was built from.
    pub fn img_size(&self) -> (usize, usize) {
        self.img_size
    }

    /// Sum of all weights: the ideal self-match score.
    pub fn max_votes(&self) -> u64 {
        self.max_votes
    }

    /// Per-side extent of the stored offsets.
    pub fn reach(&self) -> OffsetReach {
        self.reach
    }

    /// Iterates `(code, votes)` pairs over the whole codebook.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &[OffsetVote])> + '_ {
        self.spans
            .iter()
            .enumerate()
            .map(move |(code, span)| (code as u8, &self.votes[span.range()]))
    }
}
