//! Rayon-parallel voting (feature-gated).
//!
//! Votes from one scene row land on many accumulator rows, so bands of rows
//! cannot share an output buffer. Each band votes into its own map and the
//! maps are summed afterwards; for non-saturating cell types the result is
//! identical to the sequential pass.

use crate::gradient::CodeImage;
use crate::image::OwnedImage;
use crate::kernel::scalar::VotePlan;
use crate::kernel::{VoteCount, VoteParams};
use crate::table::LookupTable;
use crate::trace::trace_span;
use crate::util::HoughMatchResult;
use rayon::prelude::*;

/// Band-parallel equivalent of [`vote`](crate::kernel::vote).
pub fn vote_par<A: VoteCount>(
    codes: &CodeImage,
    table: &LookupTable,
    params: VoteParams,
) -> HoughMatchResult<OwnedImage<A>> {
    let plan = VotePlan::new(codes, table, params)?;
    let width = codes.width();
    let height = codes.height();
    let _span = trace_span!("vote", width = width, height = height, parallel = true).entered();

    let len = width * height;
    let rows: Vec<usize> = plan.rows().collect();
    let bands = rayon::current_num_threads().max(1);
    let chunk = rows.len().div_ceil(bands).max(1);
    let view = codes.view();

    let merged = rows
        .par_chunks(chunk)
        .map(|band| {
            let mut acc = vec![A::default(); len];
            for &y in band {
                if let Some(row) = view.row(y) {
                    plan.scan_row(y, row, &mut acc);
                }
            }
            acc
        })
        .reduce(
            || vec![A::default(); len],
            |mut lhs, rhs| {
                for (dst, src) in lhs.iter_mut().zip(rhs) {
                    dst.merge(src);
                }
                lhs
            },
        );

    OwnedImage::new(merged, width, height)
}
