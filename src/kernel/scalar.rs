//! Sequential voting pass.

use crate::gradient::CodeImage;
use crate::image::{ImageView, OwnedImage};
use crate::kernel::{BorderPolicy, VoteCount, VoteParams};
use crate::table::{LookupTable, OffsetVote};
use crate::trace::{trace_event, trace_span};
use crate::util::{HoughMatchError, HoughMatchResult};
use std::iter::StepBy;
use std::ops::Range;

/// Half-open scan window in scene coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ScanWindow {
    pub(crate) x0: usize,
    pub(crate) x1: usize,
    pub(crate) y0: usize,
    pub(crate) y1: usize,
}

impl ScanWindow {
    /// Window of scene pixels that may vote under `policy`.
    ///
    /// The strict margin on each side is the larger of half the template extent
    /// and the table's offset reach on that side, so every vote cast from
    /// inside the window lands inside the scene even for scaled tables.
    pub(crate) fn for_policy(
        width: usize,
        height: usize,
        table: &LookupTable,
        policy: BorderPolicy,
    ) -> Self {
        match policy {
            BorderPolicy::Strict => {
                let (tw, th) = table.img_size();
                let reach = table.reach();
                Self {
                    x0: (tw / 2).max(reach.left),
                    x1: width.saturating_sub((tw / 2).max(reach.right)),
                    y0: (th / 2).max(reach.up),
                    y1: height.saturating_sub((th / 2).max(reach.down)),
                }
            }
            BorderPolicy::AllPixel => Self {
                x0: 1,
                x1: width.saturating_sub(1),
                y0: 1,
                y1: height.saturating_sub(1),
            },
        }
    }
}

fn align_up(value: usize, stride: usize) -> usize {
    value.div_ceil(stride) * stride
}

/// Everything a row scan needs, resolved once per pass.
pub(crate) struct VotePlan<'t> {
    lut: [&'t [OffsetVote]; 256],
    window: ScanWindow,
    stride: usize,
    width: usize,
    height: usize,
    checked: bool,
}

impl<'t> VotePlan<'t> {
    pub(crate) fn new(
        codes: &CodeImage,
        table: &'t LookupTable,
        params: VoteParams,
    ) -> HoughMatchResult<Self> {
        if codes.max_code() != table.max_code() {
            return Err(HoughMatchError::CodebookMismatch {
                image: codes.max_code(),
                table: table.max_code(),
            });
        }

        // Codes above max_code cannot occur; they map to empty lists anyway so
        // the hot loop indexes a fixed-size array.
        let mut lut: [&'t [OffsetVote]; 256] = [&[]; 256];
        for (code, votes) in table.iter() {
            lut[usize::from(code)] = votes;
        }

        let width = codes.width();
        let height = codes.height();
        Ok(Self {
            lut,
            window: ScanWindow::for_policy(width, height, table, params.policy),
            stride: params.stride.max(1),
            width,
            height,
            checked: params.policy == BorderPolicy::AllPixel,
        })
    }

    /// Scene rows visited by the pass, top to bottom.
    pub(crate) fn rows(&self) -> StepBy<Range<usize>> {
        let start = align_up(self.window.y0, self.stride);
        (start..self.window.y1.max(start)).step_by(self.stride)
    }

    fn cols(&self) -> StepBy<Range<usize>> {
        let start = align_up(self.window.x0, self.stride);
        (start..self.window.x1.max(start)).step_by(self.stride)
    }

    /// Casts the votes of scene row `y` into `out`.
    #[inline]
    pub(crate) fn scan_row<A: VoteCount>(&self, y: usize, row: &[u8], out: &mut [A]) {
        if self.checked {
            self.scan_row_impl::<A, true>(y, row, out);
        } else {
            self.scan_row_impl::<A, false>(y, row, out);
        }
    }

    fn scan_row_impl<A: VoteCount, const CHECKED: bool>(
        &self,
        y: usize,
        row: &[u8],
        out: &mut [A],
    ) {
        let width = self.width as isize;
        let height = self.height as isize;
        for x in self.cols() {
            let code = row[x];
            if code == 0 {
                continue;
            }
            for vote in self.lut[usize::from(code)] {
                let mx = x as isize + vote.dx as isize;
                let my = y as isize + vote.dy as isize;
                if CHECKED && (mx < 0 || my < 0 || mx >= width || my >= height) {
                    continue;
                }
                out[my as usize * self.width + mx as usize].add_weight(vote.weight);
            }
        }
    }
}

/// Fills a zeroed map using one thread.
pub(crate) fn vote_scalar<A: VoteCount>(
    codes: &CodeImage,
    table: &LookupTable,
    params: VoteParams,
) -> HoughMatchResult<OwnedImage<A>> {
    let plan = VotePlan::new(codes, table, params)?;
    let _span = trace_span!(
        "vote",
        width = plan.width,
        height = plan.height,
        stride = plan.stride,
        checked = plan.checked
    )
    .entered();

    let mut out = OwnedImage::filled(plan.width, plan.height, A::default())?;
    let view: ImageView<'_, u8> = codes.view();
    let mut visited = 0usize;
    {
        let acc = out.data_mut();
        for y in plan.rows() {
            if let Some(row) = view.row(y) {
                plan.scan_row(y, row, acc);
                visited += 1;
            }
        }
    }

    trace_event!("voted", rows = visited, entries = table.total_entries());
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::{align_up, vote_scalar, ScanWindow};
    use crate::gradient::{CodeImage, Quantizer};
    use crate::kernel::{BorderPolicy, VoteParams};
    use crate::table::LookupTable;
    use crate::util::HoughMatchError;

    fn single_feature_table() -> LookupTable {
        // 5x5 template, one feature at (0, 0) voting (+2, +2).
        let mut data = vec![0u8; 25];
        data[0] = 3;
        let codes = CodeImage::from_raw(data, 5, 5, Quantizer::new(8)).unwrap();
        LookupTable::build(&codes, 1.0)
    }

    #[test]
    fn align_up_rounds_to_lattice() {
        assert_eq!(align_up(0, 3), 0);
        assert_eq!(align_up(1, 3), 3);
        assert_eq!(align_up(3, 3), 3);
        assert_eq!(align_up(7, 1), 7);
    }

    #[test]
    fn strict_window_uses_half_template() {
        let table = single_feature_table();
        let win = ScanWindow::for_policy(20, 10, &table, BorderPolicy::Strict);
        assert_eq!(win, ScanWindow { x0: 2, x1: 18, y0: 2, y1: 8 });
        let win = ScanWindow::for_policy(3, 3, &table, BorderPolicy::Strict);
        assert_eq!((win.x1, win.y1), (1, 1));
    }

    #[test]
    fn allpixel_drops_out_of_range_votes() {
        let table = single_feature_table();
        let mut data = vec![0u8; 36];
        data[6 + 1] = 3; // (1, 1) votes to (3, 3)
        data[6 * 4 + 4] = 3; // (4, 4) votes to (6, 6): outside
        let scene = CodeImage::from_raw(data, 6, 6, Quantizer::new(8)).unwrap();
        let votes = vote_scalar::<u32>(&scene, &table, VoteParams::default()).unwrap();
        assert_eq!(votes.get(3, 3), Some(1));
        assert_eq!(votes.data().iter().sum::<u32>(), 1);
    }

    #[test]
    fn mismatched_codebooks_are_rejected() {
        let table = single_feature_table();
        let scene = CodeImage::from_raw(vec![0; 4], 2, 2, Quantizer::new(16)).unwrap();
        let err = vote_scalar::<u16>(&scene, &table, VoteParams::default()).unwrap_err();
        assert_eq!(err, HoughMatchError::CodebookMismatch { image: 17, table: 9 });
    }
}
