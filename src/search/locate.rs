//! Peak location and score normalization.

use crate::image::ImageView;
use crate::trace::trace_event;

/// Global maximum of a vote map.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Peak {
    /// X coordinate (column) of the peak.
    pub x: usize,
    /// Y coordinate (row) of the peak.
    pub y: usize,
    /// Raw vote count at the peak.
    pub votes: f64,
}

/// Best match for one query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Match {
    /// X coordinate of the template reference point in the scene.
    pub x: usize,
    /// Y coordinate of the template reference point in the scene.
    pub y: usize,
    /// Raw vote count at the match.
    pub votes: f64,
    /// Votes relative to the table's ideal total, stride-compensated.
    pub score: f32,
}

/// Template-sized box centred on a match, for overlays.
///
/// The corner may be negative when the match is near the top-left border.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TargetRect {
    pub x: isize,
    pub y: isize,
    pub width: usize,
    pub height: usize,
}

impl Match {
    /// Box of the given template size whose center is the match location.
    pub fn target_rect(&self, img_size: (usize, usize)) -> TargetRect {
        let (width, height) = img_size;
        TargetRect {
            x: self.x as isize - (width / 2) as isize,
            y: self.y as isize - (height / 2) as isize,
            width,
            height,
        }
    }
}

/// Finds the global maximum; ties resolve to the first cell in row-major
/// order. Returns `None` only for an empty map.
pub fn locate_peak<T>(votes: ImageView<'_, T>) -> Option<Peak>
where
    T: Copy + Into<f64>,
{
    let mut best: Option<Peak> = None;
    for (y, row) in votes.rows().enumerate() {
        for (x, &value) in row.iter().enumerate() {
            let value: f64 = value.into();
            match best {
                Some(peak) if value <= peak.votes => {}
                _ => best = Some(Peak { x, y, votes: value }),
            }
        }
    }
    best
}

/// Converts raw votes into a confidence relative to `max_votes`.
///
/// Sampling at `stride` visits about `1 / stride²` of the scene, so the ratio
/// is multiplied by `stride²`. The result is not clamped; an empty table
/// scores 0.
pub fn normalize_score(votes: f64, max_votes: u64, stride: usize) -> f32 {
    if max_votes == 0 {
        return 0.0;
    }
    let stride = stride.max(1) as f64;
    (votes * stride * stride / max_votes as f64) as f32
}

/// Locates the best match in a vote map and normalizes its score.
pub fn locate_match<T>(votes: ImageView<'_, T>, max_votes: u64, stride: usize) -> Option<Match>
where
    T: Copy + Into<f64>,
{
    let peak = locate_peak(votes)?;
    let score = normalize_score(peak.votes, max_votes, stride);
    trace_event!("located", x = peak.x, y = peak.y, votes = peak.votes, score = score);
    Some(Match {
        x: peak.x,
        y: peak.y,
        votes: peak.votes,
        score,
    })
}
