//! Low-level building blocks for custom pipelines.
//!
//! These expose the individual passes behind [`Matcher`](crate::Matcher):
//! encode, build, vote and locate. Use them to vote with a different cell type
//! or to drive the passes from a host that manages its own threads.

pub use crate::image::diag::stretch_to_u8;
#[cfg(feature = "rayon")]
pub use crate::kernel::rayon::vote_par;
pub use crate::search::{locate_match, locate_peak, normalize_score, Peak};
pub use crate::table::{OffsetReach, MAX_SCALE, MIN_SCALE};
