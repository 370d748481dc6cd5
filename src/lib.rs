//! HoughMatch is a CPU template matcher built on the Generalized Hough
//! Transform.
//!
//! A template is encoded into quantized gradient-orientation codes and turned
//! into a lookup table (R-table) of offsets to its center. Scenes are encoded
//! the same way and every coded pixel votes for candidate centers; the vote
//! map's global maximum is the best match. Optional features add rayon-parallel
//! voting (`rayon`), image loading (`image-io`) and spans/events (`tracing`).

pub mod config;
pub mod gradient;
pub mod image;
pub mod kernel;
pub mod lowlevel;
pub mod search;
pub mod table;
mod trace;
pub mod util;

pub use config::MatcherConfig;
pub use gradient::{encode_orientations, CodeImage, EncodeParams, Quantizer};
#[cfg(feature = "image-io")]
pub use crate::image::io;
pub use crate::image::{ImageView, OwnedImage};
pub use kernel::{vote, BorderPolicy, VoteCount, VoteParams};
pub use search::{Match, MatchReport, Matcher, TargetRect};
pub use table::{LookupTable, OffsetVote, TableHandle};
pub use util::{HoughMatchError, HoughMatchResult};
