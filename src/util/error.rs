//! Error types for houghmatch.

use thiserror::Error;

/// Result alias for houghmatch operations.
pub type HoughMatchResult<T> = std::result::Result<T, HoughMatchError>;

/// Errors that can occur when building views, tables or vote maps.
///
/// Degenerate images (empty, flat) are not errors; they propagate to empty
/// tables and all-zero accumulators.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum HoughMatchError {
    /// Image geometry overflows `usize`.
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// Row stride is smaller than the row width.
    #[error("invalid stride {stride} for width {width}")]
    InvalidStride { width: usize, stride: usize },
    /// Backing buffer is shorter than the declared geometry.
    #[error("buffer too small: needed {needed}, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// Requested region does not fit inside the image.
    #[error(
        "roi out of bounds: ({x}, {y}) {width}x{height} in {img_width}x{img_height} image"
    )]
    RoiOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        img_width: usize,
        img_height: usize,
    },
    /// A raw orientation code exceeds the codebook's maximum.
    #[error("orientation code {code} exceeds max code {max_code}")]
    CodeOutOfRange { code: u8, max_code: u8 },
    /// Code image and lookup table were produced with different quantizers.
    #[error("code image max code {image} does not match table max code {table}")]
    CodebookMismatch { image: u8, table: u8 },
    /// Image decoding or encoding failed.
    #[error("image io: {reason}")]
    ImageIo { reason: String },
}
