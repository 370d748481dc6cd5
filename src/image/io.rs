//! Convenience helpers for loading and saving images via the `image` crate.
//!
//! Available when the `image-io` feature is enabled.

use crate::image::{ImageView, OwnedImage};
use crate::util::math::clamp_finite;
use crate::util::{HoughMatchError, HoughMatchResult};
use image::imageops::{self, FilterType};
use std::path::Path;

/// Creates a borrowed view from a grayscale image buffer.
pub fn view_from_gray_image(img: &image::GrayImage) -> HoughMatchResult<ImageView<'_, u8>> {
    ImageView::from_slice(img.as_raw(), img.width() as usize, img.height() as usize)
}

/// Creates an owned image from a grayscale image buffer.
pub fn owned_from_gray_image(img: &image::GrayImage) -> HoughMatchResult<OwnedImage<u8>> {
    OwnedImage::new(
        img.as_raw().clone(),
        img.width() as usize,
        img.height() as usize,
    )
}

/// Loads an image from disk and converts it to a grayscale owned image.
pub fn load_gray_image<P: AsRef<Path>>(path: P) -> HoughMatchResult<OwnedImage<u8>> {
    let img = image::open(path).map_err(|err| HoughMatchError::ImageIo {
        reason: err.to_string(),
    })?;
    owned_from_gray_image(&img.to_luma8())
}

/// Loads a template image and rescales it by `prescale` before table building.
///
/// Enlarging uses a cubic filter, shrinking a triangle filter. `prescale` is
/// clamped to `[0.1, 10.0]`; the result is at least 1x1.
pub fn load_template<P: AsRef<Path>>(path: P, prescale: f32) -> HoughMatchResult<OwnedImage<u8>> {
    let img = image::open(path).map_err(|err| HoughMatchError::ImageIo {
        reason: err.to_string(),
    })?;
    let gray = img.to_luma8();
    let prescale = clamp_finite(prescale, 0.1, 10.0, 1.0);
    if (prescale - 1.0).abs() < f32::EPSILON {
        return owned_from_gray_image(&gray);
    }

    let width = ((gray.width() as f32 * prescale).round() as u32).max(1);
    let height = ((gray.height() as f32 * prescale).round() as u32).max(1);
    let filter = if prescale > 1.0 {
        FilterType::CatmullRom
    } else {
        FilterType::Triangle
    };
    let scaled = imageops::resize(&gray, width, height, filter);
    owned_from_gray_image(&scaled)
}

/// Writes a grayscale image to disk; the format follows the file extension.
pub fn save_gray_image<P: AsRef<Path>>(path: P, img: &OwnedImage<u8>) -> HoughMatchResult<()> {
    let width = u32::try_from(img.width()).map_err(|_| HoughMatchError::InvalidDimensions {
        width: img.width(),
        height: img.height(),
    })?;
    let height = u32::try_from(img.height()).map_err(|_| HoughMatchError::InvalidDimensions {
        width: img.width(),
        height: img.height(),
    })?;
    let gray = image::GrayImage::from_raw(width, height, img.data().to_vec()).ok_or(
        HoughMatchError::BufferTooSmall {
            needed: img.width() * img.height(),
            got: img.data().len(),
        },
    )?;
    gray.save(path).map_err(|err| HoughMatchError::ImageIo {
        reason: err.to_string(),
    })
}
