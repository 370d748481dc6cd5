//! Display helpers for diagnostic views of code images and vote maps.

use crate::image::{ImageView, OwnedImage};
use crate::util::HoughMatchResult;

/// Min-max stretches any numeric image into the full `0..=255` range.
///
/// A constant image maps to all zeros.
pub fn stretch_to_u8<T>(view: ImageView<'_, T>) -> HoughMatchResult<OwnedImage<u8>>
where
    T: Copy + Into<f64>,
{
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for row in view.rows() {
        for &value in row {
            let v: f64 = value.into();
            lo = lo.min(v);
            hi = hi.max(v);
        }
    }

    let range = hi - lo;
    let scale = if range > 0.0 { 255.0 / range } else { 0.0 };
    let mut data = Vec::with_capacity(view.width() * view.height());
    for row in view.rows() {
        for &value in row {
            let v: f64 = value.into();
            data.push(((v - lo) * scale).round().clamp(0.0, 255.0) as u8);
        }
    }
    OwnedImage::new(data, view.width(), view.height())
}

#[cfg(test)]
mod tests {
    use super::stretch_to_u8;
    use crate::image::ImageView;

    #[test]
    fn stretch_spans_full_range() {
        let data = [10u32, 20, 30, 40];
        let view = ImageView::from_slice(&data, 2, 2).unwrap();
        let out = stretch_to_u8(view).unwrap();
        assert_eq!(out.data(), &[0u8, 85, 170, 255]);
    }

    #[test]
    fn stretch_of_constant_image_is_zero() {
        let data = [7u16; 6];
        let view = ImageView::from_slice(&data, 3, 2).unwrap();
        let out = stretch_to_u8(view).unwrap();
        assert!(out.data().iter().all(|&v| v == 0));
    }
}
