//! Gradient orientation encoding.
//!
//! Turns a grayscale image into an orientation-code image: Sobel derivatives
//! are converted to magnitude and angle, pixels whose magnitude does not exceed
//! a fraction of the image's own peak magnitude get code `0`, and the rest get
//! their angle quantized into `1..=steps`. The threshold is relative, so the
//! same fraction adapts to the contrast of each frame.

mod quantize;
pub(crate) mod sobel;

pub use quantize::Quantizer;

use crate::image::{ImageView, OwnedImage};
use crate::trace::{trace_event, trace_span};
use crate::util::math::{clamp_finite, odd_clamped};
use crate::util::{HoughMatchError, HoughMatchResult};

/// Default relative gradient-magnitude threshold.
pub const DEFAULT_MAGNITUDE_THRESHOLD: f32 = 0.2;

/// Encoder settings shared by template and scene encoding.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EncodeParams {
    /// Sobel aperture; normalized to an odd value in `1..=31`.
    pub sobel_kernel_size: usize,
    /// Fraction of the peak magnitude a pixel must exceed to carry a code.
    pub magnitude_threshold: f32,
    /// Angle quantizer; also fixes the codebook size.
    pub quantizer: Quantizer,
}

impl EncodeParams {
    /// Returns a copy with the aperture made odd in `1..=31` and the threshold
    /// clamped to `[0, 1]` (non-finite values fall back to
    /// [`DEFAULT_MAGNITUDE_THRESHOLD`]).
    pub fn normalized(&self) -> Self {
        Self {
            sobel_kernel_size: odd_clamped(self.sobel_kernel_size, sobel::MAX_APERTURE),
            magnitude_threshold: clamp_finite(
                self.magnitude_threshold,
                0.0,
                1.0,
                DEFAULT_MAGNITUDE_THRESHOLD,
            ),
            quantizer: self.quantizer,
        }
    }
}

/// Orientation-code image tagged with the codebook it was produced with.
#[derive(Clone, Debug, PartialEq)]
pub struct CodeImage {
    img: OwnedImage<u8>,
    max_code: u8,
}

impl CodeImage {
    /// Wraps externally produced codes, rejecting values above the quantizer's
    /// `max_code`.
    pub fn from_raw(
        data: Vec<u8>,
        width: usize,
        height: usize,
        quantizer: Quantizer,
    ) -> HoughMatchResult<Self> {
        let max_code = quantizer.max_code();
        if let Some(&code) = data.iter().find(|&&code| code > max_code) {
            return Err(HoughMatchError::CodeOutOfRange { code, max_code });
        }
        let img = OwnedImage::new(data, width, height)?;
        Ok(Self { img, max_code })
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.img.width()
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.img.height()
    }

    /// Largest code this image may contain.
    pub fn max_code(&self) -> u8 {
        self.max_code
    }

    /// Returns a borrowed view of the codes.
    pub fn view(&self) -> ImageView<'_, u8> {
        self.img.view()
    }

    /// Returns the row-major code buffer.
    pub fn data(&self) -> &[u8] {
        self.img.data()
    }

    /// Number of pixels with a nonzero code.
    pub fn feature_count(&self) -> usize {
        self.img.data().iter().filter(|&&code| code != 0).count()
    }

    /// Unwraps the underlying image.
    pub fn into_image(self) -> OwnedImage<u8> {
        self.img
    }
}

/// Encodes the gradient orientations of `image` into a [`CodeImage`].
///
/// Flat or empty images produce an all-zero code image.
pub fn encode_orientations(
    image: ImageView<'_, u8>,
    params: &EncodeParams,
) -> HoughMatchResult<CodeImage> {
    let width = image.width();
    let height = image.height();
    let params = params.normalized();
    let aperture = params.sobel_kernel_size;
    let fraction = params.magnitude_threshold;
    let quantizer = params.quantizer;

    let _span = trace_span!("encode", width = width, height = height, aperture = aperture).entered();

    if image.is_empty() {
        let img = OwnedImage::new(Vec::new(), width, height)?;
        return Ok(CodeImage {
            img,
            max_code: quantizer.max_code(),
        });
    }

    let grad = sobel::sobel(image, aperture);
    let magnitude: Vec<f32> = grad
        .gx
        .iter()
        .zip(&grad.gy)
        .map(|(&dx, &dy)| dx.hypot(dy))
        .collect();
    let peak = magnitude.iter().copied().fold(0.0f32, f32::max);
    let threshold = peak * fraction;

    let codes: Vec<u8> = magnitude
        .iter()
        .zip(grad.gx.iter().zip(&grad.gy))
        .map(|(&mag, (&dx, &dy))| {
            if mag > threshold {
                quantizer.code_for(dy.atan2(dx))
            } else {
                0
            }
        })
        .collect();

    let out = CodeImage {
        img: OwnedImage::new(codes, width, height)?,
        max_code: quantizer.max_code(),
    };
    trace_event!("encoded", peak_magnitude = peak, features = out.feature_count());
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::{encode_orientations, CodeImage, EncodeParams, Quantizer};
    use crate::config::MatcherConfig;
    use crate::image::ImageView;
    use crate::util::HoughMatchError;

    fn params(steps: usize) -> EncodeParams {
        EncodeParams {
            sobel_kernel_size: 3,
            magnitude_threshold: 0.2,
            quantizer: Quantizer::new(steps),
        }
    }

    #[test]
    fn flat_image_has_no_codes() {
        let data = [128u8; 64];
        let view = ImageView::from_slice(&data, 8, 8).unwrap();
        let codes = encode_orientations(view, &params(8)).unwrap();
        assert_eq!(codes.feature_count(), 0);
        assert_eq!(codes.max_code(), 9);
    }

    #[test]
    fn empty_image_encodes_to_empty_codes() {
        let view = ImageView::<u8>::from_slice(&[], 0, 5).unwrap();
        let codes = encode_orientations(view, &params(8)).unwrap();
        assert_eq!((codes.width(), codes.height()), (0, 5));
        assert!(codes.data().is_empty());
    }

    #[test]
    fn vertical_step_edge_codes_match_direction() {
        // Dark left half, bright right half: gradient points along +x (angle 0).
        let width = 10;
        let height = 6;
        let data: Vec<u8> = (0..height)
            .flat_map(|_| (0..width).map(|x| if x < 5 { 0u8 } else { 200 }))
            .collect();
        let view = ImageView::from_slice(&data, width, height).unwrap();
        let codes = encode_orientations(view, &params(8)).unwrap();
        for y in 0..height {
            let row = codes.view().row(y).unwrap();
            assert_eq!(row[4], 1);
            assert_eq!(row[5], 1);
            assert_eq!(row[0], 0);
            assert_eq!(row[9], 0);
        }

        // Flipped polarity points along -x, half a turn away.
        let flipped: Vec<u8> = data.iter().map(|&v| 200 - v).collect();
        let view = ImageView::from_slice(&flipped, width, height).unwrap();
        let codes = encode_orientations(view, &params(8)).unwrap();
        assert_eq!(codes.view().get(4, 2).copied(), Some(5));
    }

    #[test]
    fn nan_threshold_matches_matcher_config_path() {
        // Horizontal ramp with a bright band: magnitudes vary across the image.
        let data: Vec<u8> = (0..16)
            .flat_map(|_| (0..16u8).map(|x| if (6..10).contains(&x) { 200 } else { x * 4 }))
            .collect();
        let view = ImageView::from_slice(&data, 16, 16).unwrap();

        let direct = EncodeParams {
            magnitude_threshold: f32::NAN,
            ..params(8)
        };
        let cfg = MatcherConfig {
            sobel_kernel_size: 3,
            magnitude_threshold: f32::NAN,
            quantization_steps: 8,
            ..MatcherConfig::default()
        };
        assert_eq!(direct.normalized(), cfg.encode_params());

        let a = encode_orientations(view, &direct).unwrap();
        let b = encode_orientations(view, &cfg.encode_params()).unwrap();
        assert_eq!(a, b);
        assert_eq!(direct.normalized().magnitude_threshold, 0.2);
    }

    #[test]
    fn raw_codes_are_validated_against_quantizer() {
        let q = Quantizer::new(4);
        assert!(CodeImage::from_raw(vec![0, 1, 5, 2], 2, 2, q).is_ok());
        let err = CodeImage::from_raw(vec![0, 6, 1, 2], 2, 2, q).unwrap_err();
        assert_eq!(
            err,
            HoughMatchError::CodeOutOfRange {
                code: 6,
                max_code: 5,
            }
        );
    }
}
