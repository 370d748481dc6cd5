//! Separable Sobel derivatives with reflect-101 border extension.
//!
//! Aperture 1 uses the bare `[-1, 0, 1]` difference with no smoothing. Larger
//! odd apertures `k` smooth with the length-`k` binomial row and differentiate
//! with `[-1, 0, 1]` convolved with the length-`k - 2` binomial row, which gives
//! the familiar `[-1, -2, 0, 2, 1]` at `k = 5`.

use crate::image::ImageView;

/// Largest supported aperture.
pub(crate) const MAX_APERTURE: usize = 31;

/// Horizontal and vertical derivative images in row-major order.
pub(crate) struct Gradients {
    pub(crate) gx: Vec<f32>,
    pub(crate) gy: Vec<f32>,
}

fn binomial(taps: usize) -> Vec<f32> {
    let mut row = vec![1.0f32];
    for _ in 1..taps {
        let mut next = vec![1.0f32; row.len() + 1];
        for i in 1..row.len() {
            next[i] = row[i - 1] + row[i];
        }
        row = next;
    }
    row
}

pub(crate) fn smoothing_kernel(aperture: usize) -> Vec<f32> {
    if aperture <= 1 {
        return vec![1.0];
    }
    binomial(aperture)
}

pub(crate) fn derivative_kernel(aperture: usize) -> Vec<f32> {
    let base = if aperture <= 1 {
        vec![1.0]
    } else {
        binomial(aperture - 2)
    };
    let diff = [-1.0f32, 0.0, 1.0];
    let mut out = vec![0.0f32; base.len() + diff.len() - 1];
    for (i, &b) in base.iter().enumerate() {
        for (j, &d) in diff.iter().enumerate() {
            out[i + j] += b * d;
        }
    }
    out
}

/// Maps an out-of-range index back into `0..n` by mirroring without repeating
/// the edge pixel (`gfedcb|abcdefgh|gfedcba`).
pub(crate) fn reflect101(mut i: isize, n: usize) -> usize {
    if n <= 1 {
        return 0;
    }
    let last = n as isize - 1;
    while i < 0 || i > last {
        if i < 0 {
            i = -i;
        } else {
            i = 2 * last - i;
        }
    }
    i as usize
}

/// Correlates rows with `kx`, then columns with `ky`.
fn separable(src: &[f32], width: usize, height: usize, kx: &[f32], ky: &[f32]) -> Vec<f32> {
    let rx = (kx.len() / 2) as isize;
    let ry = (ky.len() / 2) as isize;

    let mut tmp = vec![0.0f32; src.len()];
    for y in 0..height {
        let row = &src[y * width..(y + 1) * width];
        let out = &mut tmp[y * width..(y + 1) * width];
        for (x, dst) in out.iter_mut().enumerate() {
            let mut acc = 0.0f32;
            for (k, &w) in kx.iter().enumerate() {
                let sx = reflect101(x as isize + k as isize - rx, width);
                acc += w * row[sx];
            }
            *dst = acc;
        }
    }

    let mut out = vec![0.0f32; src.len()];
    for y in 0..height {
        for (k, &w) in ky.iter().enumerate() {
            if w == 0.0 {
                continue;
            }
            let sy = reflect101(y as isize + k as isize - ry, height);
            let src_row = &tmp[sy * width..(sy + 1) * width];
            let dst_row = &mut out[y * width..(y + 1) * width];
            for (dst, &v) in dst_row.iter_mut().zip(src_row) {
                *dst += w * v;
            }
        }
    }
    out
}

/// Computes Sobel `dx` and `dy` for a grayscale view.
///
/// `aperture` must already be odd and at most [`MAX_APERTURE`].
pub(crate) fn sobel(image: ImageView<'_, u8>, aperture: usize) -> Gradients {
    let width = image.width();
    let height = image.height();
    let mut src = Vec::with_capacity(width * height);
    for row in image.rows() {
        src.extend(row.iter().map(|&v| f32::from(v)));
    }

    let deriv = derivative_kernel(aperture);
    let smooth = smoothing_kernel(aperture);
    let gx = separable(&src, width, height, &deriv, &smooth);
    let gy = separable(&src, width, height, &smooth, &deriv);
    Gradients { gx, gy }
}

#[cfg(test)]
mod tests {
    use super::{derivative_kernel, reflect101, smoothing_kernel, sobel};
    use crate::image::ImageView;

    #[test]
    fn kernels_match_classic_sobel_taps() {
        assert_eq!(derivative_kernel(1), vec![-1.0, 0.0, 1.0]);
        assert_eq!(smoothing_kernel(1), vec![1.0]);
        assert_eq!(derivative_kernel(3), vec![-1.0, 0.0, 1.0]);
        assert_eq!(smoothing_kernel(3), vec![1.0, 2.0, 1.0]);
        assert_eq!(derivative_kernel(5), vec![-1.0, -2.0, 0.0, 2.0, 1.0]);
        assert_eq!(smoothing_kernel(5), vec![1.0, 4.0, 6.0, 4.0, 1.0]);
        assert_eq!(derivative_kernel(7).len(), 7);
        let sum: f32 = derivative_kernel(7).iter().sum();
        assert_eq!(sum, 0.0);
    }

    #[test]
    fn reflect101_mirrors_without_edge_repeat() {
        assert_eq!(reflect101(-1, 5), 1);
        assert_eq!(reflect101(-2, 5), 2);
        assert_eq!(reflect101(5, 5), 3);
        assert_eq!(reflect101(6, 5), 2);
        assert_eq!(reflect101(-7, 3), 1);
        assert_eq!(reflect101(-3, 1), 0);
    }

    #[test]
    fn horizontal_ramp_has_pure_x_gradient() {
        let width = 6;
        let height = 4;
        let data: Vec<u8> = (0..height)
            .flat_map(|_| (0..width).map(|x| (x * 10) as u8))
            .collect();
        let view = ImageView::from_slice(&data, width, height).unwrap();
        let grad = sobel(view, 3);
        // Interior: (I(x+1) - I(x-1)) * (1 + 2 + 1).
        assert_eq!(grad.gx[width + 2], 80.0);
        assert!(grad.gy.iter().all(|&v| v == 0.0));
        // Reflect-101 cancels the derivative on the border column.
        assert_eq!(grad.gx[width], 0.0);
    }
}
