//! Image filtering and convolution operations.
//!
//! # Kernels
//!
//! - [`Kernel::blur`] - 3x3 Gaussian-like blur
//! - [`Kernel::sharpen`] - 5x5 sharpen
//! - [`Kernel::new`] - any square kernel with odd side length
//!
//! # Edge Policy
//!
//! Reads outside the image are clamped to the nearest edge pixel (replicate
//! border).
//!
//! # Example
//!
//! ```rust
//! use rgbkit_core::PixelBuffer;
//! use rgbkit_ops::filter::{convolve, Kernel};
//!
//! let src = PixelBuffer::filled(16, 16, [100, 150, 200]).unwrap();
//! let blurred = convolve(&src, &Kernel::blur());
//! assert_eq!(blurred, src);
//! ```

use crate::{OpsError, OpsResult};
use rgbkit_core::{clamp_sample, PixelBuffer};
#[allow(unused_imports)]
use tracing::{debug, trace};

/// Square convolution kernel.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    /// Kernel weights, row-major.
    data: Vec<f32>,
    /// Side length (always odd).
    size: usize,
}

impl Kernel {
    /// Creates a new kernel from row-major weights.
    ///
    /// # Errors
    ///
    /// The side length must be odd and `data` must hold `size * size` weights.
    pub fn new(data: Vec<f32>, size: usize) -> OpsResult<Self> {
        if size % 2 == 0 {
            return Err(OpsError::invalid("kernel size must be odd"));
        }
        if data.len() != size * size {
            return Err(OpsError::invalid(format!(
                "kernel data size {} doesn't match {}x{}",
                data.len(),
                size,
                size
            )));
        }
        Ok(Self { data, size })
    }

    /// Creates a kernel from nested rows.
    pub fn from_rows<const N: usize>(rows: [[f32; N]; N]) -> OpsResult<Self> {
        Self::new(rows.iter().flatten().copied().collect(), N)
    }

    /// 3x3 Gaussian-like blur.
    ///
    /// ```text
    /// 1/16 1/8 1/16
    /// 1/8  1/4 1/8
    /// 1/16 1/8 1/16
    /// ```
    pub fn blur() -> Self {
        const E: f32 = 1.0 / 16.0;
        const S: f32 = 1.0 / 8.0;
        const C: f32 = 1.0 / 4.0;
        Self {
            data: vec![
                E, S, E,
                S, C, S,
                E, S, E,
            ],
            size: 3,
        }
    }

    /// 5x5 sharpen: center `1`, inner ring `1/4`, outer ring `-1/8`.
    pub fn sharpen() -> Self {
        const O: f32 = -1.0 / 8.0;
        const I: f32 = 1.0 / 4.0;
        Self {
            data: vec![
                O, O, O, O, O,
                O, I, I, I, O,
                O, I, 1.0, I, O,
                O, I, I, I, O,
                O, O, O, O, O,
            ],
            size: 5,
        }
    }

    /// Side length.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Half the side length, the reach of the kernel around its center.
    #[inline]
    pub fn radius(&self) -> usize {
        self.size / 2
    }

    /// Weight at row `ky`, column `kx`.
    #[inline]
    pub fn weight(&self, ky: usize, kx: usize) -> f32 {
        self.data[ky * self.size + kx]
    }

    /// Sum of all weights.
    pub fn sum(&self) -> f32 {
        self.data.iter().sum()
    }
}

/// Applies a kernel to one pixel with clamp-to-edge sampling.
///
/// Each channel's weighted sum is rounded half-up then clamped to `[0, 255]`.
pub fn convolve_pixel(src: &PixelBuffer, kernel: &Kernel, x: u32, y: u32) -> [u8; 3] {
    let (w, h) = src.dimensions();
    let r = kernel.radius() as i64;
    let mut sums = [0.0f32; 3];

    for ky in 0..kernel.size() {
        // Source coordinates with edge clamping
        let sy = (y as i64 + ky as i64 - r).clamp(0, h as i64 - 1) as u32;
        for kx in 0..kernel.size() {
            let sx = (x as i64 + kx as i64 - r).clamp(0, w as i64 - 1) as u32;
            let kw = kernel.weight(ky, kx);
            let px = src.pixel(sx, sy);
            for c in 0..3 {
                sums[c] += kw * px[c] as f32;
            }
        }
    }

    sums.map(|s| clamp_sample((s + 0.5).floor() as i32))
}

/// Convolves every channel of the image with `kernel`.
///
/// Output has the same dimensions as the input and every sample is clamped
/// to `[0, 255]`.
pub fn convolve(src: &PixelBuffer, kernel: &Kernel) -> PixelBuffer {
    trace!(
        width = src.width(),
        height = src.height(),
        kernel = kernel.size(),
        "convolve"
    );
    src.map_coords(|x, y| convolve_pixel(src, kernel, x, y))
}

/// Convolves with [`Kernel::blur`].
pub fn blur(src: &PixelBuffer) -> PixelBuffer {
    convolve(src, &Kernel::blur())
}

/// Convolves with [`Kernel::sharpen`].
pub fn sharpen(src: &PixelBuffer) -> PixelBuffer {
    convolve(src, &Kernel::sharpen())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rgbkit_core::Channel;

    #[test]
    fn test_kernel_blur() {
        let k = Kernel::blur();
        assert_eq!(k.size(), 3);
        assert_eq!(k.radius(), 1);
        assert_relative_eq!(k.sum(), 1.0);
        assert_relative_eq!(k.weight(1, 1), 0.25);
    }

    #[test]
    fn test_kernel_sharpen() {
        let k = Kernel::sharpen();
        assert_eq!(k.size(), 5);
        assert_relative_eq!(k.weight(2, 2), 1.0);
        assert_relative_eq!(k.weight(1, 2), 0.25);
        assert_relative_eq!(k.weight(0, 4), -0.125);
        // 1 + 8 * 1/4 - 16 * 1/8
        assert_relative_eq!(k.sum(), 1.0);
    }

    #[test]
    fn test_kernel_validation() {
        assert!(Kernel::new(vec![1.0; 4], 2).is_err());
        assert!(Kernel::new(vec![1.0; 8], 3).is_err());
        let k = Kernel::from_rows([[0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 0.0]]).unwrap();
        assert_eq!(k.size(), 3);
    }

    #[test]
    fn test_convolve_constant() {
        // Constant image stays constant under a normalized kernel
        let src = PixelBuffer::filled(8, 8, [50, 128, 255]).unwrap();
        assert_eq!(blur(&src), src);
        assert_eq!(sharpen(&src), src);
    }

    #[test]
    fn test_convolve_identity_kernel() {
        let src = PixelBuffer::from_fn(5, 4, |x, y| [(x * 50) as u8, (y * 60) as u8, 9]).unwrap();
        let k = Kernel::new(
            {
                let mut d = vec![0.0; 25];
                d[12] = 1.0;
                d
            },
            5,
        )
        .unwrap();
        assert_eq!(convolve(&src, &k), src);
    }

    #[test]
    fn test_clamp_to_edge_border() {
        // Single bright column on the left edge. With replicate border the
        // corner pixel sees the bright column three times across each row.
        let src = PixelBuffer::from_fn(3, 3, |x, _| if x == 0 { [160, 0, 0] } else { [0, 0, 0] })
            .unwrap();
        let out = blur(&src);
        // (1/16 + 1/8 + 1/16 + 1/8 + 1/4 + 1/8) * 160 = 120 at the left border
        assert_eq!(out.sample(Channel::Red, 0, 0), 120);
        assert_eq!(out.sample(Channel::Red, 0, 1), 120);
        // Middle column: (1/16 + 1/8 + 1/16) * 160 = 40
        assert_eq!(out.sample(Channel::Red, 1, 1), 40);
        assert_eq!(out.sample(Channel::Red, 2, 1), 0);
    }

    #[test]
    fn test_rounding_half_up() {
        // 1x1 image: blur sums to exactly the sample, sharpen too
        let src = PixelBuffer::filled(1, 1, [7, 8, 9]).unwrap();
        assert_eq!(blur(&src).pixel(0, 0), [7, 8, 9]);
        // 3/16 * 8 = 1.5 rounds up to 2
        let k = Kernel::new(vec![3.0 / 16.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0], 3).unwrap();
        let single = PixelBuffer::filled(1, 1, [8, 8, 8]).unwrap();
        assert_eq!(convolve(&single, &k).pixel(0, 0), [2, 2, 2]);
    }

    #[test]
    fn test_output_in_range() {
        let src = PixelBuffer::from_fn(9, 7, |x, y| {
            if (x + y) % 2 == 0 { [255, 0, 255] } else { [0, 255, 0] }
        })
        .unwrap();
        let out = sharpen(&src);
        assert_eq!(out.dimensions(), src.dimensions());
        // Checkerboard extremes saturate rather than wrap
        assert!(out.plane(Channel::Red).iter().any(|&v| v == 255));
        assert!(out.plane(Channel::Red).iter().any(|&v| v == 0));
    }
}
