//! Lossy compression with a single-level 2D Haar wavelet.
//!
//! Pipeline per channel:
//!
//! 1. pad odd dimensions with one zero column/row
//! 2. forward Haar transform into four quadrants (LL, LH, HL, HH)
//! 3. zero every coefficient whose magnitude is below the threshold
//! 4. inverse transform
//! 5. crop to the source size and clamp to `[0, 255]`
//!
//! The forward step divides each coefficient by 4 with integer truncation and
//! the inverse step adds the four coefficients back without dividing, so the
//! pair is an exact inverse apart from the truncation.

use crate::{OpsError, OpsResult};
use rgbkit_core::{clamp_sample, Channel, PixelBuffer};
#[allow(unused_imports)]
use tracing::{debug, trace};

const BASE_THRESHOLD: i32 = 50;
const MAX_THRESHOLD: i32 = 250;
const COMPRESSION_FACTOR: f64 = 0.7;

/// Coefficient magnitude below which a coefficient is discarded.
///
/// `percent` is scaled by 0.7 and truncated, then mapped linearly onto
/// `[50, 250]` with truncation.
pub fn compression_threshold(percent: f64) -> i32 {
    let adjusted = (percent * COMPRESSION_FACTOR) as i32;
    BASE_THRESHOLD + ((MAX_THRESHOLD - BASE_THRESHOLD) as f64 * (adjusted as f64 / 100.0)) as i32
}

/// Integer coefficient plane with even dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plane {
    width: usize,
    height: usize,
    data: Vec<i32>,
}

impl Plane {
    /// Copies one channel of `src`, padding odd dimensions with zeros.
    pub fn padded(src: &PixelBuffer, channel: Channel) -> Self {
        let (w, h) = (src.width() as usize, src.height() as usize);
        let width = w + w % 2;
        let height = h + h % 2;
        let mut data = vec![0i32; width * height];
        for (y, row) in src.plane(channel).chunks_exact(w).enumerate() {
            for (x, &v) in row.iter().enumerate() {
                data[y * width + x] = v as i32;
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Padded width.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Padded height.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Value at `(x, y)`.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> i32 {
        self.data[y * self.width + x]
    }

    /// Forward Haar transform.
    ///
    /// Block `(a, b; c, d)` at origin `(x, y)` yields
    /// `LL = (a+b+c+d)/4` at `(x/2, y/2)`,
    /// `LH = (a+b-c-d)/4` at `(w/2 + x/2, y/2)`,
    /// `HL = (a-b+c-d)/4` at `(x/2, h/2 + y/2)` and
    /// `HH = (a-b-c+d)/4` at `(w/2 + x/2, h/2 + y/2)`.
    pub fn forward(&self) -> Self {
        let (w, h) = (self.width, self.height);
        let (hw, hh) = (w / 2, h / 2);
        let mut out = vec![0i32; w * h];
        for by in 0..hh {
            for bx in 0..hw {
                let a = self.get(2 * bx, 2 * by);
                let b = self.get(2 * bx + 1, 2 * by);
                let c = self.get(2 * bx, 2 * by + 1);
                let d = self.get(2 * bx + 1, 2 * by + 1);
                out[by * w + bx] = (a + b + c + d) / 4;
                out[by * w + hw + bx] = (a + b - c - d) / 4;
                out[(hh + by) * w + bx] = (a - b + c - d) / 4;
                out[(hh + by) * w + hw + bx] = (a - b - c + d) / 4;
            }
        }
        Self {
            width: w,
            height: h,
            data: out,
        }
    }

    /// Inverse of [`Plane::forward`], without renormalization.
    pub fn inverse(&self) -> Self {
        let (w, h) = (self.width, self.height);
        let (hw, hh) = (w / 2, h / 2);
        let mut out = vec![0i32; w * h];
        for by in 0..hh {
            for bx in 0..hw {
                let ll = self.get(bx, by);
                let lh = self.get(hw + bx, by);
                let hl = self.get(bx, hh + by);
                let hh_ = self.get(hw + bx, hh + by);
                out[2 * by * w + 2 * bx] = ll + lh + hl + hh_;
                out[2 * by * w + 2 * bx + 1] = ll + lh - hl - hh_;
                out[(2 * by + 1) * w + 2 * bx] = ll - lh + hl - hh_;
                out[(2 * by + 1) * w + 2 * bx + 1] = ll - lh - hl + hh_;
            }
        }
        Self {
            width: w,
            height: h,
            data: out,
        }
    }

    /// Zeroes every value with `|v| < threshold`. Returns how many were zeroed.
    pub fn threshold(&mut self, threshold: i32) -> usize {
        let mut zeroed = 0;
        for v in &mut self.data {
            if v.abs() < threshold {
                if *v != 0 {
                    zeroed += 1;
                }
                *v = 0;
            }
        }
        zeroed
    }

    /// Crops to `width` x `height` and clamps into an 8-bit plane.
    fn into_samples(self, width: usize, height: usize) -> Vec<u8> {
        let mut out = Vec::with_capacity(width * height);
        for y in 0..height {
            let row = &self.data[y * self.width..y * self.width + width];
            out.extend(row.iter().map(|&v| clamp_sample(v)));
        }
        out
    }
}

/// Compresses `src` by discarding small Haar coefficients.
///
/// # Errors
///
/// `percent` must lie in `[0, 100]`.
///
/// # Example
///
/// ```rust
/// use rgbkit_core::PixelBuffer;
/// use rgbkit_ops::wavelet::compress;
///
/// let img = PixelBuffer::filled(5, 3, [200, 120, 90]).unwrap();
/// let out = compress(&img, 40.0).unwrap();
/// assert_eq!(out.dimensions(), (5, 3));
/// ```
pub fn compress(src: &PixelBuffer, percent: f64) -> OpsResult<PixelBuffer> {
    if !(0.0..=100.0).contains(&percent) {
        return Err(OpsError::invalid(format!(
            "compression percentage must be between 0 and 100, got {percent}"
        )));
    }
    let threshold = compression_threshold(percent);
    let (w, h) = src.dimensions();
    debug!(width = w, height = h, percent, threshold, "compress");

    let planes = Channel::ALL.map(|channel| {
        let mut coeffs = Plane::padded(src, channel).forward();
        let zeroed = coeffs.threshold(threshold);
        trace!(%channel, zeroed, "compress: thresholded");
        coeffs.inverse().into_samples(w as usize, h as usize)
    });
    let [r, g, b] = planes;
    Ok(PixelBuffer::from_planes(w, h, r, g, b)?)
}
