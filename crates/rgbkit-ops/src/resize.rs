//! Bilinear downscaling.
//!
//! Each output pixel `(x, y)` maps to source position `(x * w/new_w, y * h/new_h)`.
//! The four surrounding samples are blended horizontally first, truncated,
//! then blended vertically and truncated again. Neighbors past the last
//! row/column are clamped to it.
//!
//! # Example
//!
//! ```rust
//! use rgbkit_core::PixelBuffer;
//! use rgbkit_ops::resize::downscale;
//!
//! let src = PixelBuffer::filled(64, 48, [10, 20, 30]).unwrap();
//! let dst = downscale(&src, 16, 12).unwrap();
//! assert_eq!(dst.dimensions(), (16, 12));
//! assert_eq!(dst.pixel(5, 5), [10, 20, 30]);
//! ```

use crate::{OpsError, OpsResult};
use rgbkit_core::{clamp_sample, PixelBuffer};
#[allow(unused_imports)]
use tracing::{debug, trace};

/// Source coordinates and blend fraction along one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Tap {
    lo: u32,
    hi: u32,
    frac: f64,
}

impl Tap {
    #[inline]
    fn new(dst: u32, scale: f64, src_len: u32) -> Self {
        let pos = dst as f64 * scale;
        let lo = (pos.floor() as u32).min(src_len - 1);
        let hi = (lo + 1).min(src_len - 1);
        Self {
            lo,
            hi,
            frac: pos - lo as f64,
        }
    }
}

#[inline]
fn lerp_trunc(a: u8, b: u8, t: f64) -> i32 {
    ((1.0 - t) * a as f64 + t * b as f64) as i32
}

/// Samples `src` at fractional source coordinates described by two taps.
#[inline]
fn bilinear(src: &PixelBuffer, tx: Tap, ty: Tap) -> [u8; 3] {
    let tl = src.pixel(tx.lo, ty.lo);
    let tr = src.pixel(tx.hi, ty.lo);
    let bl = src.pixel(tx.lo, ty.hi);
    let br = src.pixel(tx.hi, ty.hi);
    std::array::from_fn(|c| {
        let top = lerp_trunc(tl[c], tr[c], tx.frac);
        let bottom = lerp_trunc(bl[c], br[c], tx.frac);
        clamp_sample(((1.0 - ty.frac) * top as f64 + ty.frac * bottom as f64) as i32)
    })
}

/// Shrinks `src` to `new_width` x `new_height`.
///
/// # Errors
///
/// Both target dimensions must be positive and no larger than the source.
pub fn downscale(src: &PixelBuffer, new_width: u32, new_height: u32) -> OpsResult<PixelBuffer> {
    let (w, h) = src.dimensions();
    if new_width == 0 || new_height == 0 || new_width > w || new_height > h {
        return Err(OpsError::invalid(format!(
            "invalid dimensions for downscaling: {w}x{h} -> {new_width}x{new_height}"
        )));
    }

    let x_scale = w as f64 / new_width as f64;
    let y_scale = h as f64 / new_height as f64;
    debug!(width = w, height = h, new_width, new_height, x_scale, y_scale, "downscale");

    let x_taps: Vec<Tap> = (0..new_width).map(|x| Tap::new(x, x_scale, w)).collect();
    let y_taps: Vec<Tap> = (0..new_height).map(|y| Tap::new(y, y_scale, h)).collect();

    Ok(PixelBuffer::from_fn(new_width, new_height, |x, y| {
        bilinear(src, x_taps[x as usize], y_taps[y as usize])
    })?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_image() {
        let src = PixelBuffer::filled(4, 4, [200, 200, 200]).unwrap();
        let dst = downscale(&src, 2, 2).unwrap();
        assert_eq!(dst, PixelBuffer::filled(2, 2, [200, 200, 200]).unwrap());
    }

    #[test]
    fn test_same_size_is_identity() {
        let src = PixelBuffer::from_fn(5, 3, |x, y| [(x * 50) as u8, (y * 80) as u8, 7]).unwrap();
        assert_eq!(downscale(&src, 5, 3).unwrap(), src);
    }

    #[test]
    fn test_interpolation() {
        // 3 -> 2 columns: scale 1.5, output x=1 samples between columns 1 and 2
        let src = PixelBuffer::from_fn(3, 1, |x, _| [[0, 100, 201][x as usize], 0, 0]).unwrap();
        let dst = downscale(&src, 2, 1).unwrap();
        assert_eq!(dst.pixel(0, 0), [0, 0, 0]);
        // 0.5 * 100 + 0.5 * 201 = 150.5 -> 150
        assert_eq!(dst.pixel(1, 0), [150, 0, 0]);
    }

    #[test]
    fn test_halving_picks_even_samples() {
        let src = PixelBuffer::from_fn(4, 4, |x, y| [(x * 10) as u8, (y * 10) as u8, 0]).unwrap();
        let dst = downscale(&src, 2, 2).unwrap();
        assert_eq!(dst.pixel(1, 1), [20, 20, 0]);
    }

    #[test]
    fn test_rejects_bad_targets() {
        let src = PixelBuffer::new(4, 4).unwrap();
        assert!(matches!(
            downscale(&src, 0, 2),
            Err(OpsError::InvalidParameter(_))
        ));
        assert!(downscale(&src, 2, 0).is_err());
        assert!(downscale(&src, 5, 4).is_err());
        assert!(downscale(&src, 4, 8).is_err());
    }
}
