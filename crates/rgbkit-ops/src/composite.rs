//! Mask-gated and split-view compositing.
//!
//! Both composites compute the full transformed image first and then pick,
//! per pixel, either the transformed or the untouched source pixel:
//!
//! - [`apply_masked`] selects by mask: a mask pixel whose red sample is `0`
//!   takes the transformed pixel, anything else keeps the source.
//! - [`split_view`] selects by column: columns left of `width * percent / 100`
//!   take the transformed pixel, the rest keep the source.
//!
//! # Example
//!
//! ```rust
//! use rgbkit_core::PixelBuffer;
//! use rgbkit_ops::composite::{split_view, SplitOp};
//!
//! let src = PixelBuffer::filled(10, 2, [100, 150, 200]).unwrap();
//! let out = split_view(&src, 50, &SplitOp::Greyscale).unwrap();
//! assert_eq!(out.pixel(4, 0), [150, 150, 150]);
//! assert_eq!(out.pixel(5, 0), [100, 150, 200]);
//! ```

use crate::filter::{blur, sharpen};
use crate::histogram::color_correct;
use crate::levels::{levels_adjust, Levels};
use crate::point::{component, greyscale, sepia, Component};
use crate::{OpsError, OpsResult};
use rgbkit_core::{Channel, PixelBuffer};
use std::fmt;
#[allow(unused_imports)]
use tracing::{debug, trace};

/// Operations that accept a mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskedOp {
    /// 3x3 blur.
    Blur,
    /// 5x5 sharpen.
    Sharpen,
    /// Sepia tone.
    Sepia,
    /// Intensity greyscale.
    Greyscale,
    /// Channel or derived component visualization.
    Component(Component),
}

impl MaskedOp {
    /// Runs the operation over the whole image.
    pub fn apply(&self, src: &PixelBuffer) -> PixelBuffer {
        match self {
            MaskedOp::Blur => blur(src),
            MaskedOp::Sharpen => sharpen(src),
            MaskedOp::Sepia => sepia(src),
            MaskedOp::Greyscale => greyscale(src),
            MaskedOp::Component(kind) => component(src, *kind),
        }
    }
}

impl fmt::Display for MaskedOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaskedOp::Blur => f.write_str("blur"),
            MaskedOp::Sharpen => f.write_str("sharpen"),
            MaskedOp::Sepia => f.write_str("sepia"),
            MaskedOp::Greyscale => f.write_str("greyscale"),
            MaskedOp::Component(kind) => write!(f, "{kind}-component"),
        }
    }
}

/// Operations that can be previewed with [`split_view`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitOp {
    /// 3x3 blur.
    Blur,
    /// 5x5 sharpen.
    Sharpen,
    /// Sepia tone.
    Sepia,
    /// Intensity greyscale.
    Greyscale,
    /// Histogram peak alignment, computed over the whole image.
    ColorCorrect,
    /// Levels curve.
    Levels(Levels),
}

impl SplitOp {
    /// Resolves an operation keyword.
    ///
    /// `levels-adjust` (alias `levels`) needs exactly three trailing values:
    /// black, mid and white. Other operations take none.
    ///
    /// # Errors
    ///
    /// Unknown keywords, a wrong number of values and invalid levels points.
    pub fn parse(name: &str, params: &[i32]) -> OpsResult<Self> {
        let op = match name.to_ascii_lowercase().as_str() {
            "blur" => SplitOp::Blur,
            "sharpen" => SplitOp::Sharpen,
            "sepia" => SplitOp::Sepia,
            "greyscale" => SplitOp::Greyscale,
            "color-correct" | "colorcorrect" => SplitOp::ColorCorrect,
            "levels-adjust" | "levels" => {
                return match params {
                    &[black, mid, white] => Ok(SplitOp::Levels(Levels::new(black, mid, white)?)),
                    _ => Err(OpsError::invalid(
                        "levels-adjust split requires black, mid and white values",
                    )),
                };
            }
            _ => return Err(OpsError::invalid(format!("unsupported split operation: {name}"))),
        };
        if !params.is_empty() {
            return Err(OpsError::invalid(format!(
                "{op} split takes no extra values, got {}",
                params.len()
            )));
        }
        Ok(op)
    }

    /// Runs the operation over the whole image.
    pub fn apply(&self, src: &PixelBuffer) -> PixelBuffer {
        match self {
            SplitOp::Blur => blur(src),
            SplitOp::Sharpen => sharpen(src),
            SplitOp::Sepia => sepia(src),
            SplitOp::Greyscale => greyscale(src),
            SplitOp::ColorCorrect => color_correct(src),
            SplitOp::Levels(levels) => levels_adjust(src, levels),
        }
    }
}

impl fmt::Display for SplitOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SplitOp::Blur => "blur",
            SplitOp::Sharpen => "sharpen",
            SplitOp::Sepia => "sepia",
            SplitOp::Greyscale => "greyscale",
            SplitOp::ColorCorrect => "color-correct",
            SplitOp::Levels(_) => "levels-adjust",
        })
    }
}

/// Applies `op` where the mask's red sample is `0`, keeps the source elsewhere.
///
/// # Errors
///
/// Returns [`OpsError::SizeMismatch`] if mask and source differ in size.
pub fn apply_masked(src: &PixelBuffer, mask: &PixelBuffer, op: MaskedOp) -> OpsResult<PixelBuffer> {
    if !src.same_dimensions(mask) {
        return Err(OpsError::size_mismatch(
            "mask",
            src.dimensions(),
            mask.dimensions(),
        ));
    }
    trace!(width = src.width(), height = src.height(), %op, "apply_masked");
    let transformed = op.apply(src);
    Ok(select(src, &transformed, |x, y| {
        mask.sample(Channel::Red, x, y) == 0
    }))
}

/// Column where a split at `percent` begins keeping the source.
#[inline]
pub fn split_index(width: u32, percent: u32) -> u32 {
    (width as u64 * percent as u64 / 100) as u32
}

/// Applies `op` to the columns left of `width * percent / 100` only.
///
/// # Errors
///
/// `percent` must lie in `[0, 100]`.
pub fn split_view(src: &PixelBuffer, percent: i32, op: &SplitOp) -> OpsResult<PixelBuffer> {
    if !(0..=100).contains(&percent) {
        return Err(OpsError::invalid(format!(
            "split percentage must be between 0 and 100, got {percent}"
        )));
    }
    let index = split_index(src.width(), percent as u32);
    debug!(width = src.width(), height = src.height(), %op, percent, index, "split_view");
    let transformed = op.apply(src);
    Ok(select(src, &transformed, |x, _| x < index))
}

/// Picks the transformed pixel where `take` holds, the source pixel elsewhere.
fn select<F>(src: &PixelBuffer, transformed: &PixelBuffer, take: F) -> PixelBuffer
where
    F: Fn(u32, u32) -> bool,
{
    src.map_coords(|x, y| {
        if take(x, y) {
            transformed.pixel(x, y)
        } else {
            src.pixel(x, y)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(w: u32, h: u32) -> PixelBuffer {
        PixelBuffer::from_fn(w, h, |x, y| [(x * 25) as u8, (y * 60) as u8, 90]).unwrap()
    }

    #[test]
    fn test_mask_all_zero_equals_full_op() {
        let src = gradient(6, 4);
        let mask = PixelBuffer::new(6, 4).unwrap();
        let out = apply_masked(&src, &mask, MaskedOp::Sepia).unwrap();
        assert_eq!(out, sepia(&src));
    }

    #[test]
    fn test_mask_all_set_keeps_source() {
        let src = gradient(6, 4);
        let mask = PixelBuffer::filled(6, 4, [255, 255, 255]).unwrap();
        for op in [
            MaskedOp::Blur,
            MaskedOp::Sharpen,
            MaskedOp::Greyscale,
            MaskedOp::Component(Component::Luma),
        ] {
            assert_eq!(apply_masked(&src, &mask, op).unwrap(), src);
        }
    }

    #[test]
    fn test_mask_reads_red_only() {
        let src = PixelBuffer::filled(2, 1, [100, 150, 200]).unwrap();
        // Left pixel: red 0 with nonzero green/blue still selects the transform
        let mask = PixelBuffer::from_fn(2, 1, |x, _| if x == 0 { [0, 255, 255] } else { [1, 0, 0] })
            .unwrap();
        let out = apply_masked(&src, &mask, MaskedOp::Component(Component::Red)).unwrap();
        assert_eq!(out.pixel(0, 0), [100, 0, 0]);
        assert_eq!(out.pixel(1, 0), [100, 150, 200]);
    }

    #[test]
    fn test_mask_blur_reads_unmasked_neighbors() {
        // Only the center is masked in, but its blur still sees the whole source
        let src = PixelBuffer::from_fn(3, 3, |x, _| if x == 0 { [160, 0, 0] } else { [0, 0, 0] })
            .unwrap();
        let mask = PixelBuffer::from_fn(3, 3, |x, y| if (x, y) == (1, 1) { [0; 3] } else { [255; 3] })
            .unwrap();
        let out = apply_masked(&src, &mask, MaskedOp::Blur).unwrap();
        assert_eq!(out.pixel(1, 1), [40, 0, 0]);
        assert_eq!(out.pixel(0, 0), [160, 0, 0]);
    }

    #[test]
    fn test_mask_size_mismatch() {
        let src = gradient(4, 4);
        let mask = PixelBuffer::new(4, 3).unwrap();
        assert!(matches!(
            apply_masked(&src, &mask, MaskedOp::Blur),
            Err(OpsError::SizeMismatch(_))
        ));
    }

    #[test]
    fn test_split_extremes() {
        let src = gradient(7, 3);
        assert_eq!(split_view(&src, 0, &SplitOp::Sepia).unwrap(), src);
        assert_eq!(split_view(&src, 100, &SplitOp::Sepia).unwrap(), sepia(&src));
    }

    #[test]
    fn test_split_boundary_column() {
        let src = gradient(10, 2);
        let out = split_view(&src, 35, &SplitOp::Greyscale).unwrap();
        // index = 10 * 35 / 100 = 3
        assert_eq!(split_index(10, 35), 3);
        let grey = greyscale(&src);
        assert_eq!(out.pixel(2, 1), grey.pixel(2, 1));
        assert_eq!(out.pixel(3, 1), src.pixel(3, 1));
    }

    #[test]
    fn test_split_levels() {
        let src = gradient(4, 1);
        let op = SplitOp::parse("levels", &[20, 100, 200]).unwrap();
        let out = split_view(&src, 50, &op).unwrap();
        let full = levels_adjust(&src, &Levels::new(20, 100, 200).unwrap());
        assert_eq!(out.pixel(1, 0), full.pixel(1, 0));
        assert_eq!(out.pixel(2, 0), src.pixel(2, 0));
    }

    #[test]
    fn test_split_parse() {
        assert_eq!(SplitOp::parse("ColorCorrect", &[]).unwrap(), SplitOp::ColorCorrect);
        assert_eq!(SplitOp::parse("color-correct", &[]).unwrap(), SplitOp::ColorCorrect);
        assert!(SplitOp::parse("levels-adjust", &[10, 20]).is_err());
        assert!(matches!(
            SplitOp::parse("blur", &[1, 2, 3]),
            Err(OpsError::InvalidParameter(_))
        ));
        assert!(SplitOp::parse("levels-adjust", &[30, 20, 10]).is_err());
        assert!(matches!(
            SplitOp::parse("emboss", &[]),
            Err(OpsError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_split_rejects_percent() {
        let src = gradient(4, 4);
        assert!(split_view(&src, -1, &SplitOp::Blur).is_err());
        assert!(split_view(&src, 101, &SplitOp::Blur).is_err());
    }
}
