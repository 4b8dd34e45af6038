//! Levels adjustment: a black/mid/white tone curve.
//!
//! The curve is quadratic from the black point up to the mid point and linear
//! from the mid point up to the white point:
//!
//! ```text
//! v <= black          -> 0
//! black < v <= mid    -> a*v^2 + b*v + c     with f(black) = 0, f(mid) = 128
//! mid < v < white     -> 128 + 127/(white - mid) * (v - mid)
//! v >= white          -> 255
//! ```
//!
//! # Example
//!
//! ```rust
//! use rgbkit_ops::levels::Levels;
//!
//! let levels = Levels::new(0, 128, 255).unwrap();
//! assert_eq!(levels.apply(0), 0);
//! assert_eq!(levels.apply(128), 128);
//! assert_eq!(levels.apply(255), 255);
//! ```

use crate::{OpsError, OpsResult};
use rgbkit_core::{clamp_sample, PixelBuffer};
#[allow(unused_imports)]
use tracing::{debug, trace};

/// Validated black, mid and white points with a precomputed lookup table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Levels {
    black: u8,
    mid: u8,
    white: u8,
    lut: [u8; 256],
}

impl Levels {
    /// Creates a curve from its three reference points.
    ///
    /// # Errors
    ///
    /// Every point must lie in `[0, 255]` and `black < mid < white` must hold.
    pub fn new(black: i32, mid: i32, white: i32) -> OpsResult<Self> {
        for (name, v) in [("black", black), ("mid", mid), ("white", white)] {
            if !(0..=255).contains(&v) {
                return Err(OpsError::invalid(format!(
                    "{name} point {v} must be in range [0, 255]"
                )));
            }
        }
        if !(black < mid && mid < white) {
            return Err(OpsError::invalid(format!(
                "levels points must satisfy black < mid < white, got {black} {mid} {white}"
            )));
        }

        let (black, mid, white) = (black as u8, mid as u8, white as u8);
        let mut lut = [0u8; 256];
        for (v, out) in lut.iter_mut().enumerate() {
            *out = curve(v as f64, black as f64, mid as f64, white as f64);
        }
        Ok(Self {
            black,
            mid,
            white,
            lut,
        })
    }

    /// Black point.
    pub fn black(&self) -> u8 {
        self.black
    }

    /// Mid point.
    pub fn mid(&self) -> u8 {
        self.mid
    }

    /// White point.
    pub fn white(&self) -> u8 {
        self.white
    }

    /// Maps one sample through the curve.
    #[inline]
    pub fn apply(&self, v: u8) -> u8 {
        self.lut[v as usize]
    }
}

fn curve(v: f64, black: f64, mid: f64, white: f64) -> u8 {
    if v <= black {
        return 0;
    }
    if v >= white {
        return 255;
    }
    let y = if v <= mid {
        let a = 128.0 / ((mid - black) * (mid - black));
        let b = -2.0 * a * black;
        let c = a * black * black;
        a * v * v + b * v + c
    } else {
        128.0 + (127.0 / (white - mid)) * (v - mid)
    };
    clamp_sample((y + 0.5).floor() as i32)
}

/// Applies the levels curve to every channel.
pub fn levels_adjust(src: &PixelBuffer, levels: &Levels) -> PixelBuffer {
    trace!(
        width = src.width(),
        height = src.height(),
        black = levels.black,
        mid = levels.mid,
        white = levels.white,
        "levels_adjust"
    );
    src.map(|px| px.map(|v| levels.apply(v)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rgbkit_core::Channel;

    #[test]
    fn test_identity_calibration() {
        let levels = Levels::new(0, 128, 255).unwrap();
        assert_eq!(levels.apply(0), 0);
        assert_eq!(levels.apply(128), 128);
        assert_eq!(levels.apply(255), 255);

        let img = PixelBuffer::from_fn(3, 1, |x, _| [[0, 128, 255][x as usize]; 3]).unwrap();
        let out = levels_adjust(&img, &levels);
        assert_eq!(out.plane(Channel::Red), &[0, 128, 255]);
    }

    #[test]
    fn test_segments() {
        let levels = Levels::new(20, 100, 200).unwrap();
        assert_eq!(levels.apply(10), 0);
        assert_eq!(levels.apply(20), 0);
        assert_eq!(levels.apply(100), 128);
        assert_eq!(levels.apply(200), 255);
        assert_eq!(levels.apply(230), 255);
        // quadratic: 128 / 80^2 * 40^2 = 32
        assert_eq!(levels.apply(60), 32);
        // linear: 128 + 1.27 * 50 = 191.5 -> 192
        assert_eq!(levels.apply(150), 192);
    }

    #[test]
    fn test_curve_is_monotonic() {
        let levels = Levels::new(30, 90, 220).unwrap();
        for v in 1..=255u8 {
            assert!(levels.apply(v) >= levels.apply(v - 1));
        }
    }

    #[test]
    fn test_rejects_bad_points() {
        assert!(Levels::new(-1, 128, 255).is_err());
        assert!(Levels::new(0, 128, 256).is_err());
        assert!(Levels::new(100, 100, 200).is_err());
        assert!(Levels::new(0, 200, 150).is_err());
        assert!(matches!(
            Levels::new(50, 20, 255),
            Err(OpsError::InvalidParameter(_))
        ));
    }
}
