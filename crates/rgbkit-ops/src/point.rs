//! Per-pixel transforms.
//!
//! Every function here computes an output pixel from the three samples of the
//! same input pixel and nothing else, so output dimensions always equal input
//! dimensions (apart from [`rgb_split`], which yields three same-sized images).
//!
//! # Operations
//!
//! - [`component`] - Channel isolation and derived scalars (value/intensity/luma)
//! - [`greyscale`] - Intensity average replicated into all channels
//! - [`sepia`] - Sepia tone matrix
//! - [`brighten`] - Additive brightness with clamping
//! - [`flip`] - Horizontal / vertical mirror
//! - [`rgb_split`] / [`rgb_combine`] - Channel separation and reassembly
//!
//! # Example
//!
//! ```rust
//! use rgbkit_core::PixelBuffer;
//! use rgbkit_ops::point::{brighten, flip, FlipDirection};
//!
//! let img = PixelBuffer::filled(4, 4, [128, 128, 128]).unwrap();
//! let bright = brighten(&img, 50);
//! assert_eq!(bright.pixel(0, 0), [178, 178, 178]);
//!
//! let mirrored = flip(&bright, FlipDirection::Horizontal);
//! assert_eq!(mirrored, bright);
//! ```

use crate::{OpsError, OpsResult};
use rgbkit_core::{clamp_sample, Channel, PixelBuffer};
use std::fmt;
use std::str::FromStr;
#[allow(unused_imports)]
use tracing::{debug, trace};

/// Rec. 709 luma weights.
const LUMA_WEIGHTS: [f64; 3] = [0.2126, 0.7152, 0.0722];

/// Sepia tone matrix, one row per output channel.
const SEPIA: [[f64; 3]; 3] = [
    [0.393, 0.769, 0.189],
    [0.349, 0.686, 0.168],
    [0.272, 0.534, 0.131],
];

/// What [`component`] extracts from each pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    /// Keep red, zero green and blue.
    Red,
    /// Keep green, zero red and blue.
    Green,
    /// Keep blue, zero red and green.
    Blue,
    /// `max(r, g, b)` in all channels.
    Value,
    /// `(r + g + b) / 3` in all channels.
    Intensity,
    /// Truncated Rec. 709 luma in all channels.
    Luma,
}

impl Component {
    /// Returns the isolated channel for `Red`/`Green`/`Blue`, `None` for derived kinds.
    pub fn channel(self) -> Option<Channel> {
        match self {
            Component::Red => Some(Channel::Red),
            Component::Green => Some(Channel::Green),
            Component::Blue => Some(Channel::Blue),
            _ => None,
        }
    }

    /// Lowercase keyword, as accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            Component::Red => "red",
            Component::Green => "green",
            Component::Blue => "blue",
            Component::Value => "value",
            Component::Intensity => "intensity",
            Component::Luma => "luma",
        }
    }
}

impl From<Channel> for Component {
    fn from(channel: Channel) -> Self {
        match channel {
            Channel::Red => Component::Red,
            Channel::Green => Component::Green,
            Channel::Blue => Component::Blue,
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Component {
    type Err = OpsError;

    /// Accepts `luma` as well as the command form `luma-component`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        let key = lower.strip_suffix("-component").unwrap_or(&lower);
        match key {
            "red" => Ok(Component::Red),
            "green" => Ok(Component::Green),
            "blue" => Ok(Component::Blue),
            "value" => Ok(Component::Value),
            "intensity" => Ok(Component::Intensity),
            "luma" => Ok(Component::Luma),
            _ => Err(OpsError::invalid(format!("unknown component: {s}"))),
        }
    }
}

/// Mirror axis for [`flip`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipDirection {
    /// Reverse column order in every row.
    Horizontal,
    /// Reverse row order in every column.
    Vertical,
}

impl FromStr for FlipDirection {
    type Err = OpsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "horizontal" => Ok(FlipDirection::Horizontal),
            "vertical" => Ok(FlipDirection::Vertical),
            _ => Err(OpsError::invalid(format!("invalid flip direction: {s}"))),
        }
    }
}

impl fmt::Display for FlipDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FlipDirection::Horizontal => "horizontal",
            FlipDirection::Vertical => "vertical",
        })
    }
}

/// Applies a [`Component`] extraction to one pixel.
#[inline]
pub fn component_pixel(kind: Component, [r, g, b]: [u8; 3]) -> [u8; 3] {
    match kind {
        Component::Red => [r, 0, 0],
        Component::Green => [0, g, 0],
        Component::Blue => [0, 0, b],
        Component::Value => {
            let v = r.max(g).max(b);
            [v, v, v]
        }
        Component::Intensity => {
            let v = intensity([r, g, b]);
            [v, v, v]
        }
        Component::Luma => {
            let luma = LUMA_WEIGHTS[0] * r as f64
                + LUMA_WEIGHTS[1] * g as f64
                + LUMA_WEIGHTS[2] * b as f64;
            // Truncated, not rounded.
            let v = clamp_sample(luma as i32);
            [v, v, v]
        }
    }
}

#[inline]
fn intensity([r, g, b]: [u8; 3]) -> u8 {
    ((r as u16 + g as u16 + b as u16) / 3) as u8
}

/// Extracts a channel or derived scalar from every pixel.
///
/// # Example
///
/// ```rust
/// use rgbkit_core::PixelBuffer;
/// use rgbkit_ops::point::{component, Component};
///
/// let img = PixelBuffer::filled(1, 1, [10, 200, 30]).unwrap();
/// assert_eq!(component(&img, Component::Green).pixel(0, 0), [0, 200, 0]);
/// assert_eq!(component(&img, Component::Value).pixel(0, 0), [200, 200, 200]);
/// ```
pub fn component(src: &PixelBuffer, kind: Component) -> PixelBuffer {
    trace!(width = src.width(), height = src.height(), component = %kind, "component");
    src.map(|px| component_pixel(kind, px))
}

/// Converts to greyscale by averaging the three channels.
pub fn greyscale(src: &PixelBuffer) -> PixelBuffer {
    trace!(width = src.width(), height = src.height(), "greyscale");
    src.map(|px| {
        let v = intensity(px);
        [v, v, v]
    })
}

/// Applies the sepia matrix to one pixel, truncating then clamping.
#[inline]
pub fn sepia_pixel([r, g, b]: [u8; 3]) -> [u8; 3] {
    SEPIA.map(|[wr, wg, wb]| clamp_sample((wr * r as f64 + wg * g as f64 + wb * b as f64) as i32))
}

/// Applies a sepia tone.
pub fn sepia(src: &PixelBuffer) -> PixelBuffer {
    trace!(width = src.width(), height = src.height(), "sepia");
    src.map(sepia_pixel)
}

/// Adds `amount` (may be negative) to every sample, clamping to `[0, 255]`.
pub fn brighten(src: &PixelBuffer, amount: i32) -> PixelBuffer {
    trace!(width = src.width(), height = src.height(), amount, "brighten");
    src.map(|px| px.map(|v| clamp_sample(v as i32 + amount)))
}

/// Mirrors the image along the given axis.
pub fn flip(src: &PixelBuffer, direction: FlipDirection) -> PixelBuffer {
    trace!(width = src.width(), height = src.height(), %direction, "flip");
    let (w, h) = src.dimensions();
    match direction {
        FlipDirection::Horizontal => src.map_coords(|x, y| src.pixel(w - 1 - x, y)),
        FlipDirection::Vertical => src.map_coords(|x, y| src.pixel(x, h - 1 - y)),
    }
}

/// Splits into three images, each holding one source channel in its own slot.
///
/// Returns `[red, green, blue]`; the red image's red plane equals the source
/// red plane and its green/blue planes are zero, and so on.
pub fn rgb_split(src: &PixelBuffer) -> [PixelBuffer; 3] {
    trace!(width = src.width(), height = src.height(), "rgb_split");
    [
        component(src, Component::Red),
        component(src, Component::Green),
        component(src, Component::Blue),
    ]
}

/// Reassembles an image from the red plane of `red`, the green plane of
/// `green` and the blue plane of `blue`.
///
/// # Errors
///
/// Returns [`OpsError::SizeMismatch`] unless all three share one shape.
pub fn rgb_combine(
    red: &PixelBuffer,
    green: &PixelBuffer,
    blue: &PixelBuffer,
) -> OpsResult<PixelBuffer> {
    trace!(width = red.width(), height = red.height(), "rgb_combine");
    for other in [green, blue] {
        if !red.same_dimensions(other) {
            return Err(OpsError::size_mismatch(
                "rgb-combine inputs",
                red.dimensions(),
                other.dimensions(),
            ));
        }
    }
    let (w, h) = red.dimensions();
    Ok(PixelBuffer::from_shared(
        w,
        h,
        [
            red.shared_plane(Channel::Red),
            green.shared_plane(Channel::Green),
            blue.shared_plane(Channel::Blue),
        ],
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(w: u32, h: u32) -> PixelBuffer {
        PixelBuffer::from_fn(w, h, |x, y| {
            [(x * 40) as u8, (y * 50) as u8, ((x + y) * 20) as u8]
        })
        .unwrap()
    }

    #[test]
    fn test_component_channels() {
        let img = PixelBuffer::filled(2, 2, [10, 20, 30]).unwrap();
        assert_eq!(component(&img, Component::Red).pixel(1, 1), [10, 0, 0]);
        assert_eq!(component(&img, Component::Green).pixel(1, 1), [0, 20, 0]);
        assert_eq!(component(&img, Component::Blue).pixel(1, 1), [0, 0, 30]);
    }

    #[test]
    fn test_component_derived() {
        let px = [100, 150, 200];
        assert_eq!(component_pixel(Component::Value, px), [200, 200, 200]);
        assert_eq!(component_pixel(Component::Intensity, px), [150, 150, 150]);
        // 21.26 + 107.28 + 14.44 = 142.98 -> truncated to 142
        assert_eq!(component_pixel(Component::Luma, px), [142, 142, 142]);
        // (1 + 1 + 2) / 3 floors to 1
        assert_eq!(component_pixel(Component::Intensity, [1, 1, 2]), [1, 1, 1]);
    }

    #[test]
    fn test_component_parse() {
        assert_eq!("luma-component".parse::<Component>().unwrap(), Component::Luma);
        assert_eq!("Value".parse::<Component>().unwrap(), Component::Value);
        assert!("alpha".parse::<Component>().is_err());
        assert_eq!(Component::from(Channel::Blue), Component::Blue);
        assert_eq!(Component::Red.channel(), Some(Channel::Red));
        assert_eq!(Component::Luma.channel(), None);
    }

    #[test]
    fn test_greyscale_matches_intensity() {
        let img = gradient(5, 4);
        assert_eq!(greyscale(&img), component(&img, Component::Intensity));
    }

    #[test]
    fn test_sepia() {
        let img = PixelBuffer::filled(1, 1, [100, 100, 100]).unwrap();
        // 135.1 -> 135, 120.3 -> 120, 93.7 -> 93
        assert_eq!(sepia(&img).pixel(0, 0), [135, 120, 93]);

        let white = PixelBuffer::filled(1, 1, [255, 255, 255]).unwrap();
        assert_eq!(sepia(&white).pixel(0, 0), [255, 255, 238]);
    }

    #[test]
    fn test_brighten_and_clamp() {
        let img = PixelBuffer::filled(4, 4, [128, 128, 128]).unwrap();
        let up = brighten(&img, 50);
        assert!(up.plane(Channel::Red).iter().all(|&v| v == 178));
        let down = brighten(&img, -200);
        for c in Channel::ALL {
            assert!(down.plane(c).iter().all(|&v| v == 0));
        }
        assert!(brighten(&img, 500).plane(Channel::Blue).iter().all(|&v| v == 255));
    }

    #[test]
    fn test_flip() {
        let img = gradient(3, 2);
        let h = flip(&img, FlipDirection::Horizontal);
        assert_eq!(h.pixel(0, 0), img.pixel(2, 0));
        let v = flip(&img, FlipDirection::Vertical);
        assert_eq!(v.pixel(1, 0), img.pixel(1, 1));
    }

    #[test]
    fn test_flip_involution() {
        let img = gradient(7, 5);
        for dir in [FlipDirection::Horizontal, FlipDirection::Vertical] {
            assert_eq!(flip(&flip(&img, dir), dir), img);
        }
    }

    #[test]
    fn test_flip_direction_parse() {
        assert_eq!("Vertical".parse::<FlipDirection>().unwrap(), FlipDirection::Vertical);
        assert!(matches!(
            "diagonal".parse::<FlipDirection>(),
            Err(OpsError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_split_combine_roundtrip() {
        let img = gradient(6, 3);
        let [r, g, b] = rgb_split(&img);
        assert_eq!(r.plane(Channel::Red), img.plane(Channel::Red));
        assert!(r.plane(Channel::Green).iter().all(|&v| v == 0));
        assert!(g.plane(Channel::Blue).iter().all(|&v| v == 0));
        assert_eq!(b.plane(Channel::Blue), img.plane(Channel::Blue));
        assert_eq!(rgb_combine(&r, &g, &b).unwrap(), img);
    }

    #[test]
    fn test_combine_size_mismatch() {
        let a = PixelBuffer::new(2, 2).unwrap();
        let b = PixelBuffer::new(3, 2).unwrap();
        assert!(matches!(
            rgb_combine(&a, &a, &b),
            Err(OpsError::SizeMismatch(_))
        ));
    }
}
