//! Color channel selector and sample clamping.

use std::fmt;

/// Largest value a stored sample may hold.
pub const MAX_SAMPLE: i32 = 255;

/// One of the three color planes of a [`PixelBuffer`](crate::PixelBuffer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Red plane.
    Red,
    /// Green plane.
    Green,
    /// Blue plane.
    Blue,
}

impl Channel {
    /// All channels in storage order.
    pub const ALL: [Channel; 3] = [Channel::Red, Channel::Green, Channel::Blue];

    /// Index of this channel in `[r, g, b]` order.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Channel::Red => 0,
            Channel::Green => 1,
            Channel::Blue => 2,
        }
    }

    /// Lowercase name used on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Channel::Red => "red",
            Channel::Green => "green",
            Channel::Blue => "blue",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Clamps an integer sample into `[0, 255]`.
#[inline]
pub fn clamp_sample(value: i32) -> u8 {
    value.clamp(0, MAX_SAMPLE) as u8
}
