//! Error types for rgbkit-core operations.
//!
//! Construction of a [`PixelBuffer`](crate::PixelBuffer) is the only fallible
//! operation in this crate: dimensions must be positive and every plane must
//! hold exactly `width * height` samples.
//!
//! # Usage
//!
//! ```rust
//! use rgbkit_core::{Error, PixelBuffer};
//!
//! let err = PixelBuffer::new(0, 10).unwrap_err();
//! assert!(matches!(err, Error::InvalidDimensions { .. }));
//! ```

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building pixel buffers.
#[derive(Debug, Error)]
pub enum Error {
    /// Width or height is zero, or the sample count overflows `usize`.
    #[error("invalid dimensions: {width}x{height} ({reason})")]
    InvalidDimensions {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
        /// Reason why dimensions are invalid
        reason: String,
    },

    /// A plane or interleaved buffer has the wrong number of samples.
    #[error("sample count mismatch: expected {expected}, got {got}")]
    SampleCount {
        /// Expected number of samples
        expected: usize,
        /// Actual number of samples
        got: usize,
    },
}

impl Error {
    /// Creates an [`Error::InvalidDimensions`] error.
    #[inline]
    pub fn invalid_dimensions(width: u32, height: u32, reason: impl Into<String>) -> Self {
        Self::InvalidDimensions {
            width,
            height,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_dimensions() {
        let err = Error::invalid_dimensions(0, 4, "width must be positive");
        assert!(err.to_string().contains("0x4"));
        assert!(err.to_string().contains("width must be positive"));
    }
}
