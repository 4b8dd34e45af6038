//! Error types for I/O operations.
//!
//! Provides unified error handling for all codecs.

use std::io;
use thiserror::Error;

/// I/O operation error.
#[derive(Debug, Error)]
pub enum IoError {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Unsupported format.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Invalid or corrupted file.
    #[error("invalid file: {0}")]
    InvalidFile(String),

    /// Decoding error.
    #[error("decode error: {0}")]
    DecodeError(String),

    /// Encoding error.
    #[error("encode error: {0}")]
    EncodeError(String),

    /// Decoded data does not form a valid image.
    #[error(transparent)]
    Buffer(#[from] rgbkit_core::Error),
}

/// Result type for I/O operations.
pub type IoResult<T> = Result<T, IoError>;
