//! Error types for image operations.

use thiserror::Error;

/// Error type for image operations.
#[derive(Error, Debug)]
pub enum OpsError {
    /// A source, mask or channel image name is not in the catalog.
    #[error("image not found: {0}")]
    NotFound(String),

    /// Invalid parameter value (out-of-range number, unknown keyword).
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Images have incompatible sizes.
    #[error("size mismatch: {0}")]
    SizeMismatch(String),

    /// Buffer construction failed.
    #[error(transparent)]
    Core(#[from] rgbkit_core::Error),
}

impl OpsError {
    /// Creates an [`OpsError::InvalidParameter`] error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    /// Creates an [`OpsError::SizeMismatch`] describing two shapes.
    pub fn size_mismatch(what: &str, a: (u32, u32), b: (u32, u32)) -> Self {
        Self::SizeMismatch(format!("{what}: {}x{} vs {}x{}", a.0, a.1, b.0, b.1))
    }
}

/// Result type for image operations.
pub type OpsResult<T> = Result<T, OpsError>;
