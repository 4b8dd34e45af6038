//! # rgbkit-core
//!
//! Core types for rgbkit image processing.
//!
//! This crate provides the foundational types used throughout the rgbkit workspace:
//!
//! - [`PixelBuffer`] - Immutable planar RGB image with 8-bit samples
//! - [`Channel`] - Red/green/blue plane selector
//! - [`Error`] - Buffer construction errors
//!
//! ## Design Philosophy
//!
//! A [`PixelBuffer`] is never mutated after construction. Every transform builds a
//! new buffer, so an image stored under a name can be shared freely while other
//! operations read from it:
//!
//! ```rust
//! use rgbkit_core::{Channel, PixelBuffer};
//!
//! let grey = PixelBuffer::filled(4, 4, [128, 128, 128]).unwrap();
//! let copy = grey.clone(); // shares the planes, no pixel copy
//! assert_eq!(copy.plane(Channel::Red), grey.plane(Channel::Red));
//! ```
//!
//! ## Crate Structure
//!
//! This crate has no internal dependencies. All other rgbkit crates depend on it:
//!
//! ```text
//! rgbkit-core (this crate)
//!    ^
//!    |
//!    +-- rgbkit-ops (transform engines, catalog)
//!    +-- rgbkit-io  (PPM / PNG / JPEG codecs)
//!    +-- rgbkit-cli (command interpreter)
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod buffer;
pub mod channel;
pub mod error;

pub use buffer::PixelBuffer;
pub use channel::{clamp_sample, Channel, MAX_SAMPLE};
pub use error::{Error, Result};

/// Prelude module for convenient imports.
///
/// # Usage
///
/// ```
/// use rgbkit_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::buffer::PixelBuffer;
    pub use crate::channel::{clamp_sample, Channel, MAX_SAMPLE};
    pub use crate::error::{Error, Result};
}
