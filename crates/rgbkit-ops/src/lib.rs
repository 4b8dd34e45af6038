//! # rgbkit-ops
//!
//! Transform engines for planar 8-bit RGB images.
//!
//! Every engine is a pure function from [`PixelBuffer`](rgbkit_core::PixelBuffer)
//! inputs to a fresh output buffer. The [`Engine`] type wraps them with a
//! [`Catalog`] of named images.
//!
//! # Modules
//!
//! - [`point`] - Component extraction, greyscale, sepia, brighten, flip, RGB split/combine
//! - [`filter`] - Blur and sharpen convolution
//! - [`histogram`] - Histograms, color correction, histogram rendering
//! - [`levels`] - Black/mid/white tone curve
//! - [`wavelet`] - Haar wavelet compression
//! - [`resize`] - Bilinear downscaling
//! - [`composite`] - Mask-gated and split-view compositing
//! - [`catalog`] / [`engine`] - Named image store and operations over it
//!
//! # Example
//!
//! ```rust
//! use rgbkit_core::PixelBuffer;
//! use rgbkit_ops::{Engine, SplitOp};
//!
//! let mut engine = Engine::new();
//! engine.insert("img", PixelBuffer::filled(8, 8, [40, 90, 160]).unwrap());
//!
//! engine.blur("img", None, "soft").unwrap();
//! engine.levels_adjust(20, 100, 230, "soft", "graded").unwrap();
//! engine.split(&SplitOp::Sepia, "graded", "preview", 50).unwrap();
//! engine.downscale(4, 4, "preview", "thumb").unwrap();
//!
//! assert_eq!(engine.get("thumb").unwrap().dimensions(), (4, 4));
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
pub mod catalog;
pub mod composite;
pub mod engine;
pub mod filter;
pub mod histogram;
pub mod levels;
pub mod point;
pub mod resize;
pub mod wavelet;

pub use catalog::Catalog;
pub use composite::{MaskedOp, SplitOp};
pub use engine::Engine;
pub use error::{OpsError, OpsResult};
pub use levels::Levels;
pub use point::{Component, FlipDirection};
