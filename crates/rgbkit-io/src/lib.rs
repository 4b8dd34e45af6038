//! # rgbkit-io
//!
//! Image I/O for rgbkit.
//!
//! Every codec turns bytes into a [`PixelBuffer`] and back:
//!
//! - **PPM** - plain-text `P3`, always available
//! - **PNG** - lossless, feature `png`
//! - **JPEG** - lossy with a quality setting, feature `jpeg`
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use rgbkit_io::{read, write, WriteOptions};
//!
//! // Format detected from magic bytes, then extension
//! let image = read("input.png")?;
//!
//! // Format chosen from the extension
//! write("output.ppm", &image, &WriteOptions::default())?;
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod detect;
mod error;
pub mod ppm;

#[cfg(feature = "png")]
pub mod png;

#[cfg(feature = "jpeg")]
pub mod jpeg;

pub use detect::Format;
pub use error::{IoError, IoResult};

use rgbkit_core::PixelBuffer;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Encoder settings shared by [`write`] and [`encode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    /// JPEG quality, 1-100.
    pub jpeg_quality: u8,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self { jpeg_quality: 90 }
    }
}

fn unsupported(format: Format) -> IoError {
    IoError::UnsupportedFormat(format.to_string())
}

/// Decodes bytes in the given format.
pub fn decode(bytes: &[u8], format: Format) -> IoResult<PixelBuffer> {
    match format {
        Format::Ppm => ppm::decode(bytes),

        #[cfg(feature = "png")]
        Format::Png => png::decode(bytes),

        #[cfg(feature = "jpeg")]
        Format::Jpeg => jpeg::decode(bytes),

        #[allow(unreachable_patterns)]
        other => Err(unsupported(other)),
    }
}

/// Encodes an image in the given format.
#[cfg_attr(not(feature = "jpeg"), allow(unused_variables))]
pub fn encode(image: &PixelBuffer, format: Format, options: &WriteOptions) -> IoResult<Vec<u8>> {
    match format {
        Format::Ppm => Ok(ppm::encode(image)),

        #[cfg(feature = "png")]
        Format::Png => png::encode(image),

        #[cfg(feature = "jpeg")]
        Format::Jpeg => jpeg::JpegWriter::with_options(jpeg::JpegWriterOptions {
            quality: options.jpeg_quality,
        })
        .encode(image),

        #[allow(unreachable_patterns)]
        other => Err(unsupported(other)),
    }
}

/// Reads an image file, detecting the format from its contents first and its
/// extension second.
///
/// # Example
///
/// ```rust,ignore
/// let image = rgbkit_io::read("photo.jpg")?;
/// ```
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<PixelBuffer> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    let format = Format::detect(path, &bytes);
    debug!(path = %path.display(), %format, size = bytes.len(), "read");
    match format {
        Format::Unknown => Err(IoError::UnsupportedFormat(extension_of(path))),
        format => decode(&bytes, format),
    }
}

/// Writes an image file in the format named by its extension.
pub fn write<P: AsRef<Path>>(path: P, image: &PixelBuffer, options: &WriteOptions) -> IoResult<()> {
    let path = path.as_ref();
    let format = Format::from_extension(path);
    debug!(path = %path.display(), %format, "write");
    if format == Format::Unknown {
        return Err(IoError::UnsupportedFormat(extension_of(path)));
    }
    let bytes = encode(image, format, options)?;
    fs::write(path, bytes)?;
    Ok(())
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("unknown")
        .to_string()
}
