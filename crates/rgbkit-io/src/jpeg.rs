//! JPEG format support.
//!
//! Reads baseline and progressive JPEGs in RGB, greyscale (8 and 16 bit) and
//! CMYK, converting everything to 8-bit RGB. Writes RGB at a configurable
//! quality.
//!
//! # Example
//!
//! ```rust,ignore
//! use rgbkit_io::jpeg::{JpegWriter, JpegWriterOptions};
//!
//! let writer = JpegWriter::with_options(JpegWriterOptions { quality: 95 });
//! writer.write("out.jpg", &image)?;
//! ```

use crate::{IoError, IoResult};
use rgbkit_core::PixelBuffer;
use std::fs;
use std::io::BufReader;
use std::path::Path;
use tracing::trace;

/// Default encoder quality.
pub const DEFAULT_QUALITY: u8 = 90;

/// Decodes a JPEG stream to RGB.
pub fn decode(bytes: &[u8]) -> IoResult<PixelBuffer> {
    let mut decoder = jpeg_decoder::Decoder::new(BufReader::new(bytes));
    let pixels = decoder
        .decode()
        .map_err(|e| IoError::DecodeError(e.to_string()))?;
    let info = decoder
        .info()
        .ok_or_else(|| IoError::DecodeError("missing JPEG info".into()))?;

    let width = info.width as u32;
    let height = info.height as u32;
    trace!(width, height, format = ?info.pixel_format, "jpeg decode");

    let rgb: Vec<u8> = match info.pixel_format {
        jpeg_decoder::PixelFormat::RGB24 => pixels,
        jpeg_decoder::PixelFormat::L8 => pixels.iter().flat_map(|&g| [g, g, g]).collect(),
        jpeg_decoder::PixelFormat::L16 => pixels
            .chunks_exact(2)
            // High byte
            .flat_map(|l16| [l16[0], l16[0], l16[0]])
            .collect(),
        jpeg_decoder::PixelFormat::CMYK32 => pixels
            .chunks_exact(4)
            .flat_map(|cmyk| {
                let c = cmyk[0] as f32 / 255.0;
                let m = cmyk[1] as f32 / 255.0;
                let y = cmyk[2] as f32 / 255.0;
                let k = cmyk[3] as f32 / 255.0;
                [
                    ((1.0 - c) * (1.0 - k) * 255.0) as u8,
                    ((1.0 - m) * (1.0 - k) * 255.0) as u8,
                    ((1.0 - y) * (1.0 - k) * 255.0) as u8,
                ]
            })
            .collect(),
    };

    Ok(PixelBuffer::from_interleaved(width, height, &rgb)?)
}

/// JPEG writer options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JpegWriterOptions {
    /// Quality level 1-100. Higher = better quality, larger files.
    pub quality: u8,
}

impl Default for JpegWriterOptions {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
        }
    }
}

/// JPEG encoder.
#[derive(Debug, Clone, Default)]
pub struct JpegWriter {
    options: JpegWriterOptions,
}

impl JpegWriter {
    /// Creates a new writer with default options (quality 90).
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a writer with explicit options.
    pub fn with_options(options: JpegWriterOptions) -> Self {
        Self { options }
    }

    /// Encodes to an in-memory JPEG.
    ///
    /// # Errors
    ///
    /// JPEG dimensions are limited to 65535 per side.
    pub fn encode(&self, image: &PixelBuffer) -> IoResult<Vec<u8>> {
        use jpeg_encoder::{ColorType, Encoder};

        let (w, h) = image.dimensions();
        let (Ok(w16), Ok(h16)) = (u16::try_from(w), u16::try_from(h)) else {
            return Err(IoError::EncodeError(format!(
                "image too large for JPEG: {w}x{h}"
            )));
        };
        let quality = self.options.quality.clamp(1, 100);

        let mut buffer = Vec::new();
        let encoder = Encoder::new(&mut buffer, quality);
        encoder
            .encode(&image.to_interleaved(), w16, h16, ColorType::Rgb)
            .map_err(|e: jpeg_encoder::EncodingError| IoError::EncodeError(e.to_string()))?;
        Ok(buffer)
    }

    /// Encodes and writes a JPEG file.
    pub fn write<P: AsRef<Path>>(&self, path: P, image: &PixelBuffer) -> IoResult<()> {
        fs::write(path, self.encode(image)?)?;
        Ok(())
    }
}

/// Reads a JPEG file.
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<PixelBuffer> {
    decode(&fs::read(path)?)
}

/// Writes a JPEG file with default options (quality 90).
pub fn write<P: AsRef<Path>>(path: P, image: &PixelBuffer) -> IoResult<()> {
    JpegWriter::new().write(path, image)
}
