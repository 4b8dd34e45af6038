//! PNG format support.
//!
//! Palette, sub-byte and 16-bit images are normalized to 8 bits per sample on
//! read. Greyscale is expanded to RGB and alpha is dropped, since a
//! [`PixelBuffer`] holds three planes. Images are always written as 8-bit RGB.

use crate::{IoError, IoResult};
use rgbkit_core::PixelBuffer;
use std::fs;
use std::io::Cursor;
use std::path::Path;
use tracing::trace;

/// Decodes a PNG stream.
pub fn decode(bytes: &[u8]) -> IoResult<PixelBuffer> {
    let mut decoder = png::Decoder::new(Cursor::new(bytes));
    decoder.set_transformations(png::Transformations::normalize_to_color8());
    let mut reader = decoder
        .read_info()
        .map_err(|e: png::DecodingError| IoError::DecodeError(e.to_string()))?;

    let buf_size = reader
        .output_buffer_size()
        .ok_or_else(|| IoError::DecodeError("cannot determine output buffer size".into()))?;
    let mut buf = vec![0u8; buf_size];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e: png::DecodingError| IoError::DecodeError(e.to_string()))?;
    let data = &buf[..info.buffer_size()];
    trace!(width = info.width, height = info.height, color = ?info.color_type, "png decode");

    let rgb: Vec<u8> = match info.color_type {
        png::ColorType::Rgb => data.to_vec(),
        png::ColorType::Rgba => data
            .chunks_exact(4)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect(),
        png::ColorType::Grayscale => data.iter().flat_map(|&g| [g, g, g]).collect(),
        png::ColorType::GrayscaleAlpha => data
            .chunks_exact(2)
            .flat_map(|ga| [ga[0], ga[0], ga[0]])
            .collect(),
        other => {
            return Err(IoError::DecodeError(format!(
                "unexpected color type after normalization: {other:?}"
            )));
        }
    };

    Ok(PixelBuffer::from_interleaved(info.width, info.height, &rgb)?)
}

/// Encodes as an 8-bit RGB PNG.
pub fn encode(image: &PixelBuffer) -> IoResult<Vec<u8>> {
    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, image.width(), image.height());
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_compression(png::Compression::default());

        let mut writer = encoder
            .write_header()
            .map_err(|e| IoError::EncodeError(e.to_string()))?;
        writer
            .write_image_data(&image.to_interleaved())
            .map_err(|e| IoError::EncodeError(e.to_string()))?;
        writer
            .finish()
            .map_err(|e| IoError::EncodeError(e.to_string()))?;
    }
    Ok(out)
}

/// Reads a PNG file.
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<PixelBuffer> {
    decode(&fs::read(path)?)
}

/// Writes a PNG file.
pub fn write<P: AsRef<Path>>(path: P, image: &PixelBuffer) -> IoResult<()> {
    fs::write(path, encode(image)?)?;
    Ok(())
}
