//! Plain-text PPM (`P3`) support.
//!
//! # Layout
//!
//! ```text
//! P3
//! # comments may appear wherever a token is expected
//! <width> <height>
//! <maxval>
//! r g b r g b ...
//! ```
//!
//! Samples are whitespace-separated decimal integers in row-major order.
//! `maxval` must be in `1..=255`; files with a smaller `maxval` are rescaled
//! to the full 8-bit range on read. The writer always emits `maxval = 255`
//! and one text line per image row.

use crate::{IoError, IoResult};
use rgbkit_core::PixelBuffer;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use tracing::trace;

const MAGIC: &str = "P3";

/// Splits PPM text into tokens, dropping `#` comments.
struct Tokens<'a> {
    lines: std::str::Lines<'a>,
    current: std::str::SplitWhitespace<'a>,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines(),
            current: "".split_whitespace(),
        }
    }

    fn next_number(&mut self, what: &str) -> IoResult<u32> {
        let token = self
            .next()
            .ok_or_else(|| IoError::InvalidFile(format!("unexpected end of data reading {what}")))?;
        token
            .parse()
            .map_err(|_| IoError::InvalidFile(format!("invalid {what}: {token:?}")))
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        loop {
            if let Some(token) = self.current.next() {
                return Some(token);
            }
            let line = self.lines.next()?;
            let content = match line.find('#') {
                Some(i) => &line[..i],
                None => line,
            };
            self.current = content.split_whitespace();
        }
    }
}

/// Decodes P3 text.
///
/// # Errors
///
/// [`IoError::InvalidFile`] for a wrong magic, a bad header, a sample above
/// `maxval` or too few samples.
pub fn decode(bytes: &[u8]) -> IoResult<PixelBuffer> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| IoError::InvalidFile(format!("PPM is not valid text: {e}")))?;
    let mut tokens = Tokens::new(text);

    match tokens.next() {
        Some(MAGIC) => {}
        other => {
            return Err(IoError::InvalidFile(format!(
                "expected {MAGIC} header, found {:?}",
                other.unwrap_or("")
            )));
        }
    }

    let width = tokens.next_number("width")?;
    let height = tokens.next_number("height")?;
    let maxval = tokens.next_number("maxval")?;
    if !(1..=255).contains(&maxval) {
        return Err(IoError::InvalidFile(format!(
            "maxval must be in 1..=255, got {maxval}"
        )));
    }
    trace!(width, height, maxval, "ppm decode");

    let count = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(3))
        .ok_or_else(|| IoError::InvalidFile(format!("image too large: {width}x{height}")))?;
    // Every sample takes at least one byte of text
    if count > bytes.len() {
        return Err(IoError::InvalidFile(format!(
            "header declares {width}x{height} but the file holds at most {} samples",
            bytes.len()
        )));
    }
    let mut data = Vec::with_capacity(count);
    for _ in 0..count {
        let v = tokens.next_number("sample")?;
        if v > maxval {
            return Err(IoError::InvalidFile(format!(
                "sample {v} exceeds maxval {maxval}"
            )));
        }
        data.push((v * 255 / maxval) as u8);
    }

    Ok(PixelBuffer::from_interleaved(width, height, &data)?)
}

/// Encodes as P3 text with `maxval = 255`.
pub fn encode(image: &PixelBuffer) -> Vec<u8> {
    let (w, h) = image.dimensions();
    let mut out = format!("{MAGIC}\n{w} {h}\n255\n");
    for y in 0..h {
        for x in 0..w {
            let [r, g, b] = image.pixel(x, y);
            if x > 0 {
                out.push(' ');
            }
            let _ = write!(out, "{r} {g} {b}");
        }
        out.push('\n');
    }
    out.into_bytes()
}

/// Reads a P3 file.
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<PixelBuffer> {
    decode(&fs::read(path)?)
}

/// Writes a P3 file.
pub fn write<P: AsRef<Path>>(path: P, image: &PixelBuffer) -> IoResult<()> {
    fs::write(path, encode(image))?;
    Ok(())
}
