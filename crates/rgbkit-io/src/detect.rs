//! Format detection utilities.
//!
//! Detects image formats from file extensions and magic bytes.

use std::fmt;
use std::path::Path;

/// Supported image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Plain-text PPM (`P3`).
    Ppm,
    /// PNG format.
    Png,
    /// JPEG format.
    Jpeg,
    /// Unknown/unsupported format.
    Unknown,
}

impl Format {
    /// Detects format from file contents, falling back to the extension.
    pub fn detect<P: AsRef<Path>>(path: P, bytes: &[u8]) -> Self {
        match Self::from_bytes(bytes) {
            Format::Unknown => Self::from_extension(path),
            format => format,
        }
    }

    /// Detects format from file extension only.
    pub fn from_extension<P: AsRef<Path>>(path: P) -> Self {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match ext.as_deref() {
            Some("ppm") => Format::Ppm,
            Some("png") => Format::Png,
            Some("jpg") | Some("jpeg") => Format::Jpeg,
            _ => Format::Unknown,
        }
    }

    /// Detects format from raw bytes (magic number check).
    pub fn from_bytes(bytes: &[u8]) -> Self {
        // PNG: 0x89 0x50 0x4E 0x47 0x0D 0x0A 0x1A 0x0A
        if bytes.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Format::Png;
        }

        // JPEG: 0xFF 0xD8 0xFF
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Format::Jpeg;
        }

        // PPM: "P3" followed by whitespace or a comment
        if bytes.len() >= 3
            && bytes.starts_with(b"P3")
            && (bytes[2].is_ascii_whitespace() || bytes[2] == b'#')
        {
            return Format::Ppm;
        }

        Format::Unknown
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Format::Ppm => "PPM",
            Format::Png => "PNG",
            Format::Jpeg => "JPEG",
            Format::Unknown => "unknown",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_extension() {
        assert_eq!(Format::from_extension("a.ppm"), Format::Ppm);
        assert_eq!(Format::from_extension("a.PNG"), Format::Png);
        assert_eq!(Format::from_extension("dir/a.jpeg"), Format::Jpeg);
        assert_eq!(Format::from_extension("a.jpg"), Format::Jpeg);
        assert_eq!(Format::from_extension("a.bmp"), Format::Unknown);
        assert_eq!(Format::from_extension("noext"), Format::Unknown);
    }

    #[test]
    fn test_from_bytes() {
        assert_eq!(
            Format::from_bytes(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0]),
            Format::Png
        );
        assert_eq!(Format::from_bytes(&[0xFF, 0xD8, 0xFF, 0xE0]), Format::Jpeg);
        assert_eq!(Format::from_bytes(b"P3\n1 1\n255\n0 0 0\n"), Format::Ppm);
        assert_eq!(Format::from_bytes(b"P3# c\n"), Format::Ppm);
        assert_eq!(Format::from_bytes(b"P6\n"), Format::Unknown);
        assert_eq!(Format::from_bytes(b"P"), Format::Unknown);
    }

    #[test]
    fn test_detect_prefers_magic() {
        assert_eq!(Format::detect("mislabeled.png", b"P3\n1 1\n255\n1 2 3"), Format::Ppm);
        assert_eq!(Format::detect("x.ppm", b"garbage"), Format::Ppm);
        assert_eq!(Format::detect("x.txt", b"garbage"), Format::Unknown);
    }
}
