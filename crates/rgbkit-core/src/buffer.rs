//! Planar RGB pixel buffer.
//!
//! # Memory Layout
//!
//! A [`PixelBuffer`] stores three separate planes, one per [`Channel`], each in
//! **row-major** order, top-to-bottom:
//!
//! ```text
//! red:   [R R R R ...]  row 0, row 1, ...
//! green: [G G G G ...]
//! blue:  [B B B B ...]
//! ```
//!
//! Sample `(x, y)` of a plane lives at index `y * width + x`.
//!
//! # Immutability
//!
//! Planes are held in [`Arc<Vec<u8>>`], so cloning a buffer is cheap and two
//! buffers may share a plane (for example after an RGB split). No method hands
//! out mutable access; every transform allocates a fresh buffer.
//!
//! # Usage
//!
//! ```rust
//! use rgbkit_core::PixelBuffer;
//!
//! let img = PixelBuffer::from_fn(3, 2, |x, y| [x as u8 * 10, y as u8 * 10, 7]).unwrap();
//! assert_eq!(img.pixel(2, 1), [20, 10, 7]);
//! ```

use crate::{Channel, Error, Result};
use std::fmt;
use std::sync::Arc;

/// Immutable image made of three same-shaped 8-bit planes.
///
/// Every stored sample lies in `[0, 255]` by construction, since planes are `u8`.
/// Width and height are always positive.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    /// Image width in pixels
    width: u32,
    /// Image height in pixels
    height: u32,
    /// Red, green, blue planes (Arc for cheap cloning and sharing)
    planes: [Arc<Vec<u8>>; 3],
}

impl PixelBuffer {
    /// Creates a black image.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimensions`] if either dimension is zero.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Self::filled(width, height, [0, 0, 0])
    }

    /// Creates an image where every pixel is `rgb`.
    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> Result<Self> {
        let len = sample_count(width, height)?;
        Ok(Self {
            width,
            height,
            planes: rgb.map(|v| Arc::new(vec![v; len])),
        })
    }

    /// Creates an image from three owned planes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SampleCount`] if any plane does not hold exactly
    /// `width * height` samples.
    ///
    /// # Example
    ///
    /// ```rust
    /// use rgbkit_core::PixelBuffer;
    ///
    /// let img = PixelBuffer::from_planes(2, 1, vec![1, 2], vec![3, 4], vec![5, 6]).unwrap();
    /// assert_eq!(img.pixel(1, 0), [2, 4, 6]);
    /// ```
    pub fn from_planes(
        width: u32,
        height: u32,
        red: Vec<u8>,
        green: Vec<u8>,
        blue: Vec<u8>,
    ) -> Result<Self> {
        Self::from_shared(width, height, [Arc::new(red), Arc::new(green), Arc::new(blue)])
    }

    /// Creates an image from planes that may already be shared with other buffers.
    pub fn from_shared(width: u32, height: u32, planes: [Arc<Vec<u8>>; 3]) -> Result<Self> {
        let len = sample_count(width, height)?;
        for plane in &planes {
            if plane.len() != len {
                return Err(Error::SampleCount {
                    expected: len,
                    got: plane.len(),
                });
            }
        }
        Ok(Self {
            width,
            height,
            planes,
        })
    }

    /// Creates an image by evaluating `f(x, y) -> [r, g, b]` for every pixel.
    pub fn from_fn<F>(width: u32, height: u32, mut f: F) -> Result<Self>
    where
        F: FnMut(u32, u32) -> [u8; 3],
    {
        let len = sample_count(width, height)?;
        let mut red = Vec::with_capacity(len);
        let mut green = Vec::with_capacity(len);
        let mut blue = Vec::with_capacity(len);
        for y in 0..height {
            for x in 0..width {
                let [r, g, b] = f(x, y);
                red.push(r);
                green.push(g);
                blue.push(b);
            }
        }
        Self::from_planes(width, height, red, green, blue)
    }

    /// Creates an image from interleaved `[R G B R G B ...]` data.
    pub fn from_interleaved(width: u32, height: u32, data: &[u8]) -> Result<Self> {
        let len = sample_count(width, height)?;
        if data.len() != len * 3 {
            return Err(Error::SampleCount {
                expected: len * 3,
                got: data.len(),
            });
        }
        let mut red = Vec::with_capacity(len);
        let mut green = Vec::with_capacity(len);
        let mut blue = Vec::with_capacity(len);
        for px in data.chunks_exact(3) {
            red.push(px[0]);
            green.push(px[1]);
            blue.push(px[2]);
        }
        Self::from_planes(width, height, red, green, blue)
    }

    /// Builds a same-sized image by transforming each pixel on its own.
    ///
    /// # Example
    ///
    /// ```rust
    /// use rgbkit_core::PixelBuffer;
    ///
    /// let img = PixelBuffer::filled(2, 2, [10, 20, 30]).unwrap();
    /// let swapped = img.map(|[r, g, b]| [b, g, r]);
    /// assert_eq!(swapped.pixel(1, 1), [30, 20, 10]);
    /// ```
    pub fn map<F>(&self, mut f: F) -> PixelBuffer
    where
        F: FnMut([u8; 3]) -> [u8; 3],
    {
        let [r, g, b] = &self.planes;
        let len = self.pixel_count();
        let mut red = Vec::with_capacity(len);
        let mut green = Vec::with_capacity(len);
        let mut blue = Vec::with_capacity(len);
        for i in 0..len {
            let [nr, ng, nb] = f([r[i], g[i], b[i]]);
            red.push(nr);
            green.push(ng);
            blue.push(nb);
        }
        self.with_planes(red, green, blue)
    }

    /// Builds a same-sized image by evaluating `f(x, y)` at every coordinate.
    ///
    /// Unlike [`from_fn`](Self::from_fn) this cannot fail, since the shape is
    /// taken from an existing buffer.
    pub fn map_coords<F>(&self, mut f: F) -> PixelBuffer
    where
        F: FnMut(u32, u32) -> [u8; 3],
    {
        let len = self.pixel_count();
        let mut red = Vec::with_capacity(len);
        let mut green = Vec::with_capacity(len);
        let mut blue = Vec::with_capacity(len);
        for y in 0..self.height {
            for x in 0..self.width {
                let [r, g, b] = f(x, y);
                red.push(r);
                green.push(g);
                blue.push(b);
            }
        }
        self.with_planes(red, green, blue)
    }

    // Planes are produced by the loops above, so their length always matches.
    fn with_planes(&self, red: Vec<u8>, green: Vec<u8>, blue: Vec<u8>) -> PixelBuffer {
        debug_assert_eq!(red.len(), self.pixel_count());
        PixelBuffer {
            width: self.width,
            height: self.height,
            planes: [Arc::new(red), Arc::new(green), Arc::new(blue)],
        }
    }

    /// Returns the pixels as interleaved `[R G B R G B ...]` data.
    pub fn to_interleaved(&self) -> Vec<u8> {
        let [r, g, b] = &self.planes;
        r.iter()
            .zip(g.iter())
            .zip(b.iter())
            .flat_map(|((&r, &g), &b)| [r, g, b])
            .collect()
    }

    /// Image width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)` pair.
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Number of pixels.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.planes[0].len()
    }

    /// Returns `true` if both images have the same width and height.
    #[inline]
    pub fn same_dimensions(&self, other: &PixelBuffer) -> bool {
        self.dimensions() == other.dimensions()
    }

    /// Borrowed row-major samples of one plane.
    #[inline]
    pub fn plane(&self, channel: Channel) -> &[u8] {
        &self.planes[channel.index()]
    }

    /// Shared handle to one plane, for building buffers that reuse it.
    #[inline]
    pub fn shared_plane(&self, channel: Channel) -> Arc<Vec<u8>> {
        Arc::clone(&self.planes[channel.index()])
    }

    /// Returns `[r, g, b]` at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are outside the image.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let i = self.index(x, y);
        [self.planes[0][i], self.planes[1][i], self.planes[2][i]]
    }

    /// Returns one sample at `(x, y)`.
    #[inline]
    pub fn sample(&self, channel: Channel, x: u32, y: u32) -> u8 {
        self.planes[channel.index()][self.index(x, y)]
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        assert!(
            x < self.width && y < self.height,
            "pixel ({x}, {y}) out of bounds for image {}x{}",
            self.width,
            self.height
        );
        y as usize * self.width as usize + x as usize
    }
}

impl fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

/// Validates dimensions and returns `width * height`.
fn sample_count(width: u32, height: u32) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(Error::invalid_dimensions(
            width,
            height,
            "width and height must be positive",
        ));
    }
    (width as usize)
        .checked_mul(height as usize)
        .ok_or_else(|| Error::invalid_dimensions(width, height, "sample count overflows"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_black() {
        let img = PixelBuffer::new(4, 3).unwrap();
        assert_eq!(img.dimensions(), (4, 3));
        assert_eq!(img.pixel_count(), 12);
        assert!(img.plane(Channel::Green).iter().all(|&v| v == 0));
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(PixelBuffer::new(0, 3).is_err());
        assert!(PixelBuffer::filled(3, 0, [1, 2, 3]).is_err());
    }

    #[test]
    fn test_from_planes_wrong_length() {
        let err = PixelBuffer::from_planes(2, 2, vec![0; 4], vec![0; 3], vec![0; 4]).unwrap_err();
        assert!(matches!(err, Error::SampleCount { expected: 4, got: 3 }));
    }

    #[test]
    fn test_row_major_layout() {
        let img = PixelBuffer::from_fn(3, 2, |x, y| [(y * 3 + x) as u8, 0, 0]).unwrap();
        assert_eq!(img.plane(Channel::Red), &[0, 1, 2, 3, 4, 5]);
        assert_eq!(img.sample(Channel::Red, 1, 1), 4);
    }

    #[test]
    fn test_interleaved_roundtrip() {
        let data: Vec<u8> = (0..2 * 2 * 3).map(|v| v as u8 * 9).collect();
        let img = PixelBuffer::from_interleaved(2, 2, &data).unwrap();
        assert_eq!(img.pixel(1, 0), [27, 36, 45]);
        assert_eq!(img.to_interleaved(), data);
    }

    #[test]
    fn test_map_coords_keeps_shape() {
        let img = PixelBuffer::new(3, 2).unwrap();
        let out = img.map_coords(|x, y| [x as u8, y as u8, 0]);
        assert_eq!(out.dimensions(), (3, 2));
        assert_eq!(out.pixel(2, 1), [2, 1, 0]);
    }

    #[test]
    fn test_shared_planes() {
        let img = PixelBuffer::filled(2, 2, [10, 20, 30]).unwrap();
        let red = img.shared_plane(Channel::Red);
        let zeros = Arc::new(vec![0u8; 4]);
        let split = PixelBuffer::from_shared(2, 2, [red, zeros.clone(), zeros]).unwrap();
        assert_eq!(split.pixel(0, 0), [10, 0, 0]);
    }

    #[test]
    #[should_panic]
    fn test_pixel_out_of_bounds() {
        let img = PixelBuffer::new(2, 2).unwrap();
        img.pixel(2, 0);
    }
}
