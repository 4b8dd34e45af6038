//! Name-addressed operations over a [`Catalog`].
//!
//! [`Engine`] resolves source (and mask) names, runs the pure functions from
//! the other modules, and stores the result under the destination name.
//! Nothing is written when an operation fails, so a failed command leaves
//! the catalog exactly as it was.
//!
//! # Example
//!
//! ```rust
//! use rgbkit_core::PixelBuffer;
//! use rgbkit_ops::Engine;
//!
//! let mut engine = Engine::new();
//! engine.insert("img", PixelBuffer::filled(4, 4, [100, 100, 100]).unwrap());
//! engine.brighten(20, "img", "bright").unwrap();
//! assert_eq!(engine.get("bright").unwrap().pixel(0, 0), [120, 120, 120]);
//! ```

use crate::catalog::Catalog;
use crate::composite::{apply_masked, split_view, MaskedOp, SplitOp};
use crate::histogram::{color_correct, render};
use crate::levels::{levels_adjust, Levels};
use crate::point::{brighten, flip, rgb_combine, rgb_split, Component, FlipDirection};
use crate::resize::downscale;
use crate::wavelet::compress;
use crate::{OpsError, OpsResult};
use rgbkit_core::PixelBuffer;
#[allow(unused_imports)]
use tracing::{debug, trace};

/// Image operations addressed by catalog name.
#[derive(Debug, Default)]
pub struct Engine {
    catalog: Catalog,
}

impl Engine {
    /// Creates an engine with an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read access to the underlying catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Looks up an image by name.
    pub fn get(&self, name: &str) -> OpsResult<&PixelBuffer> {
        self.catalog.get(name)
    }

    /// Stores an image, replacing any previous one with the same name.
    pub fn insert(&mut self, name: &str, image: PixelBuffer) {
        if self.catalog.insert(name, image).is_some() {
            debug!(name, "replaced existing image");
        }
    }

    fn store(&mut self, dst: &str, image: PixelBuffer) -> OpsResult<()> {
        self.insert(dst, image);
        Ok(())
    }

    /// Runs a maskable operation, optionally gated by the image named `mask`.
    pub fn apply(&mut self, op: MaskedOp, src: &str, mask: Option<&str>, dst: &str) -> OpsResult<()> {
        let source = self.catalog.get(src)?;
        let out = match mask {
            Some(mask) => apply_masked(source, self.catalog.get(mask)?, op)?,
            None => op.apply(source),
        };
        self.store(dst, out)
    }

    /// Channel or derived component visualization.
    pub fn component(
        &mut self,
        kind: Component,
        src: &str,
        mask: Option<&str>,
        dst: &str,
    ) -> OpsResult<()> {
        self.apply(MaskedOp::Component(kind), src, mask, dst)
    }

    /// 3x3 blur.
    pub fn blur(&mut self, src: &str, mask: Option<&str>, dst: &str) -> OpsResult<()> {
        self.apply(MaskedOp::Blur, src, mask, dst)
    }

    /// 5x5 sharpen.
    pub fn sharpen(&mut self, src: &str, mask: Option<&str>, dst: &str) -> OpsResult<()> {
        self.apply(MaskedOp::Sharpen, src, mask, dst)
    }

    /// Sepia tone.
    pub fn sepia(&mut self, src: &str, mask: Option<&str>, dst: &str) -> OpsResult<()> {
        self.apply(MaskedOp::Sepia, src, mask, dst)
    }

    /// Greyscale by intensity, or by `component` when given.
    pub fn greyscale(
        &mut self,
        component: Option<Component>,
        src: &str,
        mask: Option<&str>,
        dst: &str,
    ) -> OpsResult<()> {
        let op = component.map_or(MaskedOp::Greyscale, MaskedOp::Component);
        self.apply(op, src, mask, dst)
    }

    /// Horizontal or vertical mirror.
    pub fn flip(&mut self, direction: FlipDirection, src: &str, dst: &str) -> OpsResult<()> {
        let out = flip(self.catalog.get(src)?, direction);
        self.store(dst, out)
    }

    /// Adds `amount` to every sample.
    pub fn brighten(&mut self, amount: i32, src: &str, dst: &str) -> OpsResult<()> {
        let out = brighten(self.catalog.get(src)?, amount);
        self.store(dst, out)
    }

    /// Stores the red, green and blue channel images under three names.
    pub fn rgb_split(&mut self, src: &str, dst: [&str; 3]) -> OpsResult<()> {
        let parts = rgb_split(self.catalog.get(src)?);
        for (name, image) in dst.into_iter().zip(parts) {
            self.insert(name, image);
        }
        Ok(())
    }

    /// Reassembles an image from three channel images.
    pub fn rgb_combine(&mut self, dst: &str, src: [&str; 3]) -> OpsResult<()> {
        let [r, g, b] = src;
        let out = rgb_combine(
            self.catalog.get(r)?,
            self.catalog.get(g)?,
            self.catalog.get(b)?,
        )?;
        self.store(dst, out)
    }

    /// Stores a rendered 256x256 histogram of `src`.
    pub fn histogram(&mut self, src: &str, dst: &str) -> OpsResult<()> {
        let out = render(self.catalog.get(src)?)?;
        self.store(dst, out)
    }

    /// Aligns channel histogram peaks.
    pub fn color_correct(&mut self, src: &str, dst: &str) -> OpsResult<()> {
        let out = color_correct(self.catalog.get(src)?);
        self.store(dst, out)
    }

    /// Black/mid/white levels curve.
    pub fn levels_adjust(
        &mut self,
        black: i32,
        mid: i32,
        white: i32,
        src: &str,
        dst: &str,
    ) -> OpsResult<()> {
        let levels = Levels::new(black, mid, white)?;
        let out = levels_adjust(self.catalog.get(src)?, &levels);
        self.store(dst, out)
    }

    /// Applies `op` to the left `percent` of the columns.
    pub fn split(&mut self, op: &SplitOp, src: &str, dst: &str, percent: i32) -> OpsResult<()> {
        let out = split_view(self.catalog.get(src)?, percent, op)?;
        self.store(dst, out)
    }

    /// Haar wavelet compression.
    pub fn compress(&mut self, percent: f64, src: &str, dst: &str) -> OpsResult<()> {
        let out = compress(self.catalog.get(src)?, percent)?;
        self.store(dst, out)
    }

    /// Bilinear downscale to `width` x `height`.
    pub fn downscale(&mut self, width: i32, height: i32, src: &str, dst: &str) -> OpsResult<()> {
        let source = self.catalog.get(src)?;
        let (Ok(w), Ok(h)) = (u32::try_from(width), u32::try_from(height)) else {
            return Err(OpsError::invalid(format!(
                "invalid dimensions for downscaling: {width}x{height}"
            )));
        };
        let out = downscale(source, w, h)?;
        self.store(dst, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::blur;
    use crate::point::sepia;

    fn engine_with(name: &str, image: PixelBuffer) -> Engine {
        let mut engine = Engine::new();
        engine.insert(name, image);
        engine
    }

    fn gradient() -> PixelBuffer {
        PixelBuffer::from_fn(6, 4, |x, y| [(x * 40) as u8, (y * 60) as u8, 77]).unwrap()
    }

    #[test]
    fn test_missing_source() {
        let mut engine = Engine::new();
        assert!(matches!(
            engine.blur("nope", None, "out"),
            Err(OpsError::NotFound(n)) if n == "nope"
        ));
        assert!(!engine.catalog().contains("out"));
    }

    #[test]
    fn test_missing_mask() {
        let mut engine = engine_with("img", gradient());
        assert!(matches!(
            engine.sepia("img", Some("mask"), "out"),
            Err(OpsError::NotFound(_))
        ));
        assert!(!engine.catalog().contains("out"));
    }

    #[test]
    fn test_failure_leaves_destination() {
        let mut engine = engine_with("img", gradient());
        engine.insert("out", PixelBuffer::new(1, 1).unwrap());
        assert!(engine.compress(150.0, "img", "out").is_err());
        assert!(engine.levels_adjust(10, 5, 200, "img", "out").is_err());
        assert!(engine.downscale(-1, 2, "img", "out").is_err());
        assert_eq!(engine.get("out").unwrap().dimensions(), (1, 1));
    }

    #[test]
    fn test_masked_and_plain() {
        let mut engine = engine_with("img", gradient());
        engine.insert("mask", PixelBuffer::new(6, 4).unwrap());
        engine.blur("img", None, "a").unwrap();
        engine.blur("img", Some("mask"), "b").unwrap();
        let expected = blur(&gradient());
        assert_eq!(engine.get("a").unwrap(), &expected);
        assert_eq!(engine.get("b").unwrap(), &expected);
    }

    #[test]
    fn test_greyscale_component() {
        let mut engine = engine_with("img", PixelBuffer::filled(2, 2, [10, 200, 30]).unwrap());
        engine.greyscale(None, "img", None, "avg").unwrap();
        engine.greyscale(Some(Component::Value), "img", None, "val").unwrap();
        assert_eq!(engine.get("avg").unwrap().pixel(0, 0), [80, 80, 80]);
        assert_eq!(engine.get("val").unwrap().pixel(0, 0), [200, 200, 200]);
    }

    #[test]
    fn test_split_and_combine() {
        let mut engine = engine_with("img", gradient());
        engine.rgb_split("img", ["r", "g", "b"]).unwrap();
        engine.rgb_combine("back", ["r", "g", "b"]).unwrap();
        assert_eq!(engine.get("back").unwrap(), &gradient());
    }

    #[test]
    fn test_in_place_destination() {
        let mut engine = engine_with("img", gradient());
        engine.sepia("img", None, "img").unwrap();
        assert_eq!(engine.get("img").unwrap(), &sepia(&gradient()));
    }

    #[test]
    fn test_shape_changing_ops() {
        let mut engine = engine_with("img", gradient());
        engine.histogram("img", "hist").unwrap();
        assert_eq!(engine.get("hist").unwrap().dimensions(), (256, 256));
        engine.downscale(3, 2, "img", "small").unwrap();
        assert_eq!(engine.get("small").unwrap().dimensions(), (3, 2));
        engine.compress(30.0, "img", "comp").unwrap();
        assert_eq!(engine.get("comp").unwrap().dimensions(), (6, 4));
    }

    #[test]
    fn test_split_op() {
        let mut engine = engine_with("img", gradient());
        engine.split(&SplitOp::Sepia, "img", "s", 100).unwrap();
        assert_eq!(engine.get("s").unwrap(), &sepia(&gradient()));
    }
}
