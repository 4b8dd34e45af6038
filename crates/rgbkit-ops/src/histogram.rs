//! Histograms, peak-based color correction and histogram rendering.
//!
//! # Operations
//!
//! - [`Histogram::compute`] - 256-bucket counts per channel
//! - [`Histogram::peak`] - most frequent value inside `[10, 245)`
//! - [`color_correct`] - align the three channel peaks on their average
//! - [`render`] - draw the three histograms as line graphs on a 256x256 canvas
//!
//! # Example
//!
//! ```rust
//! use rgbkit_core::{Channel, PixelBuffer};
//! use rgbkit_ops::histogram::Histogram;
//!
//! let img = PixelBuffer::filled(4, 4, [20, 40, 60]).unwrap();
//! let hist = Histogram::compute(&img);
//! assert_eq!(hist.count(Channel::Green, 40), 16);
//! assert_eq!(hist.peak(Channel::Blue), 60);
//! ```

use crate::OpsResult;
use rgbkit_core::{clamp_sample, Channel, PixelBuffer};
#[allow(unused_imports)]
use tracing::{debug, trace};

/// Number of buckets per channel.
pub const BUCKETS: usize = 256;

/// Peak search excludes near-black and near-white buckets: scans `PEAK_LOW..PEAK_HIGH`.
pub const PEAK_LOW: usize = 10;
/// Exclusive upper bound of the peak search.
pub const PEAK_HIGH: usize = 245;

/// Side length of the canvas produced by [`render`].
pub const RENDER_SIZE: u32 = 256;

const BACKGROUND: [u8; 3] = [255, 255, 255];
const GRID: [u8; 3] = [192, 192, 192];
const GRID_STEP: usize = 64;

/// Per-channel sample counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    counts: [[u32; BUCKETS]; 3],
}

impl Histogram {
    /// Counts every sample of every channel.
    pub fn compute(src: &PixelBuffer) -> Self {
        trace!(width = src.width(), height = src.height(), "histogram");
        let mut counts = [[0u32; BUCKETS]; 3];
        for channel in Channel::ALL {
            let bins = &mut counts[channel.index()];
            for &v in src.plane(channel) {
                bins[v as usize] += 1;
            }
        }
        Self { counts }
    }

    /// All 256 counts of one channel.
    #[inline]
    pub fn channel(&self, channel: Channel) -> &[u32; BUCKETS] {
        &self.counts[channel.index()]
    }

    /// Number of pixels whose `channel` sample equals `value`.
    #[inline]
    pub fn count(&self, channel: Channel, value: u8) -> u32 {
        self.counts[channel.index()][value as usize]
    }

    /// Most frequent value in `[10, 245)`; the lowest value wins ties.
    pub fn peak(&self, channel: Channel) -> usize {
        let bins = self.channel(channel);
        let mut peak = PEAK_LOW;
        for i in PEAK_LOW + 1..PEAK_HIGH {
            if bins[i] > bins[peak] {
                peak = i;
            }
        }
        peak
    }

    /// Peaks of all channels in `[r, g, b]` order.
    pub fn peaks(&self) -> [usize; 3] {
        Channel::ALL.map(|c| self.peak(c))
    }
}

/// Shifts each channel so that its histogram peak lands on the average peak.
///
/// With peaks `p_r, p_g, p_b` and `avg = (p_r + p_g + p_b) / 3` (floored),
/// every sample of channel `c` is moved by `avg - p_c` and clamped.
pub fn color_correct(src: &PixelBuffer) -> PixelBuffer {
    let peaks = Histogram::compute(src).peaks();
    let average = (peaks.iter().sum::<usize>() / 3) as i32;
    let shift = peaks.map(|p| average - p as i32);
    debug!(?peaks, average, ?shift, "color_correct");

    src.map(|[r, g, b]| {
        [
            clamp_sample(r as i32 + shift[0]),
            clamp_sample(g as i32 + shift[1]),
            clamp_sample(b as i32 + shift[2]),
        ]
    })
}

/// Draws the histogram of `src` as three line graphs on a white 256x256 canvas.
///
/// Light-gray grid lines are drawn every 64 pixels, then red, green and blue
/// graphs in that order. Bucket `x` is plotted at `(x, 256 - h)` where `h` is
/// its count scaled so the channel's largest bucket reaches 256.
pub fn render(src: &PixelBuffer) -> OpsResult<PixelBuffer> {
    render_histogram(&Histogram::compute(src))
}

/// Draws an already computed histogram. See [`render`].
pub fn render_histogram(hist: &Histogram) -> OpsResult<PixelBuffer> {
    let mut canvas = Canvas::new(RENDER_SIZE as usize, BACKGROUND);

    let edge = RENDER_SIZE as i64;
    for i in (0..=RENDER_SIZE as usize).step_by(GRID_STEP) {
        let i = i as i64;
        canvas.line((i, 0), (i, edge), GRID);
        canvas.line((0, edge - i), (edge, edge - i), GRID);
    }

    for channel in Channel::ALL {
        let bins = hist.channel(channel);
        let max = bins.iter().copied().max().unwrap_or(0).max(1) as f64;
        let mut color = [0u8; 3];
        color[channel.index()] = 255;

        let mut prev = (0i64, edge);
        for (x, &count) in bins.iter().enumerate() {
            let h = ((count as f64 / max) * RENDER_SIZE as f64) as i64;
            let point = (x as i64, edge - h);
            if x > 0 {
                canvas.line(prev, point, color);
            }
            prev = point;
        }
    }

    canvas.into_buffer()
}

/// Interleaved RGB drawing surface that clips everything outside its bounds.
struct Canvas {
    size: usize,
    data: Vec<u8>,
}

impl Canvas {
    fn new(size: usize, fill: [u8; 3]) -> Self {
        let mut data = Vec::with_capacity(size * size * 3);
        for _ in 0..size * size {
            data.extend_from_slice(&fill);
        }
        Self { size, data }
    }

    fn plot(&mut self, x: i64, y: i64, color: [u8; 3]) {
        if x < 0 || y < 0 || x >= self.size as i64 || y >= self.size as i64 {
            return;
        }
        let i = (y as usize * self.size + x as usize) * 3;
        self.data[i..i + 3].copy_from_slice(&color);
    }

    /// Bresenham line, both endpoints inclusive.
    fn line(&mut self, (x0, y0): (i64, i64), (x1, y1): (i64, i64), color: [u8; 3]) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let (mut x, mut y) = (x0, y0);
        loop {
            self.plot(x, y, color);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    fn into_buffer(self) -> OpsResult<PixelBuffer> {
        let size = self.size as u32;
        Ok(PixelBuffer::from_interleaved(size, size, &self.data)?)
    }
}
