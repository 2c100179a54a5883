use anyhow::{anyhow, Result};
use image::{Rgba, RgbaImage};

use super::coverage::coverage_pct;

pub const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
pub const INK: Rgba<u8> = Rgba([0, 0, 0, 255]);

// Distance between stamped discs along a segment, in pixels.
const STAMP_SPACING: f32 = 0.5;

/// The drawing area: a white raster plus the points of the stroke in progress.
#[derive(Debug, Clone)]
pub struct DrawingSurface {
    raster: RgbaImage,
    line_width: f32,
    stroke: Vec<(f32, f32)>,
}

impl DrawingSurface {
    pub fn new(width: u32, height: u32, line_width: f32) -> Self {
        Self {
            raster: RgbaImage::from_pixel(width, height, BACKGROUND),
            line_width: line_width.max(1.0),
            stroke: Vec::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.raster.width()
    }

    pub fn height(&self) -> u32 {
        self.raster.height()
    }

    #[cfg(test)]
    pub fn raster(&self) -> &RgbaImage {
        &self.raster
    }

    /// Copy of the raster for an evaluation.
    pub fn snapshot(&self) -> RgbaImage {
        self.raster.clone()
    }

    pub fn coverage_pct(&self) -> f64 {
        coverage_pct(&self.raster)
    }

    /// Wipes the raster back to the background and drops any open stroke.
    pub fn clear(&mut self) {
        for pixel in self.raster.pixels_mut() {
            *pixel = BACKGROUND;
        }
        self.stroke.clear();
    }

    /// Replaces the raster with an RGBA buffer rasterized by the host.
    pub fn load_rgba(&mut self, width: u32, height: u32, pixels: Vec<u8>) -> Result<()> {
        let expected = width as usize * height as usize * 4;
        let actual = pixels.len();
        self.raster = RgbaImage::from_raw(width, height, pixels).ok_or_else(|| {
            anyhow!("rgba buffer for {width}x{height} needs {expected} bytes, got {actual}")
        })?;
        Ok(())
    }

    pub fn is_stroking(&self) -> bool {
        !self.stroke.is_empty()
    }

    #[cfg(test)]
    pub fn stroke_points(&self) -> &[(f32, f32)] {
        &self.stroke
    }

    /// Opens a stroke at `(x, y)`. Non-finite points are refused.
    pub fn begin_stroke(&mut self, x: f32, y: f32) -> bool {
        if !(x.is_finite() && y.is_finite()) {
            return false;
        }
        self.stroke.clear();
        self.stroke.push((x, y));
        true
    }

    /// Draws a segment from the last stroke point. False without an open
    /// stroke or for a non-finite point.
    pub fn extend_stroke(&mut self, x: f32, y: f32) -> bool {
        if !(x.is_finite() && y.is_finite()) {
            return false;
        }
        let Some(&(last_x, last_y)) = self.stroke.last() else {
            return false;
        };
        self.draw_segment(last_x, last_y, x, y);
        self.stroke.push((x, y));
        true
    }

    /// Closes the open stroke; returns whether one was open.
    pub fn end_stroke(&mut self) -> bool {
        let was_open = self.is_stroking();
        self.stroke.clear();
        was_open
    }

    // Round caps and joins fall out of stamping discs along the segment.
    fn draw_segment(&mut self, x0: f32, y0: f32, x1: f32, y1: f32) {
        let radius = self.line_width / 2.0;
        // Stamps only land on the visible part, so the step count stays
        // bounded by the raster size whatever the endpoints are.
        let bounds = (
            -radius,
            -radius,
            self.raster.width() as f32 + radius,
            self.raster.height() as f32 + radius,
        );
        let Some((x0, y0, x1, y1)) = clip_segment((x0, y0), (x1, y1), bounds) else {
            return;
        };
        let (dx, dy) = (x1 - x0, y1 - y0);
        let steps = ((dx.hypot(dy) / STAMP_SPACING).ceil() as u32).max(1);
        for step in 0..=steps {
            let t = step as f32 / steps as f32;
            self.stamp_disc(x0 + dx * t, y0 + dy * t, radius);
        }
    }

    fn stamp_disc(&mut self, cx: f32, cy: f32, radius: f32) {
        let (width, height) = (self.raster.width() as i64, self.raster.height() as i64);
        let min_x = ((cx - radius).floor() as i64).max(0);
        let max_x = ((cx + radius).ceil() as i64).min(width - 1);
        let min_y = ((cy - radius).floor() as i64).max(0);
        let max_y = ((cy + radius).ceil() as i64).min(height - 1);
        let r2 = radius * radius;

        for py in min_y..=max_y {
            for px in min_x..=max_x {
                let ox = px as f32 + 0.5 - cx;
                let oy = py as f32 + 0.5 - cy;
                if ox * ox + oy * oy <= r2 {
                    self.raster.put_pixel(px as u32, py as u32, INK);
                }
            }
        }
    }
}

/// Liang-Barsky clip of `from -> to` against `(min_x, min_y, max_x, max_y)`.
fn clip_segment(
    from: (f32, f32),
    to: (f32, f32),
    (min_x, min_y, max_x, max_y): (f32, f32, f32, f32),
) -> Option<(f32, f32, f32, f32)> {
    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    let (mut t0, mut t1) = (0.0f32, 1.0f32);
    let edges = [
        (-dx, from.0 - min_x),
        (dx, max_x - from.0),
        (-dy, from.1 - min_y),
        (dy, max_y - from.1),
    ];
    for (p, q) in edges {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }
    Some((
        from.0 + dx * t0,
        from.1 + dy * t0,
        from.0 + dx * t1,
        from.1 + dy * t1,
    ))
}
