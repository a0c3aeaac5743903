//! Software surface the scrollbar paints itself onto.
//!
//! A small RGBA8 rasterizer with the three primitives the scrollbar needs:
//! horizontal capsules for the track and window, discs and rings for the
//! handles. Edges are hard (no antialiasing) so frames are deterministic
//! and byte-comparable in tests.

use serde::{Deserialize, Serialize};

/// RGBA color with straight alpha, components in 0.0..=1.0.
pub type Rgba = [f32; 4];

/// Colors for the scrollbar paint routine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollbarStyle {
    pub track: Rgba,
    pub window: Rgba,
    pub window_hovered: Rgba,
    pub handle: Rgba,
    pub handle_hovered: Rgba,
    pub handle_outline: Rgba,
    /// Handle outline stroke width in pixels.
    pub outline_width: f32,
}

impl Default for ScrollbarStyle {
    fn default() -> Self {
        Self {
            track: [0.0, 0.0, 0.0, 0.10],
            window: [0.0, 0.0, 0.0, 0.25],
            window_hovered: [0.0, 0.0, 0.0, 0.375],
            handle: [0.0, 0.0, 0.0, 0.25],
            handle_hovered: [0.0, 0.0, 0.0, 0.5],
            handle_outline: [0.25, 0.25, 0.25, 1.0],
            outline_width: 4.0,
        }
    }
}

/// Mouse cursor the host should show over the scrollbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Default,
    Pointer,
}

/// CPU-side RGBA8 pixel surface.
pub struct PixelSurface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl PixelSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0u8; (width * height * 4) as usize],
        }
    }

    /// Resize the surface, discarding its contents.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels = vec![0u8; (width * height * 4) as usize];
    }

    /// Clear to fully transparent.
    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Tightly packed RGBA rows.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Source-over blend of `color` into one pixel.
    fn blend(&mut self, x: i32, y: i32, color: Rgba) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let idx = ((y as u32 * self.width + x as u32) * 4) as usize;
        let alpha = color[3].clamp(0.0, 1.0);
        for channel in 0..3 {
            let src = color[channel].clamp(0.0, 1.0) * 255.0;
            let dst = f32::from(self.pixels[idx + channel]);
            self.pixels[idx + channel] = (src * alpha + dst * (1.0 - alpha)).round() as u8;
        }
        let dst_a = f32::from(self.pixels[idx + 3]) / 255.0;
        let out_a = alpha + dst_a * (1.0 - alpha);
        self.pixels[idx + 3] = (out_a * 255.0).round() as u8;
    }

    /// Fill every pixel whose center lies within `radius` of the horizontal
    /// segment from (x0, cy) to (x1, cy). A zero-length segment is a disc.
    pub fn fill_capsule(&mut self, x0: f32, x1: f32, cy: f32, radius: f32, color: Rgba) {
        let (x0, x1) = if x0 <= x1 { (x0, x1) } else { (x1, x0) };
        let min_x = (x0 - radius).floor() as i32;
        let max_x = (x1 + radius).ceil() as i32;
        let min_y = (cy - radius).floor() as i32;
        let max_y = (cy + radius).ceil() as i32;

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;
                let dx = px - px.clamp(x0, x1);
                let dy = py - cy;
                if dx * dx + dy * dy <= radius * radius {
                    self.blend(x, y, color);
                }
            }
        }
    }

    /// Fill a disc centered at (cx, cy).
    pub fn fill_disc(&mut self, cx: f32, cy: f32, radius: f32, color: Rgba) {
        self.fill_capsule(cx, cx, cy, radius, color);
    }

    /// Stroke a circle of the given radius with a centered stroke width.
    pub fn stroke_disc(&mut self, cx: f32, cy: f32, radius: f32, stroke_width: f32, color: Rgba) {
        let outer = radius + stroke_width / 2.0;
        let inner = (radius - stroke_width / 2.0).max(0.0);
        let min_x = (cx - outer).floor() as i32;
        let max_x = (cx + outer).ceil() as i32;
        let min_y = (cy - outer).floor() as i32;
        let max_y = (cy + outer).ceil() as i32;

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let dx = x as f32 + 0.5 - cx;
                let dy = y as f32 + 0.5 - cy;
                let dist_sq = dx * dx + dy * dy;
                if dist_sq <= outer * outer && dist_sq >= inner * inner {
                    self.blend(x, y, color);
                }
            }
        }
    }
}
