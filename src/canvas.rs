use crate::config::{Color, Rgba};

// ============================================================================
// CORE DATA TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// 3 channels, for full-screen backgrounds
    Rgb,
    /// 4 channels, for widgets composited over a background
    Rgba,
}

impl PixelFormat {
    pub const fn channels(self) -> usize {
        match self {
            PixelFormat::Rgb => 3,
            PixelFormat::Rgba => 4,
        }
    }
}

/// An immutable rendered asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub data: Vec<u8>,
}

impl Bitmap {
    pub fn pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let channels = self.format.channels();
        let idx = (y as usize * self.width as usize + x as usize) * channels;
        self.data.get(idx..idx + channels)
    }
}

/// RGBA drawing surface.
///
/// Everything is drawn in RGBA; `finish_rgb` drops the alpha channel for
/// opaque assets.
pub struct Canvas {
    frame: Vec<u8>,
    width: usize,
    height: usize,
}

impl Canvas {
    pub fn new(width: u32, height: u32, background: Rgba) -> Self {
        let mut canvas = Self {
            frame: vec![0; width as usize * height as usize * 4],
            width: width as usize,
            height: height as usize,
        };
        canvas.clear(background);
        canvas
    }

    pub fn width(&self) -> u32 {
        self.width as u32
    }

    pub fn height(&self) -> u32 {
        self.height as u32
    }

    pub fn clear(&mut self, color: Rgba) {
        for chunk in self.frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&color.as_array());
        }
    }

    /// Overwrite one pixel, alpha included. Out-of-bounds writes are clipped.
    pub fn put_pixel(&mut self, x: i32, y: i32, color: Rgba) {
        if let Some(idx) = self.index(x, y) {
            self.frame[idx..idx + 4].copy_from_slice(&color.as_array());
        }
    }

    /// Source-over blend of `color` at `alpha` coverage onto one pixel.
    pub fn blend_pixel(&mut self, x: i32, y: i32, color: Color, alpha: f32) {
        let Some(idx) = self.index(x, y) else {
            return;
        };
        let a = alpha.clamp(0.0, 1.0);
        let dst_a = self.frame[idx + 3] as f32 / 255.0;
        let out_a = a + dst_a * (1.0 - a);
        if out_a <= 0.0 {
            return;
        }
        let src = [color.r as f32, color.g as f32, color.b as f32];
        for (c, &s) in src.iter().enumerate() {
            let d = self.frame[idx + c] as f32;
            self.frame[idx + c] = ((s * a + d * dst_a * (1.0 - a)) / out_a).round() as u8;
        }
        self.frame[idx + 3] = (out_a * 255.0).round() as u8;
    }

    /// Fill the inclusive rectangle `(x0, y0)..=(x1, y1)`.
    pub fn fill_rect(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgba) {
        for y in y0.min(y1)..=y0.max(y1) {
            for x in x0.min(x1)..=x0.max(x1) {
                self.put_pixel(x, y, color);
            }
        }
    }

    /// One-pixel outline of the inclusive rectangle `(x0, y0)..=(x1, y1)`.
    pub fn stroke_rect(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgba) {
        self.line(x0, y0, x1, y0, color);
        self.line(x0, y1, x1, y1, color);
        self.line(x0, y0, x0, y1, color);
        self.line(x1, y0, x1, y1, color);
    }

    /// One-pixel Bresenham line, endpoints included.
    pub fn line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgba) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let (mut x, mut y, mut err) = (x0, y0, dx + dy);
        loop {
            self.put_pixel(x, y, color);
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

    /// Fill the ellipse inscribed in the inclusive box `(x0, y0)..=(x1, y1)`.
    pub fn fill_ellipse(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgba) {
        let (left, right) = (x0.min(x1), x0.max(x1));
        let (top, bottom) = (y0.min(y1), y0.max(y1));
        let cx = (left + right) as f32 / 2.0;
        let cy = (top + bottom) as f32 / 2.0;
        let rx = (right - left + 1) as f32 / 2.0;
        let ry = (bottom - top + 1) as f32 / 2.0;
        for y in top..=bottom {
            for x in left..=right {
                let nx = (x as f32 - cx) / rx;
                let ny = (y as f32 - cy) / ry;
                if nx * nx + ny * ny <= 1.0 {
                    self.put_pixel(x, y, color);
                }
            }
        }
    }

    /// Composite `bitmap` with its top-left corner at `(x, y)`, honoring alpha.
    pub fn blit(&mut self, bitmap: &Bitmap, x: i32, y: i32) {
        let channels = bitmap.format.channels();
        for (row, line) in bitmap.data.chunks_exact(bitmap.width as usize * channels).enumerate() {
            for (col, px) in line.chunks_exact(channels).enumerate() {
                let alpha = if channels == 4 { px[3] as f32 / 255.0 } else { 1.0 };
                if alpha > 0.0 {
                    let color = Color::new(px[0], px[1], px[2]);
                    self.blend_pixel(x + col as i32, y + row as i32, color, alpha);
                }
            }
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.frame
    }

    pub fn finish_rgba(self) -> Bitmap {
        Bitmap {
            width: self.width as u32,
            height: self.height as u32,
            format: PixelFormat::Rgba,
            data: self.frame,
        }
    }

    pub fn finish_rgb(self) -> Bitmap {
        let data = self
            .frame
            .chunks_exact(4)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect();
        Bitmap {
            width: self.width as u32,
            height: self.height as u32,
            format: PixelFormat::Rgb,
            data,
        }
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some((y as usize * self.width + x as usize) * 4)
    }
}
