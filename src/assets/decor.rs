//! Fixed-frame decorations around the gauge. None of these depend on the
//! metric; they are rendered once per frame index.

use log::info;

use crate::assets::{AssetId, AssetSink};
use crate::canvas::{Bitmap, Canvas};
use crate::config::{Color, GaugeConfig, Rgba};
use crate::error::GenerateError;

pub const PARTICLE_FRAMES: u32 = 8;
pub const PARTICLE_WIDTH: u32 = 150;
pub const PARTICLE_HEIGHT: u32 = 20;
pub const BRACKET_SIZE: u32 = 8;
const BRACKET_COLOR: Rgba = Rgba::new(100, 200, 255, 255);
const INIT_SCREEN: Rgba = Rgba::new(5, 5, 20, 255);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    fn suffix(self) -> &'static str {
        match self {
            Corner::TopLeft => "tl",
            Corner::TopRight => "tr",
            Corner::BottomLeft => "bl",
            Corner::BottomRight => "br",
        }
    }
}

/// Opaque vertical gradient from `(4,4,16)` at the top toward `(8,8,24)`.
pub fn background_gradient(width: u32, height: u32) -> Bitmap {
    let mut canvas = Canvas::new(width, height, Rgba::TRANSPARENT);
    for y in 0..height {
        let step = |span: u32| (y * span / height) as u8;
        let color = Rgba::new(4 + step(4), 4 + step(4), 16 + step(8), 0xff);
        canvas.fill_rect(0, y as i32, width as i32 - 1, y as i32, color);
    }
    canvas.finish_rgb()
}

pub fn init_screen(width: u32, height: u32) -> Bitmap {
    Canvas::new(width, height, INIT_SCREEN).finish_rgb()
}

/// One frame of the floating particles: three rising and three falling dots.
pub fn particles(frame: u32) -> Bitmap {
    let mut canvas = Canvas::new(PARTICLE_WIDTH, PARTICLE_HEIGHT, Rgba::TRANSPARENT);
    let f = frame as f32;
    let positions = [
        (15, 15.0 - (f * 1.5) % 20.0),
        (30, 10.0 + (f * 1.2) % 18.0),
        (55, 12.0 - (f * 1.8) % 20.0),
        (80, 8.0 + (f * 1.5) % 18.0),
        (105, 14.0 - (f * 1.3) % 20.0),
        (130, 9.0 + (f * 1.6) % 18.0),
    ];

    // Blue-cyan for the first half of the cycle, fading back to blue after.
    let green = if (frame * 30) % 360 < 120 {
        200 + 55 * frame / 8
    } else {
        200u32.saturating_sub(55 * frame.saturating_sub(4) / 4)
    };
    let color = Color::new(100, green.min(255) as u8, 255);

    for (px, py) in positions {
        if py < 0.0 || py > PARTICLE_HEIGHT as f32 {
            continue;
        }
        let alpha = (180.0 - (py - 10.0).abs() * 15.0).clamp(0.0, 255.0) as u8;
        let fill = Rgba::new(color.r, color.g, color.b, alpha);
        canvas.fill_ellipse(px - 1, (py - 1.0) as i32, px + 1, (py + 1.0) as i32, fill);
    }
    canvas.finish_rgba()
}

/// A single cell in `color`, used by runtimes that compose the bar themselves.
pub fn segment_tile(config: &GaugeConfig, fill: Rgba) -> Bitmap {
    let cell = &config.cell;
    let mut canvas = Canvas::new(cell.width, cell.height, Rgba::TRANSPARENT);
    let (x1, y1) = (cell.width as i32 - 1, cell.height as i32 - 1);
    canvas.fill_rect(0, 0, x1, y1, fill);
    canvas.stroke_rect(0, 0, x1, y1, cell.border);
    canvas.finish_rgba()
}

pub fn corner_bracket(corner: Corner) -> Bitmap {
    let mut canvas = Canvas::new(BRACKET_SIZE, BRACKET_SIZE, Rgba::TRANSPARENT);
    let edge = BRACKET_SIZE as i32 - 1;
    let (row, col) = match corner {
        Corner::TopLeft => (0, 0),
        Corner::TopRight => (0, edge),
        Corner::BottomLeft => (edge, 0),
        Corner::BottomRight => (edge, edge),
    };
    canvas.line(0, row, edge, row, BRACKET_COLOR);
    canvas.line(col, 0, col, edge, BRACKET_COLOR);
    canvas.finish_rgba()
}

/// Render every decorative asset into `sink`. Returns how many were written.
pub fn generate_decor(config: &GaugeConfig, sink: &mut dyn AssetSink) -> Result<usize, GenerateError> {
    let display = &config.display;
    let mut count = 0;
    let mut put = |name: String, bitmap: Bitmap| -> Result<(), GenerateError> {
        sink.put_image(&AssetId::named(name), &bitmap)?;
        count += 1;
        Ok(())
    };

    put("bg_gradient".into(), background_gradient(display.width, display.height))?;
    put("init_screen".into(), init_screen(display.width, display.height))?;
    for frame in 0..PARTICLE_FRAMES {
        put(format!("particles_{:02}", frame), particles(frame))?;
    }
    put("seg_empty".into(), segment_tile(config, config.cell.empty))?;
    for band in &config.bands {
        for (phase, &factor) in config.pulse.iter().enumerate() {
            let fill = band.color.scaled(factor).opaque();
            put(format!("seg_{}_{}", band.name, phase), segment_tile(config, fill))?;
        }
    }
    for corner in Corner::ALL {
        put(format!("corner_{}", corner.suffix()), corner_bracket(corner))?;
    }

    info!("rendered {} decorative assets", count);
    Ok(count)
}
