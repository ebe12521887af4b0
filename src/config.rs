use std::path::{Component, Path};

use bon::Builder;

use crate::error::ConfigError;

/// Opaque color used for band fills and backgrounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn as_tuple(self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }

    /// Scale every channel by `factor`, truncating toward zero.
    pub fn scaled(self, factor: f32) -> Self {
        let scale = |c: u8| (c as f32 * factor) as u8;
        Self::new(scale(self.r), scale(self.g), scale(self.b))
    }

    pub const fn opaque(self) -> Rgba {
        Rgba::new(self.r, self.g, self.b, 0xff)
    }
}

/// Color with an alpha channel, as stored in RGBA assets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn as_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// One severity band of the gauge.
///
/// `upper` is the highest fill level (inclusive) painted in this band. The
/// last band has no upper bound and catches everything above the previous one,
/// so the first level of a higher band is `previous.upper + 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct Band {
    pub name: String,
    pub color: Color,
    pub upper: Option<u32>,
}

impl Band {
    pub fn up_to(name: &str, upper: u32, color: Color) -> Self {
        Self {
            name: name.to_string(),
            color,
            upper: Some(upper),
        }
    }

    pub fn rest(name: &str, color: Color) -> Self {
        Self {
            name: name.to_string(),
            color,
            upper: None,
        }
    }
}

pub fn default_bands() -> Vec<Band> {
    vec![
        Band::up_to("green", 6, Color::new(0x00, 0xff, 0x33)),
        Band::up_to("yellow", 20, Color::new(0xff, 0xcc, 0x00)),
        Band::up_to("orange", 56, Color::new(0xff, 0x66, 0x00)),
        Band::rest("red", Color::new(0xff, 0x00, 0x00)),
    ]
}

/// Geometry and colors of a single gauge cell
#[derive(Debug, Clone)]
pub struct CellConfig {
    pub width: u32,
    pub height: u32,
    pub gap: u32,
    pub border: Rgba,
    pub empty: Rgba,
}

impl Default for CellConfig {
    fn default() -> Self {
        Self {
            width: 11,
            height: 11,
            gap: 1,
            border: Rgba::new(45, 45, 55, 0xff),
            empty: Rgba::new(20, 20, 28, 0xff),
        }
    }
}

/// Settings for the runtime code and resource manifest
#[derive(Debug, Clone)]
pub struct EmitConfig {
    /// Name of the live metric variable in the runtime lambda
    pub metric_var: String,
    /// Name of the free-running tick counter in the runtime lambda
    pub clock_var: String,
    /// Where the runtime blits the bar
    pub x: i32,
    pub y: i32,
    /// Directory the runtime build loads images from
    pub asset_dir: String,
}

impl Default for EmitConfig {
    fn default() -> Self {
        Self {
            metric_var: "co2".to_string(),
            clock_var: "t".to_string(),
            x: 7,
            y: 97,
            asset_dir: "assets".to_string(),
        }
    }
}

/// Target screen, used by the full-screen decorative assets and the preview
#[derive(Debug, Clone)]
pub struct DisplayConfig {
    pub width: u32,
    pub height: u32,
    /// Milliseconds per runtime clock tick
    pub tick_ms: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 240,
            height: 135,
            tick_ms: 4,
        }
    }
}

/// Every constant shared by the quantizer, the bar generator and the
/// dispatch emitter.
#[derive(Debug, Clone, Builder)]
pub struct GaugeConfig {
    #[builder(default = 3000.0)]
    pub metric_max: f32,
    #[builder(default = 18)]
    pub segments: u32,
    #[builder(default = 4)]
    pub sublevels: u32,

    // Animation
    #[builder(default = 150)]
    pub phase_ticks: u32,
    /// Brightness multiplier of the partial cell, one entry per phase
    #[builder(default = vec![0.6, 0.75, 0.9, 1.0])]
    pub pulse: Vec<f32>,

    #[builder(default = default_bands())]
    pub bands: Vec<Band>,

    #[builder(default)]
    pub cell: CellConfig,
    #[builder(default = "bar".to_string(), into)]
    pub asset_prefix: String,

    #[builder(default)]
    pub emit: EmitConfig,
    #[builder(default)]
    pub display: DisplayConfig,
}

impl Default for GaugeConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl GaugeConfig {
    /// Highest reachable fill level, `SEGMENTS * SUBLEVELS`.
    pub fn max_fill(&self) -> u32 {
        self.segments * self.sublevels
    }

    pub fn phases(&self) -> u32 {
        self.pulse.len() as u32
    }

    pub fn strip_width(&self) -> u32 {
        self.segments * self.cell.width + self.segments.saturating_sub(1) * self.cell.gap
    }

    pub fn strip_height(&self) -> u32 {
        self.cell.height
    }

    /// Change the segment geometry and move the band thresholds with it.
    ///
    /// Each bounded `upper` keeps its fraction of the fill range. Thresholds
    /// stay strictly ascending; a band squeezed out of a short range is
    /// dropped and its levels fall to the next band.
    pub fn resize(&mut self, segments: u32, sublevels: u32) {
        let old_max = self.segments.checked_mul(self.sublevels).unwrap_or(0) as u64;
        self.segments = segments;
        self.sublevels = sublevels;
        let Some(new_max) = segments.checked_mul(sublevels) else {
            return;
        };
        if old_max == 0 || new_max == 0 {
            return;
        }

        let mut previous: Option<u32> = None;
        let mut bands = Vec::with_capacity(self.bands.len());
        for band in self.bands.drain(..) {
            let Some(upper) = band.upper else {
                bands.push(band);
                continue;
            };
            let scaled = (upper as u64 * new_max as u64 / old_max) as u32;
            let upper = previous.map_or(scaled, |p| scaled.max(p + 1));
            if upper >= new_max {
                continue;
            }
            previous = Some(upper);
            bands.push(Band { upper: Some(upper), ..band });
        }
        self.bands = bands;
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.metric_max.is_finite() || self.metric_max <= 0.0 {
            return Err(ConfigError::InvalidMetricMax(self.metric_max));
        }
        if self.segments == 0 {
            return Err(ConfigError::ZeroSegments);
        }
        if self.sublevels == 0 {
            return Err(ConfigError::ZeroSublevels);
        }
        if self.segments.checked_mul(self.sublevels).is_none() {
            return Err(ConfigError::TooManyLevels {
                segments: self.segments,
                sublevels: self.sublevels,
            });
        }
        if self.phase_ticks == 0 {
            return Err(ConfigError::ZeroPhaseTicks);
        }
        self.validate_pulse()?;
        self.validate_bands()?;
        if self.cell.width == 0 || self.cell.height == 0 {
            return Err(ConfigError::EmptyCell);
        }
        if !is_nested_dir(&self.emit.asset_dir) {
            return Err(ConfigError::AssetDirEscapes(self.emit.asset_dir.clone()));
        }
        Ok(())
    }

    fn validate_pulse(&self) -> Result<(), ConfigError> {
        let Some(&last) = self.pulse.last() else {
            return Err(ConfigError::NoPhases);
        };
        for (phase, &factor) in self.pulse.iter().enumerate() {
            if !(0.0..=1.0).contains(&factor) {
                return Err(ConfigError::PulseOutOfRange { phase, factor });
            }
        }
        if let Some(phase) = self.pulse.windows(2).position(|w| w[1] < w[0]) {
            return Err(ConfigError::PulseDecreasing { phase: phase + 1 });
        }
        if last != 1.0 {
            return Err(ConfigError::PulseNotFull(last));
        }
        Ok(())
    }

    fn validate_bands(&self) -> Result<(), ConfigError> {
        let Some((last, bounded)) = self.bands.split_last() else {
            return Err(ConfigError::NoBands);
        };
        if last.upper.is_some() {
            return Err(ConfigError::MissingCatchAll);
        }
        let max_fill = self.max_fill();
        let mut previous: Option<u32> = None;
        for band in bounded {
            let Some(upper) = band.upper else {
                return Err(ConfigError::CatchAllNotLast(band.name.clone()));
            };
            if previous.is_some_and(|p| upper <= p) {
                return Err(ConfigError::ThresholdsNotAscending(band.name.clone()));
            }
            if upper >= max_fill {
                return Err(ConfigError::ThresholdOutOfRange {
                    band: band.name.clone(),
                    upper,
                    max_fill,
                });
            }
            previous = Some(upper);
        }
        Ok(())
    }
}

/// True when `dir` can only name a location below the directory it is joined to.
pub(crate) fn is_nested_dir(dir: &str) -> bool {
    Path::new(dir)
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}
