use crate::config::Color;

/// Air quality classification of a raw CO2 reading in ppm.
///
/// Unlike the bar bands, which are keyed by fill level, these thresholds are
/// on the metric itself and drive the readout accent and background tint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AirQuality {
    Unknown,
    Perfect,
    Excellent,
    Moderate,
    Poor,
    VeryPoor,
}

impl AirQuality {
    pub fn classify(ppm: f32) -> Self {
        match ppm {
            v if v.is_nan() => AirQuality::Unknown,
            v if v < 400.0 => AirQuality::Perfect,
            v if v < 1000.0 => AirQuality::Excellent,
            v if v < 1500.0 => AirQuality::Moderate,
            v if v < 2000.0 => AirQuality::Poor,
            _ => AirQuality::VeryPoor,
        }
    }

    pub fn color(self) -> Color {
        match self {
            AirQuality::Unknown => Color::new(100, 100, 100),
            AirQuality::Perfect | AirQuality::Excellent => Color::new(0, 255, 51),
            AirQuality::Moderate => Color::new(255, 204, 0),
            AirQuality::Poor => Color::new(255, 102, 0),
            AirQuality::VeryPoor => Color::new(255, 0, 0),
        }
    }

    /// Dim variant of [`AirQuality::color`] for backgrounds.
    pub fn background(self) -> Color {
        match self {
            AirQuality::Unknown => Color::new(20, 20, 20),
            AirQuality::Perfect | AirQuality::Excellent => Color::new(0, 40, 10),
            AirQuality::Moderate => Color::new(40, 32, 0),
            AirQuality::Poor => Color::new(40, 16, 0),
            AirQuality::VeryPoor => Color::new(40, 0, 0),
        }
    }
}
