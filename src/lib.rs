// ============================================================================
// CRATE CONFIGURATION & IMPORTS
// ============================================================================

pub mod assets;
pub mod canvas;
pub mod config;
pub mod emit;
pub mod error;
pub mod levels;
pub mod pipeline;
pub mod preview;
pub mod quantize;

pub use assets::{AssetId, AssetSink, DirSink, MemorySink};
pub use canvas::{Bitmap, Canvas, PixelFormat};
pub use config::{Band, Color, GaugeConfig, Rgba};
pub use emit::{DispatchEmitter, DispatchStyle, DispatchTable};
pub use error::{ConfigError, GenerateError};
pub use levels::AirQuality;
pub use pipeline::{generate, GenerationReport};
pub use quantize::{GaugeState, Quantizer};

// ============================================================================
// PUBLIC API - MAIN INTERFACE
// ============================================================================

/// A validated gauge definition.
///
/// Quantizer, bar generator and dispatch emitter all borrow the same `Gauge`,
/// so the constants they agree on cannot drift apart.
#[derive(Debug, Clone)]
pub struct Gauge {
    config: GaugeConfig,
}

impl Gauge {
    pub fn new(config: GaugeConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &GaugeConfig {
        &self.config
    }

    pub fn quantizer(&self) -> Quantizer<'_> {
        Quantizer::new(&self.config)
    }

    /// Identifier of the bar asset for one `(fill level, phase)` pair.
    pub fn asset_id(&self, fill_level: u32, phase: u32) -> AssetId {
        AssetId::bar(&self.config, fill_level, phase)
    }

    /// Every `(fill level, phase)` pair, ascending by fill level then phase.
    pub fn states(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        let phases = self.config.phases();
        (0..=self.config.max_fill()).flat_map(move |fill| (0..phases).map(move |phase| (fill, phase)))
    }

    pub fn asset_count(&self) -> usize {
        (self.config.max_fill() as usize + 1) * self.config.phases() as usize
    }
}

impl Default for Gauge {
    fn default() -> Self {
        Self {
            config: GaugeConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_gauge_covers_292_states() {
        let gauge = Gauge::default();
        assert_eq!(gauge.asset_count(), 73 * 4);
        assert_eq!(gauge.states().count(), 292);
        assert_eq!(gauge.states().next(), Some((0, 0)));
        assert_eq!(gauge.states().last(), Some((72, 3)));
    }

    #[test]
    fn invalid_config_never_becomes_a_gauge() {
        let config = GaugeConfig::builder().segments(0).build();
        assert_eq!(Gauge::new(config).unwrap_err(), ConfigError::ZeroSegments);
    }
}
