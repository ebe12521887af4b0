//! Collapses a continuous metric and a free-running clock into the small
//! discrete state space the bar assets are keyed by.
//!
//! All arithmetic runs in `f32` because the display runtime evaluates the
//! same formula in single-precision `float`. Keeping the precision identical
//! is what makes a generated asset and a runtime lookup agree on the boundary
//! values (e.g. `1000 / 3000 * 72`).

use crate::config::{Band, GaugeConfig};

/// Everything the runtime needs to pick one asset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GaugeState {
    pub fill_level: u32,
    pub segment_index: u32,
    pub partial_sub_fill: u32,
    /// Index into the band table; higher is more severe
    pub severity: usize,
    pub phase: u32,
}

/// Obtained from [`crate::Gauge::quantizer`], so the config is always validated.
///
/// ```compile_fail
/// let config = segbar::GaugeConfig::builder().sublevels(0).build();
/// let quantizer = segbar::Quantizer::new(&config);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Quantizer<'a> {
    config: &'a GaugeConfig,
}

impl<'a> Quantizer<'a> {
    pub(crate) fn new(config: &'a GaugeConfig) -> Self {
        Self { config }
    }

    /// `floor(SEGMENTS * SUBLEVELS * clamp(value / MAX, 0, 1))`, capped.
    ///
    /// Values below zero, `NaN` and `-inf` saturate to 0; values at or above
    /// the maximum saturate to the top level.
    pub fn fill_level(&self, value: f32) -> u32 {
        let max_fill = self.config.max_fill();
        let mut pct = value / self.config.metric_max;
        if !(pct > 0.0) {
            pct = 0.0;
        }
        if pct > 1.0 {
            pct = 1.0;
        }
        let filled = (max_fill as f32 * pct) as u32;
        filled.min(max_fill)
    }

    /// Split a fill level into whole segments and the partial cell's sub-fill.
    pub fn decompose(&self, fill_level: u32) -> (u32, u32) {
        let fill_level = fill_level.min(self.config.max_fill());
        (
            fill_level / self.config.sublevels,
            fill_level % self.config.sublevels,
        )
    }

    /// Band index for a fill level.
    ///
    /// A level belongs to the first band whose inclusive `upper` is not
    /// below it, so the level right after a threshold starts the next band.
    pub fn severity(&self, fill_level: u32) -> usize {
        let last = self.config.bands.len().saturating_sub(1);
        self.config
            .bands
            .iter()
            .position(|band| band.upper.is_some_and(|upper| fill_level <= upper))
            .unwrap_or(last)
    }

    pub fn band(&self, fill_level: u32) -> &'a Band {
        &self.config.bands[self.severity(fill_level)]
    }

    /// `(ticks / phase_ticks) mod PHASES`
    pub fn phase(&self, ticks: u64) -> u32 {
        ((ticks / self.config.phase_ticks as u64) % self.config.phases() as u64) as u32
    }

    /// Brightness multiplier for the partial cell at `phase`, or `None` for
    /// a phase outside `[0, PHASES)`.
    pub fn pulse(&self, phase: u32) -> Option<f32> {
        self.config.pulse.get(phase as usize).copied()
    }

    pub fn quantize(&self, value: f32, ticks: u64) -> GaugeState {
        let fill_level = self.fill_level(value);
        let (segment_index, partial_sub_fill) = self.decompose(fill_level);
        GaugeState {
            fill_level,
            segment_index,
            partial_sub_fill,
            severity: self.severity(fill_level),
            phase: self.phase(ticks),
        }
    }
}
