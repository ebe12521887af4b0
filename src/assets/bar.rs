use log::{debug, info};

use crate::assets::{AssetId, AssetSink};
use crate::canvas::{Bitmap, Canvas};
use crate::config::Rgba;
use crate::error::GenerateError;
use crate::Gauge;

/// Renders the horizontal strip of cells for one `(fill level, phase)` pair.
pub struct BarRenderer<'a> {
    gauge: &'a Gauge,
}

impl<'a> BarRenderer<'a> {
    pub fn new(gauge: &'a Gauge) -> Self {
        Self { gauge }
    }

    /// Composite full cells, then the pulsing partial cell, then empty cells.
    ///
    /// Returns `None` for a state outside the table: a fill level above
    /// `SEGMENTS * SUBLEVELS` or a phase at or beyond `PHASES`.
    pub fn render(&self, fill_level: u32, phase: u32) -> Option<Bitmap> {
        let config = self.gauge.config();
        let quantizer = self.gauge.quantizer();
        let cell = &config.cell;
        if fill_level > config.max_fill() {
            return None;
        }

        let (full, partial) = quantizer.decompose(fill_level);
        let band = quantizer.band(fill_level);
        let full_color = band.color.opaque();
        let pulse_color = band.color.scaled(quantizer.pulse(phase)?).opaque();

        let mut canvas = Canvas::new(config.strip_width(), config.strip_height(), Rgba::TRANSPARENT);
        for index in 0..config.segments {
            let x0 = (index * (cell.width + cell.gap)) as i32;
            let x1 = x0 + cell.width as i32 - 1;
            let y1 = cell.height as i32 - 1;

            if index < full {
                canvas.fill_rect(x0, 0, x1, y1, full_color);
            } else {
                canvas.fill_rect(x0, 0, x1, y1, cell.empty);
                if index == full && partial > 0 {
                    let fill_width = cell.width * partial / config.sublevels;
                    if fill_width > 0 {
                        canvas.fill_rect(x0, 0, x0 + fill_width as i32 - 1, y1, pulse_color);
                    }
                }
            }
            // Border last, over any partial fill.
            canvas.stroke_rect(x0, 0, x1, y1, cell.border);
        }
        Some(canvas.finish_rgba())
    }
}

/// Render and store every bar asset. Returns the ids in generation order.
pub fn generate_bars(gauge: &Gauge, sink: &mut dyn AssetSink) -> Result<Vec<AssetId>, GenerateError> {
    let renderer = BarRenderer::new(gauge);
    let mut written = Vec::with_capacity(gauge.asset_count());
    for (fill_level, phase) in gauge.states() {
        let id = gauge.asset_id(fill_level, phase);
        let Some(bitmap) = renderer.render(fill_level, phase) else {
            break;
        };
        sink.put_image(&id, &bitmap)?;
        debug!("rendered {}", id);
        written.push(id);
    }
    if written.len() != gauge.asset_count() {
        return Err(GenerateError::Incomplete {
            expected: gauge.asset_count(),
            written: written.len(),
        });
    }
    info!(
        "rendered {} bar assets ({} fill levels x {} phases)",
        written.len(),
        gauge.config().max_fill() + 1,
        gauge.config().phases()
    );
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::MemorySink;
    use crate::config::{Band, Color, GaugeConfig};
    use std::collections::BTreeSet;

    const BORDER: [u8; 4] = [45, 45, 55, 255];
    const EMPTY: [u8; 4] = [20, 20, 28, 255];

    fn cell_x(index: u32) -> u32 {
        index * 12
    }

    #[test]
    fn empty_bar_has_only_empty_cells() {
        let gauge = Gauge::default();
        let bitmap = BarRenderer::new(&gauge).render(0, 0).unwrap();
        assert_eq!((bitmap.width, bitmap.height), (215, 11));
        for index in 0..18 {
            assert_eq!(bitmap.pixel(cell_x(index), 0), Some(&BORDER[..]));
            assert_eq!(bitmap.pixel(cell_x(index) + 5, 5), Some(&EMPTY[..]));
        }
        // Gaps stay transparent.
        assert_eq!(bitmap.pixel(11, 5), Some(&[0, 0, 0, 0][..]));
    }

    #[test]
    fn full_bar_is_red_at_full_brightness_in_every_phase() {
        let gauge = Gauge::default();
        let renderer = BarRenderer::new(&gauge);
        for phase in 0..4 {
            let bitmap = renderer.render(72, phase).unwrap();
            for index in 0..18 {
                assert_eq!(bitmap.pixel(cell_x(index) + 5, 5), Some(&[255, 0, 0, 255][..]));
                assert_eq!(bitmap.pixel(cell_x(index) + 10, 10), Some(&BORDER[..]));
            }
        }
    }

    #[test]
    fn partial_cell_pulses_with_phase() {
        let gauge = Gauge::default();
        let renderer = BarRenderer::new(&gauge);
        // 38 = 9 full segments + 2 quarters, orange band
        let dim = renderer.render(38, 0).unwrap();
        let bright = renderer.render(38, 3).unwrap();
        let partial_x = cell_x(9);

        assert_eq!(dim.pixel(cell_x(8) + 5, 5), Some(&[255, 102, 0, 255][..]));
        // 11 * 2 / 4 = 5 columns of fill, the first one under the border.
        assert_eq!(dim.pixel(partial_x + 2, 5), Some(&[153, 61, 0, 255][..]));
        assert_eq!(bright.pixel(partial_x + 2, 5), Some(&[255, 102, 0, 255][..]));
        assert_eq!(dim.pixel(partial_x + 4, 5), Some(&[153, 61, 0, 255][..]));
        assert_eq!(dim.pixel(partial_x + 5, 5), Some(&EMPTY[..]));
        assert_eq!(dim.pixel(cell_x(10) + 5, 5), Some(&EMPTY[..]));
    }

    #[test]
    fn sliver_keeps_its_border() {
        let gauge = Gauge::default();
        let bitmap = BarRenderer::new(&gauge).render(1, 2).unwrap();
        // 11 * 1 / 4 = 2 columns: one under the left border, one visible.
        assert_eq!(bitmap.pixel(0, 5), Some(&BORDER[..]));
        assert_eq!(bitmap.pixel(1, 5), Some(&[0, 229, 45, 255][..]));
        assert_eq!(bitmap.pixel(2, 5), Some(&EMPTY[..]));
        assert_eq!(bitmap.pixel(10, 5), Some(&BORDER[..]));
    }

    #[test]
    fn whole_segments_do_not_depend_on_phase() {
        let gauge = Gauge::default();
        let renderer = BarRenderer::new(&gauge);
        assert_eq!(renderer.render(36, 0), renderer.render(36, 3));
        assert_ne!(renderer.render(37, 0), renderer.render(37, 3));
    }

    #[test]
    fn states_outside_the_table_are_not_rendered() {
        let gauge = Gauge::default();
        let renderer = BarRenderer::new(&gauge);
        assert!(renderer.render(72, 3).is_some());
        assert_eq!(renderer.render(72, 4), None);
        assert_eq!(renderer.render(0, 7), None);
        assert_eq!(renderer.render(73, 0), None);
    }

    #[test]
    fn every_state_is_generated_exactly_once() {
        let gauge = Gauge::default();
        let mut sink = MemorySink::new();
        let ids = generate_bars(&gauge, &mut sink).unwrap();
        assert_eq!(ids.len(), 292);
        assert_eq!(sink.images.len(), 292);
        let unique: BTreeSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), 292);
        for fill in 0..=72 {
            for phase in 0..4 {
                assert!(sink.images.contains_key(&gauge.asset_id(fill, phase)));
            }
        }
    }

    #[test]
    fn alternate_geometry_stays_total() {
        let config = GaugeConfig::builder()
            .segments(5)
            .sublevels(3)
            .pulse(vec![0.5, 1.0])
            .bands(vec![
                Band::up_to("low", 7, Color::new(0, 255, 0)),
                Band::rest("high", Color::new(255, 0, 0)),
            ])
            .build();
        let gauge = Gauge::new(config).unwrap();
        let mut sink = MemorySink::new();
        let ids = generate_bars(&gauge, &mut sink).unwrap();
        assert_eq!(ids.len(), 16 * 2);
        assert_eq!(ids.last().map(|id| id.as_str()), Some("bar_15_1"));
    }
}
