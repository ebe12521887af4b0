//! Emits the runtime side of the bar: the quantization formula and a
//! branch table with one case per fill level, plus the image resource list
//! the runtime needs so every referenced id exists.
//!
//! The formula text is rendered from the same [`GaugeConfig`] the assets are
//! generated from, and the table is built from [`Gauge::asset_id`], so the
//! constants and identifiers on both sides come from one place.

use std::fmt::Write;

use log::info;

use crate::assets::AssetId;
use crate::config::GaugeConfig;
use crate::Gauge;

pub const DISPATCH_FILE: &str = "bar_code.txt";
pub const MANIFEST_FILE: &str = "bar_images.yaml";

const INDENT: &str = "      ";

/// Shape of the per-case phase selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchStyle {
    /// A nested `switch` with one explicit case per phase and no default.
    #[default]
    Switch,
    /// Legacy one-line form: `anim_frame == n ? id(..) : ..`. Its final arm
    /// takes any phase the earlier arms missed, so use it only for runtimes
    /// that cannot nest a `switch`.
    Ternary,
}

// ============================================================================
// DISPATCH TABLE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchRow {
    pub fill_level: u32,
    /// Indexed by phase
    pub ids: Vec<AssetId>,
}

/// Total mapping from fill level to the asset of each phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchTable {
    rows: Vec<DispatchRow>,
}

impl DispatchTable {
    pub fn build(gauge: &Gauge) -> Self {
        let config = gauge.config();
        let rows = (0..=config.max_fill())
            .map(|fill_level| DispatchRow {
                fill_level,
                ids: (0..config.phases())
                    .map(|phase| gauge.asset_id(fill_level, phase))
                    .collect(),
            })
            .collect();
        Self { rows }
    }

    pub fn rows(&self) -> &[DispatchRow] {
        &self.rows
    }

    /// What the runtime would blit for a quantized state.
    pub fn lookup(&self, fill_level: u32, phase: u32) -> Option<&AssetId> {
        self.rows
            .get(fill_level as usize)
            .and_then(|row| row.ids.get(phase as usize))
    }

    pub fn ids(&self) -> impl Iterator<Item = &AssetId> {
        self.rows.iter().flat_map(|row| row.ids.iter())
    }
}

// ============================================================================
// CODE EMITTER
// ============================================================================

pub struct DispatchEmitter<'a> {
    gauge: &'a Gauge,
    style: DispatchStyle,
}

impl<'a> DispatchEmitter<'a> {
    pub fn new(gauge: &'a Gauge) -> Self {
        Self {
            gauge,
            style: DispatchStyle::default(),
        }
    }

    pub fn with_style(mut self, style: DispatchStyle) -> Self {
        self.style = style;
        self
    }

    pub fn table(&self) -> DispatchTable {
        DispatchTable::build(self.gauge)
    }

    /// Formula plus the full `switch` over fill levels.
    pub fn emit(&self) -> String {
        let config = self.gauge.config();
        let table = self.table();
        let mut code = String::new();
        write_formula(&mut code, config);

        let _ = writeln!(code, "{INDENT}switch (filled) {{");
        for row in table.rows() {
            match self.style {
                DispatchStyle::Ternary => write_ternary_case(&mut code, config, row),
                DispatchStyle::Switch => write_switch_case(&mut code, config, row),
            }
        }
        let _ = write!(code, "{INDENT}}}");

        info!(
            "emitted {:?} dispatch with {} cases x {} phases",
            self.style,
            table.rows().len(),
            config.phases()
        );
        code
    }

    /// `image:` list declaring every bar asset the dispatch code references.
    pub fn image_manifest(&self) -> String {
        let config = self.gauge.config();
        let dir = config.emit.asset_dir.trim_end_matches('/');
        let mut yaml = String::from("image:\n");
        for id in self.table().ids() {
            let file = if dir.is_empty() {
                id.file_name()
            } else {
                format!("{}/{}", dir, id.file_name())
            };
            let _ = writeln!(yaml, "  - file: \"{}\"", file);
            let _ = writeln!(yaml, "    id: {}", id);
            let _ = writeln!(yaml, "    type: RGBA");
        }
        yaml
    }
}

/// The runtime counterpart of [`crate::Quantizer`]: same clamp, truncating
/// cast and cap, evaluated in `float`.
fn write_formula(code: &mut String, config: &GaugeConfig) {
    let emit = &config.emit;
    let metric = &emit.metric_var;
    let max_var = format!("max_{}", metric);
    let max_fill = config.max_fill();

    let _ = writeln!(
        code,
        "{INDENT}// === SEGMENTED BAR: {} segments x {} sub-levels, 0-{} ===",
        config.segments, config.sublevels, config.metric_max
    );
    let _ = writeln!(
        code,
        "{INDENT}// {} fill levels x {} animation phases = {} assets",
        max_fill + 1,
        config.phases(),
        (max_fill + 1) * config.phases()
    );
    let _ = writeln!(code, "{INDENT}float {max_var} = {:?}f;", config.metric_max);
    let _ = writeln!(code, "{INDENT}float pct = {metric} / {max_var};");
    let _ = writeln!(code, "{INDENT}if (!(pct > 0.0f)) pct = 0.0f;  // negative and NaN readings");
    let _ = writeln!(code, "{INDENT}if (pct > 1.0f) pct = 1.0f;");
    let _ = writeln!(code, "{INDENT}int filled = (int)({max_fill} * pct);");
    let _ = writeln!(code, "{INDENT}if (filled > {max_fill}) filled = {max_fill};");
    let _ = writeln!(
        code,
        "{INDENT}int anim_frame = ({} / {}) % {};",
        emit.clock_var,
        config.phase_ticks,
        config.phases()
    );
}

fn write_ternary_case(code: &mut String, config: &GaugeConfig, row: &DispatchRow) {
    let mut choice = String::new();
    if let Some((last, rest)) = row.ids.split_last() {
        for (phase, id) in rest.iter().enumerate() {
            let _ = write!(choice, "anim_frame == {} ? id({}) : ", phase, id);
        }
        let _ = write!(choice, "id({})", last);
    }
    let _ = writeln!(
        code,
        "{INDENT}  case {}: it.image({}, {}, {}); break;",
        row.fill_level, config.emit.x, config.emit.y, choice
    );
}

fn write_switch_case(code: &mut String, config: &GaugeConfig, row: &DispatchRow) {
    let _ = writeln!(code, "{INDENT}  case {}:", row.fill_level);
    let _ = writeln!(code, "{INDENT}    switch (anim_frame) {{");
    for (phase, id) in row.ids.iter().enumerate() {
        let _ = writeln!(
            code,
            "{INDENT}      case {}: it.image({}, {}, id({})); break;",
            phase, config.emit.x, config.emit.y, id
        );
    }
    let _ = writeln!(code, "{INDENT}    }}");
    let _ = writeln!(code, "{INDENT}    break;");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Band, Color};

    /// Constants read back out of the emitted text.
    struct ParsedFormula {
        metric_max: f32,
        scale: i32,
        cap: i32,
        phase_ticks: u64,
        phases: u64,
    }

    fn between<'s>(line: &'s str, start: &str, end: &str) -> &'s str {
        let from = line.find(start).map(|i| i + start.len()).unwrap();
        let to = from + line[from..].find(end).unwrap();
        &line[from..to]
    }

    fn find_line<'c>(code: &'c str, needle: &str) -> &'c str {
        code.lines().find(|l| l.contains(needle)).unwrap()
    }

    fn parse_formula(code: &str) -> ParsedFormula {
        let cap_line = find_line(code, "if (filled > ");
        let phase_line = find_line(code, "int anim_frame = ");
        ParsedFormula {
            metric_max: between(find_line(code, "float max_"), "= ", "f;").parse().unwrap(),
            scale: between(find_line(code, "int filled = "), "(int)(", " * pct").parse().unwrap(),
            cap: between(cap_line, "if (filled > ", ")").parse().unwrap(),
            phase_ticks: between(phase_line, " / ", ")").parse().unwrap(),
            phases: between(phase_line, "% ", ";").parse().unwrap(),
        }
    }

    /// Evaluate the emitted formula with C `float` / `int` semantics.
    fn run_emitted(f: &ParsedFormula, value: f32, ticks: u64) -> (u32, u32) {
        let mut pct = value / f.metric_max;
        if !(pct > 0.0) {
            pct = 0.0;
        }
        if pct > 1.0 {
            pct = 1.0;
        }
        let mut filled = (f.scale as f32 * pct) as i32;
        if filled > f.cap {
            filled = f.cap;
        }
        (filled as u32, ((ticks / f.phase_ticks) % f.phases) as u32)
    }

    fn case_lines(code: &str) -> Vec<&str> {
        let prefix = format!("{INDENT}  case ");
        code.lines().filter(|l| l.starts_with(&prefix)).collect()
    }

    fn ids_in(line: &str) -> Vec<&str> {
        line.split("id(").skip(1).map(|s| &s[..s.find(')').unwrap()]).collect()
    }

    #[test]
    fn emitted_formula_matches_quantizer() {
        let gauge = Gauge::default();
        let q = gauge.quantizer();
        let code = DispatchEmitter::new(&gauge).emit();
        let parsed = parse_formula(&code);

        let samples = [0.0, 1.0, 599.0, 600.0, 1050.0, 1680.0, 2999.0, 3000.0, 3500.0, -40.0, f32::NAN];
        for value in samples {
            for ticks in [0, 149, 150, 599, 600, 12_345] {
                let state = q.quantize(value, ticks);
                assert_eq!(
                    run_emitted(&parsed, value, ticks),
                    (state.fill_level, state.phase),
                    "value {value} ticks {ticks}"
                );
            }
        }
    }

    #[test]
    fn one_case_per_fill_level_in_ascending_order() {
        let gauge = Gauge::default();
        for style in [DispatchStyle::Ternary, DispatchStyle::Switch] {
            let code = DispatchEmitter::new(&gauge).with_style(style).emit();
            let cases = case_lines(&code);
            assert_eq!(cases.len(), 73);
            for (fill, line) in cases.iter().enumerate() {
                assert!(line.trim_start().starts_with(&format!("case {}:", fill)));
            }
            assert!(!code.contains("default"));
        }
    }

    #[test]
    fn ternary_case_names_every_phase_in_order() {
        let gauge = Gauge::default();
        let code = DispatchEmitter::new(&gauge).with_style(DispatchStyle::Ternary).emit();
        let cases = case_lines(&code);
        assert_eq!(
            cases[5].trim(),
            "case 5: it.image(7, 97, anim_frame == 0 ? id(bar_05_0) : anim_frame == 1 ? id(bar_05_1) \
             : anim_frame == 2 ? id(bar_05_2) : id(bar_05_3)); break;"
        );
        for (fill, line) in cases.iter().enumerate() {
            let expected: Vec<String> = (0..4).map(|p| gauge.asset_id(fill as u32, p).to_string()).collect();
            assert_eq!(ids_in(line), expected);
        }
    }

    #[test]
    fn default_dispatch_has_no_fallback_arm() {
        let gauge = Gauge::default();
        let code = DispatchEmitter::new(&gauge).emit();
        assert_eq!(code, DispatchEmitter::new(&gauge).with_style(DispatchStyle::Switch).emit());
        // Every phase of every case is matched by value, including the last one.
        assert_eq!(code.matches("case 3: it.image(7, 97, id(bar_").count(), 73);
        assert!(!code.contains(" ? "));
        assert!(!code.contains("default"));
    }

    #[test]
    fn switch_style_lists_each_phase_explicitly() {
        let gauge = Gauge::default();
        let code = DispatchEmitter::new(&gauge).with_style(DispatchStyle::Switch).emit();
        assert!(code.contains(
            "        case 72:\n          switch (anim_frame) {\n            case 0: it.image(7, 97, id(bar_72_0)); break;"
        ));
        assert_eq!(code.matches("switch (anim_frame)").count(), 73);
        assert_eq!(code.matches("id(bar_").count(), 292);
    }

    #[test]
    fn formula_follows_configuration() {
        let config = GaugeConfig::builder()
            .metric_max(5000.0)
            .segments(10)
            .sublevels(2)
            .phase_ticks(100)
            .pulse(vec![0.5, 1.0])
            .bands(vec![
                Band::up_to("ok", 9, Color::new(0, 255, 0)),
                Band::rest("bad", Color::new(255, 0, 0)),
            ])
            .build();
        let gauge = Gauge::new(config).unwrap();
        let code = DispatchEmitter::new(&gauge).emit();
        assert!(code.contains("float max_co2 = 5000.0f;"));
        assert!(code.contains("int filled = (int)(20 * pct);"));
        assert!(code.contains("if (filled > 20) filled = 20;"));
        assert!(code.contains("int anim_frame = (t / 100) % 2;"));
        assert_eq!(case_lines(&code).len(), 21);

        let parsed = parse_formula(&code);
        let q = gauge.quantizer();
        for value in [0.0, 249.0, 250.0, 2500.0, 4999.0, 5000.0, 9000.0] {
            assert_eq!(run_emitted(&parsed, value, 0).0, q.fill_level(value));
        }
    }

    #[test]
    fn table_is_total_and_agrees_with_naming() {
        let gauge = Gauge::default();
        let table = DispatchTable::build(&gauge);
        assert_eq!(table.rows().len(), 73);
        for (fill, phase) in gauge.states() {
            assert_eq!(table.lookup(fill, phase), Some(&gauge.asset_id(fill, phase)));
        }
        assert_eq!(table.lookup(73, 0), None);
        assert_eq!(table.lookup(0, 4), None);
    }

    #[test]
    fn manifest_declares_every_bar_asset() {
        let gauge = Gauge::default();
        let yaml = DispatchEmitter::new(&gauge).image_manifest();
        assert!(yaml.starts_with("image:\n  - file: \"assets/bar_00_0.png\"\n    id: bar_00_0\n    type: RGBA\n"));
        assert_eq!(yaml.matches("    id: ").count(), 292);
    }
}
