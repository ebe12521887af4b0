use std::path::Path;

use log::info;

use crate::assets::bar::generate_bars;
use crate::assets::decor::generate_decor;
use crate::assets::{AssetSink, DirSink};
use crate::emit::{DispatchEmitter, DispatchStyle, DISPATCH_FILE, MANIFEST_FILE};
use crate::error::GenerateError;
use crate::Gauge;

/// What one generation pass produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    pub bar_assets: usize,
    pub decor_assets: usize,
    pub dispatch_cases: usize,
}

/// Render every asset and both text artifacts into `sink`.
pub fn generate_into(
    gauge: &Gauge,
    style: DispatchStyle,
    sink: &mut dyn AssetSink,
) -> Result<GenerationReport, GenerateError> {
    let bars = generate_bars(gauge, sink)?;
    let decor_assets = generate_decor(gauge.config(), sink)?;

    let emitter = DispatchEmitter::new(gauge).with_style(style);
    let table = emitter.table();
    sink.put_text(DISPATCH_FILE, &emitter.emit())?;
    sink.put_text(MANIFEST_FILE, &emitter.image_manifest())?;

    Ok(GenerationReport {
        bar_assets: bars.len(),
        decor_assets,
        dispatch_cases: table.rows().len(),
    })
}

/// Run the whole offline pass into `out_dir`.
///
/// Output is staged and only moved into `out_dir` once every asset and both
/// text artifacts exist. On error nothing in `out_dir` changes.
pub fn generate(gauge: &Gauge, style: DispatchStyle, out_dir: &Path) -> Result<GenerationReport, GenerateError> {
    info!("generating gauge assets into {}", out_dir.display());
    let mut sink = DirSink::create(out_dir, &gauge.config().emit.asset_dir)?;
    let report = generate_into(gauge, style, &mut sink)?;
    let files = sink.commit()?;
    info!(
        "committed {} files: {} bar assets, {} decorative assets, {} dispatch cases",
        files, report.bar_assets, report.decor_assets, report.dispatch_cases
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{AssetId, MemorySink};
    use std::fs;

    #[test]
    fn memory_pass_produces_everything() {
        let gauge = Gauge::default();
        let mut sink = MemorySink::new();
        let report = generate_into(&gauge, DispatchStyle::Ternary, &mut sink).unwrap();
        assert_eq!(
            report,
            GenerationReport {
                bar_assets: 292,
                decor_assets: 31,
                dispatch_cases: 73,
            }
        );
        assert_eq!(sink.images.len(), 292 + 31);
        assert!(sink.texts.contains_key(DISPATCH_FILE));
        assert!(sink.texts.contains_key(MANIFEST_FILE));
    }

    #[test]
    fn every_dispatched_id_was_generated() {
        let gauge = Gauge::default();
        let mut sink = MemorySink::new();
        generate_into(&gauge, DispatchStyle::Switch, &mut sink).unwrap();
        let code = &sink.texts[DISPATCH_FILE];
        for id in DispatchEmitter::new(&gauge).table().ids() {
            assert!(sink.images.contains_key(id), "{} missing", id);
            assert!(code.contains(&format!("id({})", id)));
        }
    }

    struct FailingSink {
        budget: usize,
    }

    impl AssetSink for FailingSink {
        fn put_image(&mut self, id: &AssetId, _: &crate::canvas::Bitmap) -> Result<(), GenerateError> {
            if self.budget == 0 {
                return Err(GenerateError::io(
                    id.file_name(),
                    std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
                ));
            }
            self.budget -= 1;
            Ok(())
        }

        fn put_text(&mut self, _: &str, _: &str) -> Result<(), GenerateError> {
            Ok(())
        }
    }

    #[test]
    fn write_failure_aborts_the_pass() {
        let gauge = Gauge::default();
        let mut sink = FailingSink { budget: 10 };
        let err = generate_into(&gauge, DispatchStyle::Ternary, &mut sink).unwrap_err();
        assert!(matches!(err, GenerateError::Io { .. }));
    }

    #[test]
    fn directory_pass_commits_pngs_and_code() {
        let out = std::env::temp_dir().join(format!("segbar-pipeline-{}", std::process::id()));
        let _ = fs::remove_dir_all(&out);
        let gauge = Gauge::default();
        generate(&gauge, DispatchStyle::Ternary, &out).unwrap();

        assert!(out.join("assets/bar_00_0.png").exists());
        assert!(out.join("assets/bar_72_3.png").exists());
        assert!(out.join("assets/bg_gradient.png").exists());
        let code = fs::read_to_string(out.join(DISPATCH_FILE)).unwrap();
        assert!(code.contains("case 72:"));
        let pngs = fs::read_dir(out.join("assets")).unwrap().count();
        assert_eq!(pngs, 292 + 31);
        fs::remove_dir_all(&out).unwrap();
    }
}
