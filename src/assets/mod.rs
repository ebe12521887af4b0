pub mod bar;
pub mod decor;

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::canvas::{Bitmap, PixelFormat};
use crate::config::{is_nested_dir, GaugeConfig};
use crate::error::{ConfigError, GenerateError};

// ============================================================================
// ASSET IDENTIFIERS
// ============================================================================

/// Name of one generated image, shared by the file on disk and the runtime
/// resource id. Bar assets are `<prefix>_<fill>_<phase>` with the fill level
/// zero-padded to at least two digits.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AssetId(String);

impl AssetId {
    pub(crate) fn bar(config: &GaugeConfig, fill_level: u32, phase: u32) -> Self {
        let width = fill_digits(config.max_fill());
        Self(format!(
            "{}_{:0width$}_{}",
            config.asset_prefix,
            fill_level,
            phase,
            width = width
        ))
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn file_name(&self) -> String {
        format!("{}.png", self.0)
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn fill_digits(max_fill: u32) -> usize {
    max_fill.to_string().len().max(2)
}

// ============================================================================
// SINKS
// ============================================================================

/// Destination for generated assets and text artifacts
pub trait AssetSink {
    fn put_image(&mut self, id: &AssetId, bitmap: &Bitmap) -> Result<(), GenerateError>;
    fn put_text(&mut self, file_name: &str, text: &str) -> Result<(), GenerateError>;
}

/// Keeps everything in memory. Used by the preview and tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub images: BTreeMap<AssetId, Bitmap>,
    pub texts: BTreeMap<String, String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AssetSink for MemorySink {
    fn put_image(&mut self, id: &AssetId, bitmap: &Bitmap) -> Result<(), GenerateError> {
        self.images.insert(id.clone(), bitmap.clone());
        Ok(())
    }

    fn put_text(&mut self, file_name: &str, text: &str) -> Result<(), GenerateError> {
        self.texts.insert(file_name.to_string(), text.to_string());
        Ok(())
    }
}

/// Writes PNGs and text files into a staging directory next to the output
/// directory. Nothing reaches the output directory until [`DirSink::commit`];
/// a sink dropped without committing removes its staging directory.
#[derive(Debug)]
pub struct DirSink {
    out_dir: PathBuf,
    staging: PathBuf,
    image_dir: PathBuf,
    written: Vec<PathBuf>,
    committed: bool,
}

impl DirSink {
    pub fn create(out_dir: &Path, image_subdir: &str) -> Result<Self, GenerateError> {
        if !is_nested_dir(image_subdir) {
            return Err(ConfigError::AssetDirEscapes(image_subdir.to_string()).into());
        }
        let staging = staging_path(out_dir);
        if staging.exists() {
            warn!("removing stale staging directory {}", staging.display());
            fs::remove_dir_all(&staging).map_err(|e| GenerateError::io(&staging, e))?;
        }
        let image_dir = PathBuf::from(image_subdir);
        let staged_images = staging.join(&image_dir);
        fs::create_dir_all(&staged_images).map_err(|e| GenerateError::io(&staged_images, e))?;
        Ok(Self {
            out_dir: out_dir.to_path_buf(),
            staging,
            image_dir,
            written: Vec::new(),
            committed: false,
        })
    }

    /// Move every staged file into the output directory, overwriting files
    /// of the same name. Returns the number of files moved.
    pub fn commit(mut self) -> Result<usize, GenerateError> {
        let target_images = self.out_dir.join(&self.image_dir);
        fs::create_dir_all(&target_images).map_err(|e| GenerateError::io(&target_images, e))?;
        for relative in &self.written {
            let from = self.staging.join(relative);
            let to = self.out_dir.join(relative);
            fs::rename(&from, &to).map_err(|e| GenerateError::io(&to, e))?;
        }
        self.committed = true;
        fs::remove_dir_all(&self.staging).map_err(|e| GenerateError::io(&self.staging, e))?;
        Ok(self.written.len())
    }

    fn write(&mut self, relative: PathBuf, bytes: &[u8]) -> Result<(), GenerateError> {
        let path = self.staging.join(&relative);
        fs::write(&path, bytes).map_err(|e| GenerateError::io(&path, e))?;
        debug!("staged {}", relative.display());
        self.written.push(relative);
        Ok(())
    }
}

impl AssetSink for DirSink {
    fn put_image(&mut self, id: &AssetId, bitmap: &Bitmap) -> Result<(), GenerateError> {
        let bytes = encode_png(id, bitmap)?;
        self.write(self.image_dir.join(id.file_name()), &bytes)
    }

    fn put_text(&mut self, file_name: &str, text: &str) -> Result<(), GenerateError> {
        self.write(PathBuf::from(file_name), text.as_bytes())
    }
}

impl Drop for DirSink {
    fn drop(&mut self) {
        if !self.committed && self.staging.exists() {
            if let Err(e) = fs::remove_dir_all(&self.staging) {
                warn!("could not remove {}: {}", self.staging.display(), e);
            }
        }
    }
}

fn staging_path(out_dir: &Path) -> PathBuf {
    let mut name = out_dir
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "out".into());
    name.push(".partial");
    out_dir.with_file_name(name)
}

pub fn encode_png(id: &AssetId, bitmap: &Bitmap) -> Result<Vec<u8>, GenerateError> {
    let encode_err = |source: png::EncodingError| GenerateError::Encode {
        name: id.to_string(),
        source,
    };
    let mut bytes = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut bytes, bitmap.width, bitmap.height);
        encoder.set_color(match bitmap.format {
            PixelFormat::Rgb => png::ColorType::Rgb,
            PixelFormat::Rgba => png::ColorType::Rgba,
        });
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().map_err(encode_err)?;
        writer.write_image_data(&bitmap.data).map_err(encode_err)?;
        writer.finish().map_err(encode_err)?;
    }
    Ok(bytes)
}
