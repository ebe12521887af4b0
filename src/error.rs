use std::path::PathBuf;

use thiserror::Error;

/// Rejected gauge constants
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("metric maximum must be finite and positive, got {0}")]
    InvalidMetricMax(f32),
    #[error("gauge needs at least one segment")]
    ZeroSegments,
    #[error("segments need at least one sub-level")]
    ZeroSublevels,
    #[error("{segments} segments x {sublevels} sub-levels overflows the fill level range")]
    TooManyLevels { segments: u32, sublevels: u32 },
    #[error("phase duration must be at least one tick")]
    ZeroPhaseTicks,
    #[error("pulse table is empty")]
    NoPhases,
    #[error("pulse factor {factor} for phase {phase} is outside 0..=1")]
    PulseOutOfRange { phase: usize, factor: f32 },
    #[error("pulse table decreases at phase {phase}")]
    PulseDecreasing { phase: usize },
    #[error("last pulse factor must be 1.0, got {0}")]
    PulseNotFull(f32),
    #[error("no color bands configured")]
    NoBands,
    #[error("last band must have no upper bound")]
    MissingCatchAll,
    #[error("band `{0}` has no upper bound but is not last")]
    CatchAllNotLast(String),
    #[error("band `{0}` does not start above the previous band")]
    ThresholdsNotAscending(String),
    #[error("band `{band}` ends at {upper}, at or beyond the maximum fill level {max_fill}")]
    ThresholdOutOfRange { band: String, upper: u32, max_fill: u32 },
    #[error("cell width and height must be non-zero")]
    EmptyCell,
    #[error("asset directory `{0}` must be a relative path inside the output directory")]
    AssetDirEscapes(String),
}

/// Failure of the offline generation pass. Any of these leaves no usable output.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("i/o error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode `{name}`: {source}")]
    Encode {
        name: String,
        #[source]
        source: png::EncodingError,
    },
    #[error("asset set is not total: expected {expected} bar assets, wrote {written}")]
    Incomplete { expected: usize, written: usize },
}

impl GenerateError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
