//! Errors surfaced by file-format glue. Kept distinct from `gbatiles_core::diagnostics::CompileError`,
//! which only ever reports on the *contents* of already-decoded tiles (SPEC_FULL.md §4.12).

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not a valid PNG: {source}")]
    DecodePng {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("{path} has dimensions {width}x{height}, which is not a multiple of 8x8")]
    ImageNotTileAligned { path: PathBuf, width: u32, height: u32 },

    #[error("animation '{anim}' frame {frame} has a different tile-grid size than its key frame")]
    AnimationFrameSizeMismatch { anim: String, frame: usize },

    #[error("{path}: {source}")]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("{path}: {source}")]
    ParseCsv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{path}:{line}: malformed assignment-cache entry {entry:?}")]
    MalformedCacheEntry { path: PathBuf, line: usize, entry: String },

    #[error(transparent)]
    Compile(#[from] gbatiles_core::diagnostics::CompileError),
}

pub type IoResult<T> = Result<T, IoError>;
