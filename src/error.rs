//! Error types shared by the catalog parser, grid and generation engine.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// All failures the simulation core can report.
#[derive(Debug, Error)]
pub enum Error {
    /// Catalog or config source could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Malformed catalog text
    #[error(transparent)]
    Format(#[from] FormatError),

    /// Pattern does not fit inside the grid
    #[error("pattern {name:?} ({cols}x{rows}) does not fit a {width}x{height} grid")]
    PatternTooLarge {
        name: String,
        cols: usize,
        rows: usize,
        width: usize,
        height: usize,
    },

    /// Grid area does not fit in memory addressing
    #[error("a {width}x{height} grid is too large")]
    GridTooLarge { width: usize, height: usize },

    /// Coordinate outside the grid
    #[error("cell ({x}, {y}) is outside a {width}x{height} grid")]
    OutOfRange {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    /// Generation buffers of differing size
    #[error("cannot step a {current:?} grid into a {next:?} grid")]
    DimensionMismatch {
        current: (usize, usize),
        next: (usize, usize),
    },

    /// No pattern with this name in the catalog
    #[error("no pattern named {0:?}")]
    NotFound(String),

    /// Grid buffer has already been released
    #[error("grid has been destroyed")]
    Destroyed,

    /// Catalog contains no patterns
    #[error("catalog contains no patterns")]
    EmptyCatalog,

    /// Config file is not valid JSON for `Config`
    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),

    /// Dedicated worker pool could not be started
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Catalog syntax errors. Line numbers are 1-based positions in the source text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("line {line}: unexpected character {found:?} in pattern body")]
    InvalidCharacter { line: usize, found: char },

    #[error("line {line}: pattern body has no preceding name line")]
    MissingName { line: usize },

    #[error("line {line}: pattern {name:?} row has {found} cells, expected {expected}")]
    RaggedRow {
        line: usize,
        name: String,
        expected: usize,
        found: usize,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
