//! Error types for scan path operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading or time-indexing a scan path.
#[derive(Error, Debug)]
pub enum PathError {
    #[error("Cannot read scan path file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed scan path row at line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("Unknown segment mode {code} at line {line} (expected 0 = line scan, 1 = point dwell)")]
    UnknownMode { line: usize, code: i64 },

    #[error("Zero traverse speed on line-scan segment {segment}")]
    ZeroSpeed { segment: usize },

    #[error("Invalid parameter on segment {segment}: {what}")]
    InvalidSegment { segment: usize, what: &'static str },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}

pub type PathResult<T> = Result<T, PathError>;
