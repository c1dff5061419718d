//! Errors raised while reading ephemeris files

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum JplephemError {
    #[error("cannot read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The requested TDB Julian date lies outside every loaded interval
    #[error("JD {jd} is outside the covered interval {start_jd}..{end_jd}")]
    OutOfRange { jd: f64, start_jd: f64, end_jd: f64 },

    #[error("malformed ephemeris: {0}")]
    InvalidFormat(String),

    /// No segment chain connects `target` to `center`
    #[error("no data for target {target} relative to center {center}")]
    BodyNotFound { center: i32, target: i32 },

    #[error("SPK data type {0} is not supported")]
    UnsupportedSegmentType(i32),
}

pub type Result<T> = std::result::Result<T, JplephemError>;

/// Attach the offending path to an I/O error
pub fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> JplephemError {
    JplephemError::Io {
        path: path.into(),
        source,
    }
}
