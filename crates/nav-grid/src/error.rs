//! Grid-subsystem error type.

use thiserror::Error;

use nav_core::GeoPoint;

/// Errors produced by `nav-grid`.
#[derive(Debug, Error)]
pub enum GridError {
    #[error("navigability mask has not been initialized")]
    MaskNotInitialized,

    #[error("navigability mask is already initialized")]
    AlreadyInitialized,

    #[error("navigability mask is corrupt: {0}")]
    MaskCorrupt(String),

    #[error("invalid mask metadata: {0}")]
    InvalidMetadata(String),

    #[error("{0} is outside mask coverage")]
    OutOfCoverage(GeoPoint),

    #[error("no navigable water within {radius_m:.0} m of {from}")]
    NoWaterFound { from: GeoPoint, radius_m: f64 },

    #[error("metadata JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type GridResult<T> = Result<T, GridError>;
