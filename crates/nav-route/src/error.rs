//! Route-assembly error type.

use thiserror::Error;

use nav_core::GeoPoint;
use nav_grid::GridError;
use nav_search::SearchError;

/// Errors produced by `nav-route`.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("no eligible marina within {radius_m:.0} m of {near}")]
    NoMarinaAvailable { near: GeoPoint, radius_m: f64 },

    #[error("route unreachable: {0}")]
    RouteUnreachable(String),

    /// Consecutive segments do not meet.  Indicates an assembly bug.
    #[error("segment {index} starts {gap_m:.1} m away from the end of the previous segment")]
    SegmentDiscontinuity { index: usize, gap_m: f64 },

    #[error("route computation cancelled")]
    Cancelled,

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error("marina registry parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type RouteResult<T> = Result<T, RouteError>;
