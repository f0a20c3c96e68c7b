//! Search error type.

use thiserror::Error;

use nav_core::GeoPoint;

/// Which end of a search request was rejected.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Endpoint {
    Start,
    Goal,
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Endpoint::Start => "start",
            Endpoint::Goal  => "goal",
        })
    }
}

/// Errors produced by `nav-search`.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("{which} {point} is on land or outside mask coverage")]
    InvalidEndpoint { which: Endpoint, point: GeoPoint },

    #[error("no marine path found after expanding {expanded} cells")]
    PathNotFound { expanded: usize },

    #[error("marine search exceeded its {budget_ms} ms budget")]
    Timeout { budget_ms: u64 },

    #[error("marine search cancelled")]
    Cancelled,
}

pub type SearchResult<T> = Result<T, SearchError>;
