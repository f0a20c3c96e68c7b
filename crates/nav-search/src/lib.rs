//! `nav-search` — marine pathfinding over the navigability grid.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                  |
//! |--------------|-----------------------------------------------------------|
//! | [`astar`]    | `MarineSearch`, `CostLayers`, `MarinePath`                |
//! | [`simplify`] | Douglas–Peucker polyline simplification                   |
//! | [`error`]    | `SearchError`, `SearchResult<T>`, `Endpoint`              |
//!
//! # Cost model
//!
//! Costs are in **cell units**: an orthogonal step costs 1 and a diagonal
//! step √2, scaled by the destination cell's weather multiplier, plus
//! `depth_weight / depth` where a sounding exists, plus the restricted-zone
//! penalty of every zone containing the destination cell.  Land cells and
//! weather-blocked cells are never entered.
//!
//! The heuristic is the haversine distance to the goal divided by the length
//! of one cell of latitude.  No single step can cover more great-circle
//! distance than its base cost allows, so the heuristic never overestimates
//! and the returned path is optimal under the cost model.

pub mod astar;
pub mod error;
pub mod simplify;

#[cfg(test)]
mod tests;

pub use astar::{CostLayers, MarinePath, MarineSearch};
pub use error::{Endpoint, SearchError, SearchResult};
pub use simplify::simplify;
